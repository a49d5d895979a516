//! Integration test for [`consultant::load_products`].

use consultant::load_products;
use std::io::Write;
use storage::Storage;
use tempfile::NamedTempFile;

/// **Test: A JSON array of products is inserted into the catalog.**
///
/// **Setup:** File with two Electronics products, one using the `url` alias.
/// **Action:** `load_products(storage, file)`.
/// **Expected:** Returns 2; both rows listed in insertion order; url mapped to product_url.
#[tokio::test]
async fn test_load_products_from_file() {
    let storage = Storage::connect("sqlite::memory:").await.expect("storage");
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"[
            {{"name":"Smartphone","description":"Budget","price":299.0,"rating":4.5,"category":"Electronics","url":"https://radat.example/p/1"}},
            {{"name":"Laptop Air","price":999.0,"category":"Electronics"}}
        ]"#
    )
    .expect("write");

    let count = load_products(&storage, file.path()).await.expect("load");
    assert_eq!(count, 2);

    let rows = storage.products.list_by_category("Electronics").await.expect("list");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Smartphone");
    assert_eq!(rows[0].product_url, "https://radat.example/p/1");
    assert_eq!(rows[1].rating, 0.0);
}

/// **Test: A file that is not a product array is an error.**
#[tokio::test]
async fn test_load_products_rejects_bad_json() {
    let storage = Storage::connect("sqlite::memory:").await.expect("storage");
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"name":"not an array"}}"#).expect("write");

    assert!(load_products(&storage, file.path()).await.is_err());
}
