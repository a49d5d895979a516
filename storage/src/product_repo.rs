//! Product catalog: static rows read by the similar-product lookup.

use crate::error::StorageError;
use crate::models::{first_word_key, ProductRecord};
use crate::sqlite_pool::SqlitePoolManager;
use tracing::{debug, info};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, rating, category, product_url, image_url";

#[derive(Clone)]
pub struct ProductRepository {
    pool_manager: SqlitePoolManager,
}

impl ProductRepository {
    /// Wraps an existing pool and creates the `products` table if missing.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price REAL NOT NULL,
                rating REAL NOT NULL DEFAULT 0,
                category TEXT NOT NULL,
                product_url TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Inserts a catalog row and returns its id.
    pub async fn insert(&self, product: &ProductRecord) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, price, rating, category, product_url, image_url)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.rating)
        .bind(&product.category)
        .bind(&product.product_url)
        .bind(&product.image_url)
        .execute(self.pool_manager.pool())
        .await?;

        info!(name = %product.name, category = %product.category, "Product inserted");
        Ok(result.last_insert_rowid())
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<ProductRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM products WHERE category = ? ORDER BY id ASC",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(category)
            .fetch_all(self.pool_manager.pool())
            .await?;
        Ok(products)
    }

    /// First product in `category` whose name starts with the same word as `name`
    /// (case-insensitive). `None` when `name` is blank or nothing matches.
    pub async fn find_similar(
        &self,
        category: &str,
        name: &str,
    ) -> Result<Option<ProductRecord>, StorageError> {
        let target = first_word_key(name);
        if target.is_empty() {
            return Ok(None);
        }

        let found = self
            .list_by_category(category)
            .await?
            .into_iter()
            .find(|p| p.name_key() == target);

        debug!(
            category = %category,
            name = %name,
            found = found.is_some(),
            "Similar product lookup"
        );
        Ok(found)
    }
}
