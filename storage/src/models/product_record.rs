//! Catalog row used for similar-product lookups.
//!
//! Maps to the `products` table and is used by ProductRepository.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRecord {
    /// Assigned by the database; ignored on insert.
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    pub category: String,
    #[serde(default, alias = "url")]
    pub product_url: String,
    #[serde(default)]
    pub image_url: String,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        rating: f64,
        category: impl Into<String>,
        product_url: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            price,
            rating,
            category: category.into(),
            product_url: product_url.into(),
            image_url: image_url.into(),
        }
    }

    /// First whitespace-separated word of the name, lower-cased.
    pub fn name_key(&self) -> String {
        first_word_key(&self.name)
    }
}

/// Lower-cased first word of `name`; empty when `name` is blank.
pub fn first_word_key(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_word_key_is_case_insensitive() {
        assert_eq!(first_word_key("Smartphone X"), "smartphone");
        assert_eq!(first_word_key("  SMARTPHONE"), "smartphone");
        assert_eq!(first_word_key("Смартфон Про"), "смартфон");
        assert_eq!(first_word_key(""), "");
        assert_eq!(first_word_key("   "), "");
    }
}
