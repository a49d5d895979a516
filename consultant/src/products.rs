//! Product-detail sources: the JSON document of the product a customer is asking about.
//!
//! [`FileProductSource`] reads `product<id>.json` from a directory; [`HttpProductSource`]
//! fetches `<base>/api/products/<id>`. Both report a missing product as `Ok(None)`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

use crate::core::{ConsultantError, Result};

/// Product document. `name`, `category` and `description` drive the similar-product
/// lookup; every other field is kept as-is for the `PRODUCT INFO:` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProductDocument {
    /// Compact JSON rendering.
    pub fn to_compact_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.name.clone())
    }
}

#[async_trait]
pub trait ProductDetailSource: Send + Sync {
    async fn fetch(&self, product_id: &str) -> Result<Option<ProductDocument>>;
}

/// Ids are limited to ASCII alphanumerics, `-` and `_` so they cannot escape the data directory.
pub fn is_valid_product_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub struct FileProductSource {
    dir: PathBuf,
}

impl FileProductSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("product{}.json", id))
    }
}

#[async_trait]
impl ProductDetailSource for FileProductSource {
    #[instrument(skip(self))]
    async fn fetch(&self, product_id: &str) -> Result<Option<ProductDocument>> {
        if !is_valid_product_id(product_id) {
            warn!(product_id = %product_id, "Rejected product id");
            return Ok(None);
        }
        let path = self.path_for(product_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Product file not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let doc = serde_json::from_str(&raw)
            .map_err(|e| ConsultantError::ProductSource(format!("{}: {}", path.display(), e)))?;
        Ok(Some(doc))
    }
}

pub struct HttpProductSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProductSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProductDetailSource for HttpProductSource {
    #[instrument(skip(self))]
    async fn fetch(&self, product_id: &str) -> Result<Option<ProductDocument>> {
        if !is_valid_product_id(product_id) {
            return Ok(None);
        }
        let url = format!("{}/api/products/{}", self.base_url, product_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ConsultantError::ProductSource(format!("request failed: {}", e)))?;
        if !response.status().is_success() {
            debug!(url = %url, status = response.status().as_u16(), "Product not available");
            return Ok(None);
        }
        let doc = response
            .json::<ProductDocument>()
            .await
            .map_err(|e| ConsultantError::ProductSource(format!("decode failed: {}", e)))?;
        Ok(Some(doc))
    }
}
