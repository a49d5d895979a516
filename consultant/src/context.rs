//! Context Builder: the prompt sent to the gateway for a live question.
//!
//! Policy preamble, then the similar-product block, then prior turns as `question:answer`
//! lines, then the product document, then the `QUESTION: ` delimiter. Reads only.

use prompt::{format_history, ProductBlock, PromptBuilder};
use std::sync::Arc;
use storage::{MessageRepository, ProductRecord, ProductRepository, StorageError};
use tracing::{debug, error, info, instrument};

use crate::products::{ProductDetailSource, ProductDocument};

/// Renders a session's full history, one `question:answer` line per turn.
pub async fn render_history(
    messages: &MessageRepository,
    session_id: &str,
) -> Result<String, StorageError> {
    let turns = messages.read_all(session_id).await?;
    Ok(format_history(
        turns.iter().map(|t| (t.question.as_str(), t.answer.as_str())),
    ))
}

/// Result of the similar-product lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarProduct {
    /// A different catalog product sharing category and first name word.
    Suggestion(ProductRecord),
    /// The catalog match is the target product itself.
    Popular,
}

#[derive(Clone)]
pub struct ContextBuilder {
    messages: MessageRepository,
    products: ProductRepository,
    details: Arc<dyn ProductDetailSource>,
}

impl ContextBuilder {
    pub fn new(
        messages: MessageRepository,
        products: ProductRepository,
        details: Arc<dyn ProductDetailSource>,
    ) -> Self {
        Self {
            messages,
            products,
            details,
        }
    }

    /// Builds the prompt prefix; the caller appends the live question.
    #[instrument(skip(self))]
    pub async fn build(&self, session_id: &str, product_id: Option<&str>) -> String {
        let document = match product_id {
            Some(id) => self.product_document(id).await,
            None => None,
        };

        let (name, category, description) = document
            .as_ref()
            .map(|d| (d.name.as_str(), d.category.as_str(), d.description.as_str()))
            .unwrap_or(("", "", ""));

        let mut builder = PromptBuilder::new();
        match self.similar_product(category, name, description).await {
            Some(SimilarProduct::Suggestion(p)) => {
                builder = builder.similar_product(&ProductBlock {
                    name: &p.name,
                    category: &p.category,
                    price: p.price,
                    rating: p.rating,
                    description: &p.description,
                    url: &p.product_url,
                    image_url: &p.image_url,
                });
            }
            Some(SimilarProduct::Popular) => builder = builder.popular_product(),
            None => {}
        }

        match self.messages.read_all(session_id).await {
            Ok(turns) => {
                builder = builder.history(
                    turns.iter().map(|t| (t.question.as_str(), t.answer.as_str())),
                );
            }
            Err(e) => error!(error = %e, session_id = %session_id, "Failed to read dialogue context"),
        }

        if let Some(doc) = &document {
            builder = builder.product_info(doc.to_compact_json());
        }

        builder.build()
    }

    /// Catalog product in `category` whose first name word matches `name`'s. Errors are
    /// logged and yield `None`.
    pub async fn similar_product(
        &self,
        category: &str,
        name: &str,
        description: &str,
    ) -> Option<SimilarProduct> {
        match self.products.find_similar(category, name).await {
            Ok(Some(p)) if p.name == name && p.description == description => {
                Some(SimilarProduct::Popular)
            }
            Ok(Some(p)) => Some(SimilarProduct::Suggestion(p)),
            Ok(None) => {
                info!(name = %name, category = %category, "No similar product found");
                None
            }
            Err(e) => {
                error!(error = %e, "Error finding similar product");
                None
            }
        }
    }

    async fn product_document(&self, product_id: &str) -> Option<ProductDocument> {
        match self.details.fetch(product_id).await {
            Ok(doc) => {
                debug!(product_id = %product_id, found = doc.is_some(), "Product info lookup");
                doc
            }
            Err(e) => {
                error!(error = %e, product_id = %product_id, "Error retrieving product info");
                None
            }
        }
    }
}
