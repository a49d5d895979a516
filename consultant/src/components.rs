//! Component factory: builds storage, gateway, service, handler and reaper from config.

use anyhow::{Context, Result};
use llm_gateway::{DeepSeekGateway, LlmGateway};
use std::sync::Arc;
use storage::Storage;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::context::ContextBuilder;
use crate::core::Bot;
use crate::products::{FileProductSource, HttpProductSource, ProductDetailSource};
use crate::reaper::{Compactor, Reaper};
use crate::service::ConsultantService;
use crate::session::{SessionLocks, SessionStore};
use crate::telegram::ConsultantHandler;

/// Everything the consultant needs apart from the Telegram connection.
#[derive(Clone)]
pub struct Components {
    pub storage: Storage,
    pub service: Arc<ConsultantService>,
    pub reaper: Arc<Reaper>,
    /// Per-session locks shared by the service and the reaper.
    pub locks: Arc<SessionLocks>,
}

impl Components {
    /// Handler replying through `bot`.
    pub fn handler(&self, bot: Arc<dyn Bot>) -> Arc<ConsultantHandler> {
        Arc::new(ConsultantHandler::new(self.service.clone(), bot))
    }
}

/// Product-detail source from config: HTTP when `PRODUCT_API_URL` is set, files otherwise.
pub fn product_source(config: &AppConfig) -> Arc<dyn ProductDetailSource> {
    match &config.product_api_url {
        Some(url) => {
            info!(url = %url, "Using HTTP product source");
            Arc::new(HttpProductSource::new(url.clone()))
        }
        None => {
            info!(dir = %config.product_data_dir, "Using file product source");
            Arc::new(FileProductSource::new(config.product_data_dir.clone()))
        }
    }
}

/// Opens storage and builds the gateway from config.
#[instrument(skip(config))]
pub async fn build_components(config: &AppConfig) -> Result<Components> {
    let storage = Storage::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let gateway: Arc<dyn LlmGateway> = Arc::new(
        DeepSeekGateway::new(config.gateway_config()?).context("Failed to build LLM gateway")?,
    );
    Ok(assemble(config, storage, gateway, product_source(config)))
}

/// Wires components over existing storage, gateway and product source.
pub fn assemble(
    config: &AppConfig,
    storage: Storage,
    gateway: Arc<dyn LlmGateway>,
    products: Arc<dyn ProductDetailSource>,
) -> Components {
    let sessions = SessionStore::new(storage.clone(), config.idle_timeout());
    let locks = Arc::new(SessionLocks::new());
    let context = ContextBuilder::new(
        storage.messages.clone(),
        storage.products.clone(),
        products.clone(),
    );
    let service = Arc::new(ConsultantService::new(
        sessions.clone(),
        context,
        gateway.clone(),
        locks.clone(),
        products,
    ));
    let reaper = Arc::new(Reaper::new(
        sessions.clone(),
        Compactor::new(sessions, gateway),
        locks.clone(),
        config.reaper_interval(),
    ));

    Components {
        storage,
        service,
        reaper,
        locks,
    }
}
