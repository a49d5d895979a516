//! Entry points behind the CLI commands: run the bot, one sweep, seed the catalog.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use storage::{ProductRecord, Storage};
use tracing::{info, instrument};

use crate::components::build_components;
use crate::config::AppConfig;
use crate::core::{init_tracing, Bot, Handler};
use crate::reaper::SweepReport;
use crate::telegram::{build_teloxide_bot, run_repl, TelegramBotAdapter};

/// Validates config, starts logging, the reaper and the Telegram REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: AppConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;
    let token = config.require_bot_token()?.to_string();

    info!(
        database_url = %config.database_url,
        model = %config.llm_model,
        idle_timeout_secs = config.session_idle_timeout_secs,
        reaper_interval_secs = config.reaper_interval_secs,
        "Initializing consultant"
    );

    let components = build_components(&config).await?;
    let teloxide_bot = build_teloxide_bot(&token, config.telegram_api_url.as_deref())?;
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let handler: Arc<dyn Handler> = components.handler(bot);

    let reaper_task = components.reaper.clone().spawn();
    info!("Consultant started successfully");

    let result = run_repl(teloxide_bot, handler).await;
    reaper_task.abort();
    result
}

/// Runs one reaper sweep and returns its counts.
pub async fn run_sweep(config: AppConfig) -> Result<SweepReport> {
    config.validate()?;
    init_tracing(&config.log_file)?;
    let components = build_components(&config).await?;
    let report = components.reaper.sweep().await?;
    Ok(report)
}

/// Loads catalog rows from a JSON array file into the `products` table.
pub async fn seed_products(config: AppConfig, file: &Path) -> Result<usize> {
    config.validate()?;
    init_tracing(&config.log_file)?;
    let storage = Storage::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    load_products(&storage, file).await
}

/// Inserts every product of the JSON array in `file`; returns how many were inserted.
#[instrument(skip(storage))]
pub async fn load_products(storage: &Storage, file: &Path) -> Result<usize> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let products: Vec<ProductRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of products", file.display()))?;

    for product in &products {
        storage.products.insert(product).await?;
    }
    info!(count = products.len(), file = %file.display(), "Products seeded");
    Ok(products.len())
}
