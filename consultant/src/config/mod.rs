//! Application configuration: Telegram connection, logging, database, LLM provider,
//! session timing and product data. Loaded from env.

mod app_config;


pub use app_config::{
    AppConfig, DEFAULT_DATABASE_URL, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_LOG_FILE,
    DEFAULT_PRODUCT_DATA_DIR, DEFAULT_REAPER_INTERVAL_SECS,
};
