//! App config loaded from environment variables with defaults.

use anyhow::Result;
use llm_gateway::{GatewayConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use std::env;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://consultant.db";
pub const DEFAULT_LOG_FILE: &str = "logs/consultant.log";
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 15 * 60;
pub const DEFAULT_REAPER_INTERVAL_SECS: u64 = 3 * 60;
pub const DEFAULT_PRODUCT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// BOT_TOKEN; empty when only offline commands (sweep, seed-products) run
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// LOG_FILE
    pub log_file: String,
    /// DATABASE_URL (file path, `sqlite:` URL or `:memory:`)
    pub database_url: String,
    /// DEEPSEEK_API_KEY, falling back to API_KEY
    pub llm_api_key: String,
    /// DEEPSEEK_BASE_URL, without `/chat/completions`
    pub llm_base_url: String,
    /// MODEL
    pub llm_model: String,
    /// LLM_TIMEOUT_SECS
    pub llm_timeout_secs: u64,
    /// SESSION_IDLE_TIMEOUT_SECS
    pub session_idle_timeout_secs: u64,
    /// REAPER_INTERVAL_SECS
    pub reaper_interval_secs: u64,
    /// PRODUCT_DATA_DIR: directory holding `product<id>.json`
    pub product_data_dir: String,
    /// PRODUCT_API_URL: when set, product documents come from `<url>/api/products/<id>` instead
    pub product_api_url: Option<String>,
}

impl AppConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = token
            .or_else(|| env::var("BOT_TOKEN").ok())
            .unwrap_or_default();
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let llm_api_key = env::var("DEEPSEEK_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .unwrap_or_default();
        let llm_base_url =
            env::var("DEEPSEEK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let llm_model = env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            database_url,
            llm_api_key,
            llm_base_url,
            llm_model,
            llm_timeout_secs: secs_var("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            session_idle_timeout_secs: secs_var(
                "SESSION_IDLE_TIMEOUT_SECS",
                DEFAULT_IDLE_TIMEOUT_SECS,
            )?,
            reaper_interval_secs: secs_var("REAPER_INTERVAL_SECS", DEFAULT_REAPER_INTERVAL_SECS)?,
            product_data_dir: env::var("PRODUCT_DATA_DIR")
                .unwrap_or_else(|_| DEFAULT_PRODUCT_DATA_DIR.to_string()),
            product_api_url: env::var("PRODUCT_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }

    /// Validate URLs and durations. Token and API key are checked where they are needed.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if let Some(ref url_str) = self.product_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!("PRODUCT_API_URL is not a valid URL: {}", url_str);
            }
        }
        if reqwest::Url::parse(&self.llm_base_url).is_err() {
            anyhow::bail!("DEEPSEEK_BASE_URL is not a valid URL: {}", self.llm_base_url);
        }
        if self.session_idle_timeout_secs == 0 {
            anyhow::bail!("SESSION_IDLE_TIMEOUT_SECS must be greater than 0");
        }
        if self.reaper_interval_secs == 0 {
            anyhow::bail!("REAPER_INTERVAL_SECS must be greater than 0");
        }
        if self.llm_timeout_secs == 0 {
            anyhow::bail!("LLM_TIMEOUT_SECS must be greater than 0");
        }
        Ok(())
    }

    /// Fails when no bot token was given (env or `--token`).
    pub fn require_bot_token(&self) -> Result<&str> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN not set");
        }
        Ok(&self.bot_token)
    }

    /// Gateway settings; fails when no API key is configured.
    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        if self.llm_api_key.trim().is_empty() {
            anyhow::bail!("DEEPSEEK_API_KEY (or API_KEY) not set");
        }
        Ok(GatewayConfig::new(self.llm_api_key.clone())
            .with_base_url(self.llm_base_url.clone())
            .with_model(self.llm_model.clone())
            .with_timeout(Duration::from_secs(self.llm_timeout_secs)))
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs)
    }
}

fn secs_var(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds: {}", name, value)),
        Err(_) => Ok(default),
    }
}
