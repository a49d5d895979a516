//! Consultant CLI: run the bot, run one sweep, seed the product catalog. Config from env and optional CLI args.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "consultant")]
#[command(about = "Electronics store consultant: Telegram bot, session reaper, catalog seeding", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot and the session reaper (token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Run one reaper sweep and exit.
    Sweep,
    /// Load catalog products from a JSON array file.
    SeedProducts {
        file: PathBuf,
    },
}

/// Loads [`AppConfig`] from env; `token` overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<AppConfig> {
    AppConfig::load(token)
}
