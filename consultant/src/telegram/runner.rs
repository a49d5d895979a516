//! REPL runner: converts teloxide messages to core::Message and hands each to the handler in its own task.

use crate::core::{Handler, ToCoreMessage};
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use super::adapters::TelegramMessageWrapper;
use super::command::loggable_text;

/// Creates the teloxide Bot, pointing it at `api_url` when given.
pub fn build_teloxide_bot(token: &str, api_url: Option<&str>) -> Result<teloxide::Bot> {
    let bot = teloxide::Bot::new(token);
    match api_url {
        Some(url_str) => {
            let url = reqwest::Url::parse(url_str)
                .map_err(|e| anyhow::anyhow!("Invalid TELEGRAM_API_URL {}: {}", url_str, e))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Starts the REPL. Each message is converted to core::Message and passed to `handler` in a spawned task.
#[instrument(skip(bot, handler))]
pub async fn run_repl(bot: teloxide::Bot, handler: Arc<dyn Handler>) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        if let Some(username) = &me.user.username {
            info!(username = %username, "Connected to Telegram");
        }
    }

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let handler = handler.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();

            match msg.text() {
                Some(text) => {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        message_content = %loggable_text(text),
                        "Received message"
                    );
                }
                None => {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        "Received non-text message"
                    );
                }
            }

            tokio::spawn(async move {
                if let Err(e) = handler.handle(&core_msg).await {
                    error!(error = %e, chat_id = core_msg.chat.id, "Handler failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
