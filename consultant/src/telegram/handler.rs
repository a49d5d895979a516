//! Consultant handler: routes chat commands to [`ConsultantService`] and replies through [`Bot`].
//!
//! Each chat keeps its session token (and selected product) in memory, the bot's
//! equivalent of a cookie jar. Questions before `/start` are refused.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::command::Command;
use crate::core::{Bot, Handler, HandlerResponse, Message, Result};
use crate::service::{domain_reply, replies, ConsultantService, ServiceReply};
use crate::session::Credentials;

/// Per-chat client state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub token: String,
    pub product_id: Option<String>,
}

pub struct ConsultantHandler {
    service: Arc<ConsultantService>,
    bot: Arc<dyn Bot>,
    chats: DashMap<i64, ChatState>,
}

impl ConsultantHandler {
    pub fn new(service: Arc<ConsultantService>, bot: Arc<dyn Bot>) -> Self {
        Self {
            service,
            bot,
            chats: DashMap::new(),
        }
    }

    /// Current state of `chat_id`, if it has started a session.
    pub fn chat_state(&self, chat_id: i64) -> Option<ChatState> {
        self.chats.get(&chat_id).map(|s| s.clone())
    }

    fn token(&self, chat_id: i64) -> Option<String> {
        self.chats.get(&chat_id).map(|s| s.token.clone())
    }

    /// Stores the token from `reply` (or forgets the chat when it is empty) and returns the text.
    fn apply(&self, chat_id: i64, reply: ServiceReply) -> String {
        if reply.session.is_none() {
            self.chats.remove(&chat_id);
        } else {
            self.chats.entry(chat_id).or_default().token = reply.session.token;
        }
        reply.text
    }

    async fn credentials_command(&self, chat_id: i64, login: &str, password: &str, register: bool) -> String {
        let credentials = match Credentials::new(login, password) {
            Ok(c) => c,
            Err(e) => return domain_reply(&e).unwrap_or(replies::INVALID_CREDENTIALS).to_string(),
        };
        let token = self.token(chat_id);
        let result = if register {
            self.service.register(token.as_deref(), &credentials).await
        } else {
            self.service.login(token.as_deref(), &credentials).await
        };
        match result {
            Ok(reply) => self.apply(chat_id, reply),
            Err(e) => {
                error!(error = %e, chat_id, "Credentials command failed");
                replies::TECHNICAL_ISSUES.to_string()
            }
        }
    }

    async fn product_command(&self, chat_id: i64, product_id: &str) -> String {
        if !self.chats.contains_key(&chat_id) {
            return replies::START_FIRST.to_string();
        }
        match self.service.product(product_id).await {
            Ok(Some(doc)) => {
                if let Some(mut state) = self.chats.get_mut(&chat_id) {
                    state.product_id = Some(product_id.to_string());
                }
                format!("{} ({})\n{}", doc.name, doc.category, doc.description)
                    .trim_end()
                    .to_string()
            }
            Ok(None) => replies::PRODUCT_NOT_FOUND.to_string(),
            Err(e) => {
                error!(error = %e, chat_id, product_id = %product_id, "Product lookup failed");
                replies::TECHNICAL_ISSUES.to_string()
            }
        }
    }

    async fn question(&self, chat_id: i64, text: &str) -> String {
        let Some(state) = self.chat_state(chat_id) else {
            return replies::START_FIRST.to_string();
        };
        match self
            .service
            .message(Some(&state.token), text, state.product_id.as_deref())
            .await
        {
            Ok(reply) => self.apply(chat_id, reply),
            Err(e) => {
                error!(error = %e, chat_id, "Message handling failed");
                replies::APOLOGY.to_string()
            }
        }
    }
}

#[async_trait]
impl Handler for ConsultantHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.trim();
        if text.is_empty() {
            return Ok(HandlerResponse::Ignore);
        }
        let chat_id = message.chat.id;

        let reply = match Command::parse(text) {
            Command::Help => replies::HELP.to_string(),
            Command::Start => match self.service.start(self.token(chat_id).as_deref()).await {
                Ok(reply) => {
                    let text = self.apply(chat_id, reply);
                    info!(chat_id, "Consultation started");
                    text
                }
                Err(e) => {
                    error!(error = %e, chat_id, "Failed to start session");
                    replies::TECHNICAL_ISSUES.to_string()
                }
            },
            Command::End => match self.service.end(self.token(chat_id).as_deref()).await {
                Ok(reply) => self.apply(chat_id, reply),
                Err(e) => {
                    error!(error = %e, chat_id, "Failed to end session");
                    replies::TECHNICAL_ISSUES.to_string()
                }
            },
            Command::Register { login, password } => {
                self.credentials_command(chat_id, &login, &password, true).await
            }
            Command::Login { login, password } => {
                self.credentials_command(chat_id, &login, &password, false).await
            }
            Command::Product(id) => self.product_command(chat_id, &id).await,
            Command::Question(question) => self.question(chat_id, &question).await,
        };

        self.bot.reply_to(message, &reply).await?;
        Ok(HandlerResponse::Reply(reply))
    }
}
