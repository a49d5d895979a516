//! Incoming message type for the core model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, user::User};

/// A single incoming text message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Builds a text message from a private chat; the chat id doubles as the user id.
    pub fn text(chat_id: i64, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user: User {
                id: chat_id,
                ..User::unknown()
            },
            chat: Chat::private(chat_id),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
