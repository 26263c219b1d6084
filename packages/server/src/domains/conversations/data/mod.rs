//! Output data types for conversation views.

use serde::{Deserialize, Serialize};

use crate::domains::conversations::models::Chat;

/// One chat as shown inside a history window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatData {
    pub id: String,
    pub author: String,
    pub message: String,
    pub reply_to: Option<String>,
    /// ISO 8601.
    pub sent_at: String,
    pub seen_at: Option<String>,
}

impl ChatData {
    pub fn from_chat(chat: &Chat) -> Self {
        Self {
            id: chat.id.to_string(),
            author: chat.author.to_string(),
            message: chat.message.clone(),
            reply_to: chat.reply_to.map(|id| id.to_string()),
            sent_at: chat.sent_at.to_rfc3339(),
            seen_at: chat.seen_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// One row of a user's conversation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationData {
    pub match_id: String,
    pub counterpart: ConversationUserData,
    /// Snapshot of the newest chat, if any have been sent.
    pub last_chat: Option<ChatData>,
    pub chat_rows: i32,
    pub day_pass: i32,
}

/// The counterpart as shown in conversation lists: id plus their selected
/// picture's resolved URL, when they have one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationUserData {
    pub user_id: String,
    pub picture_url: Option<String>,
}
