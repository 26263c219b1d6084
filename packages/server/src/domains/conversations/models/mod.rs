pub mod chats;
pub mod conversation;

pub use chats::Chat;
pub use conversation::{Conversation, ConversationListRow};
