pub mod queries;
pub mod send;

pub use queries::{list_chats, list_conversations};
pub use send::create_chat;
