//! Conversations and chat history for accepted matches.

pub mod actions;
pub mod data;
pub mod models;
