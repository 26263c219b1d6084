//! User profiles: detail aggregate, interests, pictures, attachment URLs.

pub mod actions;
pub mod data;
pub mod models;
