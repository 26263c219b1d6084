//! Match lifecycle: candidate discovery, swiping, acceptance.

pub mod actions;
pub mod data;
pub mod models;
