//! Matching and conversation core for the dating platform.
//!
//! This crate owns candidate discovery, the match lifecycle state machine,
//! profile aggregation, attachment URL resolution, and conversation/chat
//! pagination. HTTP routing, session verification, and the object-storage
//! client live outside; they reach this crate through [`kernel::ServerDeps`].

pub mod common;
pub mod domains;
pub mod kernel;
