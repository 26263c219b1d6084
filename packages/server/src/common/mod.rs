// Common types and utilities shared across the application

pub mod entity_ids;
pub mod errors;
pub mod geo;
pub mod id;
pub mod pagination;
pub mod types;

pub use entity_ids::*;
pub use errors::{AppError, AppResult, FieldErrors};
pub use geo::GeoPoint;
pub use id::{Id, V4, V7};
pub use pagination::{
    assemble_window, ChatCursor, CursorArgs, ValidatedCursorArgs, Window, WindowDirection,
};
pub use types::Maybe;
