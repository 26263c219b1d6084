pub mod candidates;
pub mod queries;
pub mod transition;

pub use candidates::{create_candidates, list_candidates};
pub use queries::{list_matches, show_match};
pub use transition::transition;
