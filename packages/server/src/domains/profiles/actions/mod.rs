pub mod aggregate;
pub mod attachments;
pub mod update;

pub use aggregate::get_by_ids;
pub use attachments::resolve_urls;
pub use update::{replace_interests, select_picture, update_profile};
