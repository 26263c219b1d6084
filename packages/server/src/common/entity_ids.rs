//! Typed ID definitions for all domain entities.
//!
//! This module defines type aliases for each domain entity, providing
//! compile-time type safety for ID usage throughout the application.

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for user entities.
pub struct User;

/// Marker type for Match entities (pairwise match rows).
pub struct Match;

/// Marker type for Chat entities (messages inside a conversation).
pub struct Chat;

/// Marker type for File entities (object-storage-held blobs).
pub struct File;

/// Marker type for ProfilePicture entities.
pub struct ProfilePicture;

/// Marker type for interest rows (hobbies, movie/series, traveling, sports).
pub struct Interest;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for user entities.
pub type UserId = Id<User>;

/// Typed ID for Match entities.
pub type MatchId = Id<Match>;

/// Typed ID for Chat entities.
pub type ChatId = Id<Chat>;

/// Typed ID for File entities.
pub type FileId = Id<File>;

/// Typed ID for ProfilePicture entities.
pub type PictureId = Id<ProfilePicture>;

/// Typed ID for interest rows.
pub type InterestId = Id<Interest>;
