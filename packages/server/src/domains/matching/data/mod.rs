//! Output data types for match views.

use serde::{Deserialize, Serialize};

use crate::domains::matching::models::Match;

/// A match annotated with the counterpart's denormalized profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchData {
    pub id: String,
    pub status: String,
    /// Set only once the match reached ACCEPTED (ISO 8601).
    pub accepted_at: Option<String>,
    /// Opaque identity-reveal sub-flow state.
    pub reveal_status: Option<String>,
    pub counterpart: MatchUserData,
}

/// The counterpart's profile as shown in match lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchUserData {
    pub user_id: String,
    pub bio: Option<String>,
    pub gender: String,
    pub education: Option<String>,
    pub drinking: Option<String>,
    pub smoking: Option<String>,
    pub relationship_preference: Option<String>,
    pub zodiac: Option<String>,
    /// Great-circle distance from the requester, in kilometers.
    pub distance_km: f64,
    pub hobbies: Vec<InterestData>,
    pub movie_series: Vec<InterestData>,
    pub traveling: Vec<InterestData>,
    pub sports: Vec<InterestData>,
    pub pictures: Vec<PictureData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestData {
    pub id: String,
    pub value: String,
}

/// A profile picture with its resolved, time-limited URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PictureData {
    pub id: String,
    pub selected: bool,
    pub url: String,
}

impl MatchData {
    pub fn from_match(m: &Match, counterpart: MatchUserData) -> Self {
        Self {
            id: m.id.to_string(),
            status: m.request_status.clone(),
            accepted_at: m.accepted_at.map(|dt| dt.to_rfc3339()),
            reveal_status: m.reveal_status.clone(),
            counterpart,
        }
    }
}
