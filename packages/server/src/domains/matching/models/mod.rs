pub mod candidates;
pub mod matches;

pub use candidates::find_candidates;
pub use matches::{counterpart_of, Match, MatchStatus, CANDIDATE_BATCH};
