//! Assembled profile aggregate.

use crate::domains::profiles::models::{Interest, PictureWithFile, UserDetail};

/// A user's full denormalized profile: base detail plus all owned
/// collections, loaded as a unit.
#[derive(Debug, Clone)]
pub struct UserDetailAggregate {
    pub detail: UserDetail,
    pub hobbies: Vec<Interest>,
    pub movie_series: Vec<Interest>,
    pub traveling: Vec<Interest>,
    pub sports: Vec<Interest>,
    /// Selected-first; storage keys not yet resolved to URLs.
    pub pictures: Vec<PictureWithFile>,
}

impl UserDetailAggregate {
    pub fn new(detail: UserDetail) -> Self {
        Self {
            detail,
            hobbies: Vec::new(),
            movie_series: Vec::new(),
            traveling: Vec::new(),
            sports: Vec::new(),
            pictures: Vec::new(),
        }
    }

    /// Storage keys of every picture in this aggregate.
    pub fn picture_keys(&self) -> impl Iterator<Item = &str> {
        self.pictures.iter().map(|p| p.blob_link.as_str())
    }
}
