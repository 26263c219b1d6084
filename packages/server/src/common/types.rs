// Common types used across multiple domains and layers

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state optional value for partial updates.
///
/// A PATCH payload needs to distinguish "leave this column alone" from "clear
/// it" from "set it to v". `Option<T>` collapses the first two, so update
/// operations branch on this tag instead:
///
/// - `Absent` — field was not supplied; keep the stored value
/// - `Null` — field was supplied as null; clear the stored value
/// - `Value(v)` — field was supplied; overwrite the stored value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Maybe<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Maybe<T> {
    /// True when the field was supplied at all (null or value).
    pub fn is_set(&self) -> bool {
        !matches!(self, Maybe::Absent)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Maybe::Absent)
    }

    /// The value to write when `is_set()`: `None` clears, `Some(v)` overwrites.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Maybe::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Maybe::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Maybe::Value(v),
            None => Maybe::Null,
        }
    }
}

// On the wire a Maybe field is an ordinary nullable field; absence is modeled
// by `#[serde(default)]` on the containing struct field.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Maybe<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Maybe::from)
    }
}

impl<T: Serialize> Serialize for Maybe<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Maybe::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default)]
        bio: Maybe<String>,
        #[serde(default)]
        zodiac: Maybe<String>,
    }

    #[test]
    fn test_absent_vs_null_vs_value() {
        let patch: Patch = serde_json::from_str(r#"{"bio": null, "zodiac": "leo"}"#).unwrap();
        assert_eq!(patch.bio, Maybe::Null);
        assert_eq!(patch.zodiac, Maybe::Value("leo".to_string()));

        let patch: Patch = serde_json::from_str(r#"{}"#).unwrap();
        assert!(patch.bio.is_absent());
        assert!(patch.zodiac.is_absent());
    }

    #[test]
    fn test_branching_helpers() {
        let set: Maybe<i32> = Maybe::Value(7);
        assert!(set.is_set());
        assert_eq!(set.as_option(), Some(&7));

        let cleared: Maybe<i32> = Maybe::Null;
        assert!(cleared.is_set());
        assert_eq!(cleared.as_option(), None);

        let absent: Maybe<i32> = Maybe::Absent;
        assert!(!absent.is_set());
    }
}
