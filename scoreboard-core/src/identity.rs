//! Identity types for scoreboard entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Common surface of the opaque, backend-assigned identifiers.
pub trait EntityIdType:
    Clone + Eq + std::hash::Hash + fmt::Display + fmt::Debug + Send + Sync + 'static
{
    /// Wrap a raw backend identifier.
    fn new(raw: impl Into<String>) -> Self;

    /// The raw identifier as the backend knows it.
    fn as_str(&self) -> &str;
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl EntityIdType for $name {
            fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a challenge row.
    ChallengeId
);
define_entity_id!(
    /// Identifier of a person row.
    PersonId
);

/// Generate a fresh identifier string (UUIDv7, timestamp-sortable).
///
/// Used by in-memory backends; real backends assign their own ids.
pub fn new_entity_id<I: EntityIdType>() -> I {
    I::new(Uuid::now_v7().to_string())
}
