//! Core entity structures

use crate::{ChallengeId, PersonId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type discriminator used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Challenge,
    Person,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Challenge => "challenge",
            EntityType::Person => "person",
        };
        f.write_str(name)
    }
}

/// Role of the signed-in user. Only gates presentation; the core's guards
/// apply regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Parse a role column value. Anything other than `admin` is a plain user.
    pub fn from_column(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "admin" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn can_write(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A scored task with a maximum achievable score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub display_number: i64,
    pub name: String,
    pub description: Option<String>,
    pub max_score: i64,
}

/// A participant who may accumulate a score per challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub enrollment_number: i64,
    pub name: String,
}

/// Points a person earned on one challenge. At most one per
/// `(person_id, challenge_id)` pair; a missing pair means 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub person_id: PersonId,
    pub challenge_id: ChallengeId,
    pub value: i64,
}

impl Score {
    pub fn new(person_id: PersonId, challenge_id: ChallengeId, value: i64) -> Self {
        Self {
            person_id,
            challenge_id,
            value,
        }
    }

    /// Whether this row is for the given composite key.
    pub fn is_for(&self, person_id: &PersonId, challenge_id: &ChallengeId) -> bool {
        &self.person_id == person_id && &self.challenge_id == challenge_id
    }
}

/// Insert payload for a challenge (already validated and numbered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChallenge {
    pub display_number: i64,
    pub name: String,
    pub description: Option<String>,
    pub max_score: i64,
}

/// Insert payload for a person (already validated and numbered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub enrollment_number: i64,
    pub name: String,
}

/// Clamp an edited score into `[0, max_score]`.
pub fn clamp_score(value: i64, max_score: i64) -> i64 {
    value.clamp(0, max_score.max(0))
}
