//! Scoreboard Core - Entity Types and Ranking Engine
//!
//! Pure data structures and derivations. No I/O happens in this crate; the
//! storage and client crates feed it flat collections and read back views.

pub mod entities;
pub mod error;
pub mod identity;
pub mod names;
pub mod ranking;
pub mod score_index;
pub mod sequence;
pub mod views;

pub use entities::{
    clamp_score, Challenge, EntityType, NewChallenge, NewPerson, Person, Role, Score,
};
pub use error::{BackendError, BackendResult, ScoreboardError, ScoreboardResult, ValidationError};
pub use identity::{new_entity_id, ChallengeId, EntityIdType, PersonId, Timestamp};
pub use names::{compare_names, name_exists, normalize_name, validate_new_name, Named};
pub use ranking::{
    overall_ranking, overall_table, per_challenge_ranking, ChallengeCell, ChallengeRanking,
    OverallRankingEntry, OverallTableRow, RankingEntry,
};
pub use score_index::ScoreIndex;
pub use sequence::{next_number, next_sequence, Numbered};
pub use views::DerivedViews;
