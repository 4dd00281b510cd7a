//! Sparse person → challenge → score lookup.

use crate::{ChallengeId, Person, PersonId, Score};
use serde::Serialize;
use std::collections::HashMap;

/// Two-level score lookup built from the flat score rows.
///
/// Every known person has an entry, even with no scores. Rows for unknown
/// people are dropped. Missing pairs read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreIndex {
    by_person: HashMap<PersonId, HashMap<ChallengeId, i64>>,
}

impl ScoreIndex {
    pub fn build(people: &[Person], scores: &[Score]) -> Self {
        let mut by_person: HashMap<PersonId, HashMap<ChallengeId, i64>> = people
            .iter()
            .map(|p| (p.id.clone(), HashMap::new()))
            .collect();

        for score in scores {
            if let Some(row) = by_person.get_mut(&score.person_id) {
                row.insert(score.challenge_id.clone(), stored_points(score.value));
            }
        }

        Self { by_person }
    }

    /// Score for the pair, or 0 when absent.
    pub fn lookup(&self, person_id: &PersonId, challenge_id: &ChallengeId) -> i64 {
        self.by_person
            .get(person_id)
            .and_then(|row| row.get(challenge_id))
            .copied()
            .unwrap_or(0)
    }

    /// Scores recorded for one person.
    pub fn row(&self, person_id: &PersonId) -> Option<&HashMap<ChallengeId, i64>> {
        self.by_person.get(person_id)
    }

    pub fn contains_person(&self, person_id: &PersonId) -> bool {
        self.by_person.contains_key(person_id)
    }

    /// Number of people indexed.
    pub fn len(&self) -> usize {
        self.by_person.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_person.is_empty()
    }
}

/// Stored values below zero are treated as 0.
fn stored_points(value: i64) -> i64 {
    value.max(0)
}
