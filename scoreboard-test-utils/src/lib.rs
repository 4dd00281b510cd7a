//! Scoreboard Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for challenges, people and score sets
//! - Fixtures for the common two-person scenario
//! - Assertions for scoreboard-specific error shapes

// Re-export the in-memory backend from its source crate
pub use scoreboard_storage::{LoadedEntities, MockBackend};

pub use scoreboard_core::{
    BackendError, Challenge, ChallengeId, DerivedViews, EntityIdType, EntityType, Person,
    PersonId, Role, Score, ScoreboardError, ScoreboardResult, ValidationError,
};

use scoreboard_storage::{Scoreboard, SessionOptions};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for scoreboard entities.

    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random UUID, used as an opaque id string.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_challenge_id() -> impl Strategy<Value = ChallengeId> {
        arb_uuid().prop_map(|u| ChallengeId::new(u.to_string()))
    }

    pub fn arb_person_id() -> impl Strategy<Value = PersonId> {
        arb_uuid().prop_map(|u| PersonId::new(u.to_string()))
    }

    /// Short names drawn from a small alphabet so case and accent ties occur.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[AaÁáBbCc]{1,3}"
    }

    pub fn arb_challenge() -> impl Strategy<Value = Challenge> {
        (arb_challenge_id(), 1i64..50, arb_name(), -10i64..200).prop_map(
            |(id, display_number, name, max_score)| Challenge {
                id,
                display_number,
                name,
                description: None,
                max_score,
            },
        )
    }

    pub fn arb_person() -> impl Strategy<Value = Person> {
        (arb_person_id(), 1i64..50, arb_name()).prop_map(|(id, enrollment_number, name)| Person {
            id,
            enrollment_number,
            name,
        })
    }

    /// A full table set. Ids are `c{i}` and `p{i}`; some scores point past
    /// the generated rows so orphans are covered, and values may be
    /// negative or repeat a pair.
    pub fn arb_entities() -> impl Strategy<Value = LoadedEntities> {
        (0usize..6, 0usize..8).prop_flat_map(|(challenge_count, person_count)| {
            let challenges =
                prop::collection::vec((arb_name(), -10i64..200), challenge_count);
            let people = prop::collection::vec((arb_name(), 1i64..20), person_count);
            let scores = prop::collection::vec(
                (0..person_count + 2, 0..challenge_count + 2, -20i64..250),
                0..24,
            );
            (challenges, people, scores).prop_map(|(challenges, people, scores)| {
                LoadedEntities {
                    challenges: challenges
                        .into_iter()
                        .enumerate()
                        .map(|(i, (name, max_score))| Challenge {
                            id: ChallengeId::new(format!("c{i}")),
                            display_number: i as i64 + 1,
                            name,
                            description: None,
                            max_score,
                        })
                        .collect(),
                    people: people
                        .into_iter()
                        .enumerate()
                        .map(|(i, (name, enrollment_number))| Person {
                            id: PersonId::new(format!("p{i}")),
                            enrollment_number,
                            name,
                        })
                        .collect(),
                    scores: scores
                        .into_iter()
                        .map(|(p, c, value)| {
                            Score::new(
                                PersonId::new(format!("p{p}")),
                                ChallengeId::new(format!("c{c}")),
                                value,
                            )
                        })
                        .collect(),
                }
            })
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Ready-made rows and sessions.

    use super::*;

    pub fn challenge(id: &str, number: i64, name: &str, max_score: i64) -> Challenge {
        Challenge {
            id: ChallengeId::from(id),
            display_number: number,
            name: name.to_string(),
            description: None,
            max_score,
        }
    }

    pub fn person(id: &str, number: i64, name: &str) -> Person {
        Person {
            id: PersonId::from(id),
            enrollment_number: number,
            name: name.to_string(),
        }
    }

    /// Quiz (max 100) and Relay (max 50); Ana scored 80 on Quiz, Bruno 80
    /// on Quiz and 50 on Relay.
    pub fn scenario() -> LoadedEntities {
        LoadedEntities {
            challenges: vec![challenge("c1", 1, "Quiz", 100), challenge("c2", 2, "Relay", 50)],
            people: vec![person("p1", 1, "Ana"), person("p2", 2, "Bruno")],
            scores: vec![
                Score::new("p1".into(), "c1".into(), 80),
                Score::new("p2".into(), "c1".into(), 80),
                Score::new("p2".into(), "c2".into(), 50),
            ],
        }
    }

    /// An opened session over an in-memory backend holding `entities`.
    pub async fn scoreboard_with(
        entities: LoadedEntities,
        role: Role,
    ) -> ScoreboardResult<Scoreboard<MockBackend>> {
        let backend = MockBackend::with_entities(entities);
        backend.set_role(role);
        let mut scoreboard = Scoreboard::new(backend, SessionOptions::default());
        scoreboard.open().await?;
        Ok(scoreboard)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for scoreboard results.

    use super::*;

    /// Assert the result failed local validation.
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &ScoreboardResult<T>) {
        assert!(
            matches!(result, Err(ScoreboardError::Validation(_))),
            "Expected validation error, got {:?}",
            result
        );
    }

    /// Assert the backend rejected the call with exactly `message`.
    pub fn assert_rejected_with<T: std::fmt::Debug>(result: &ScoreboardResult<T>, message: &str) {
        match result {
            Err(ScoreboardError::Backend(err @ BackendError::Rejected { .. })) => {
                assert_eq!(err.user_message(), message);
            }
            other => panic!("Expected backend rejection, got {:?}", other),
        }
    }

    /// Assert the overall ranking lists these names in this order.
    pub fn assert_overall_order(views: &DerivedViews, expected: &[&str]) {
        let names: Vec<&str> = views
            .overall_ranking
            .iter()
            .map(|e| e.person_name.as_str())
            .collect();
        assert_eq!(names, expected);
    }
}
