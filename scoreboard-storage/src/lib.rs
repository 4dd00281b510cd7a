//! Scoreboard Storage - Backend Trait and In-Memory Backend
//!
//! Defines the narrow interface the scoreboard consumes from its
//! backend-as-a-service, an in-memory implementation for tests, the entity
//! store mirror and the session service that ties them together.

pub mod session;
pub mod store;

pub use session::{ChallengeDraft, Scoreboard, SessionOptions};
pub use store::{EntityStore, StoreSnapshot};

use async_trait::async_trait;
use scoreboard_core::{
    new_entity_id, BackendError, BackendResult, Challenge, ChallengeId, NewChallenge, NewPerson,
    Person, PersonId, Role, Score,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// ============================================================================
// BACKEND TRAIT
// ============================================================================

/// Full snapshot returned by [`Backend::load_all`].
///
/// Challenges come ordered by display number, people by enrollment number,
/// scores unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedEntities {
    pub challenges: Vec<Challenge>,
    pub people: Vec<Person>,
    pub scores: Vec<Score>,
}

/// Backend operations, used for logging, error context and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    LoadAll,
    InsertChallenge,
    InsertPerson,
    DeleteChallenge,
    DeletePerson,
    UpsertScore,
    CurrentUserRole,
}

impl fmt::Display for BackendOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendOp::LoadAll => "load all",
            BackendOp::InsertChallenge => "insert challenge",
            BackendOp::InsertPerson => "insert person",
            BackendOp::DeleteChallenge => "delete challenge",
            BackendOp::DeletePerson => "delete person",
            BackendOp::UpsertScore => "upsert score",
            BackendOp::CurrentUserRole => "load role",
        };
        f.write_str(name)
    }
}

/// The system of record. Implementations own persistence, auth and
/// row-level access; the scoreboard only issues these calls.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch every challenge, person and score.
    async fn load_all(&self) -> BackendResult<LoadedEntities>;

    /// Insert a challenge and return the stored row.
    async fn insert_challenge(&self, record: &NewChallenge) -> BackendResult<Challenge>;

    /// Insert a person and return the stored row.
    async fn insert_person(&self, record: &NewPerson) -> BackendResult<Person>;

    /// Delete a challenge and every score that references it.
    async fn delete_challenge(&self, id: &ChallengeId) -> BackendResult<()>;

    /// Delete a person. Their score rows are left in place.
    async fn delete_person(&self, id: &PersonId) -> BackendResult<()>;

    /// Insert or replace the score for `(person_id, challenge_id)`.
    async fn upsert_score(
        &self,
        person_id: &PersonId,
        challenge_id: &ChallengeId,
        value: i64,
    ) -> BackendResult<()>;

    /// Role of the signed-in user.
    async fn current_user_role(&self) -> BackendResult<Role>;
}

// ============================================================================
// MOCK BACKEND
// ============================================================================

#[derive(Debug, Default)]
struct MockState {
    challenges: Vec<Challenge>,
    people: Vec<Person>,
    scores: Vec<Score>,
    role: Role,
    calls: HashMap<BackendOp, usize>,
    failures: HashMap<BackendOp, String>,
    delays: HashMap<BackendOp, Duration>,
}

/// In-memory backend for tests.
///
/// Counts calls per operation and can be told to reject or stall the next
/// call of a given operation.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock backend pre-populated with rows.
    pub fn with_entities(entities: LoadedEntities) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            state.challenges = entities.challenges;
            state.people = entities.people;
            state.scores = entities.scores;
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_role(&self, role: Role) {
        self.lock().role = role;
    }

    /// Make the next call of `op` fail with `message`.
    pub fn fail_next(&self, op: BackendOp, message: impl Into<String>) {
        self.lock().failures.insert(op, message.into());
    }

    /// Make every call of `op` wait `delay` before answering.
    pub fn stall(&self, op: BackendOp, delay: Duration) {
        self.lock().delays.insert(op, delay);
    }

    /// Number of times `op` was called, including failed calls.
    pub fn calls(&self, op: BackendOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Rows currently held by the backend.
    pub fn entities(&self) -> LoadedEntities {
        let state = self.lock();
        LoadedEntities {
            challenges: state.challenges.clone(),
            people: state.people.clone(),
            scores: state.scores.clone(),
        }
    }

    /// Insert a row directly, as another session would.
    pub fn push_person(&self, person: Person) {
        self.lock().people.push(person);
    }

    /// Record the call, then apply any injected stall or failure.
    async fn enter(&self, op: BackendOp) -> BackendResult<()> {
        let (delay, failure) = {
            let mut state = self.lock();
            *state.calls.entry(op).or_insert(0) += 1;
            (state.delays.get(&op).copied(), state.failures.remove(&op))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(message) => Err(BackendError::rejected(op.to_string(), message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn load_all(&self) -> BackendResult<LoadedEntities> {
        self.enter(BackendOp::LoadAll).await?;
        let mut entities = self.entities();
        entities.challenges.sort_by_key(|c| c.display_number);
        entities.people.sort_by_key(|p| p.enrollment_number);
        Ok(entities)
    }

    async fn insert_challenge(&self, record: &NewChallenge) -> BackendResult<Challenge> {
        self.enter(BackendOp::InsertChallenge).await?;
        let challenge = Challenge {
            id: new_entity_id(),
            display_number: record.display_number,
            name: record.name.clone(),
            description: record.description.clone(),
            max_score: record.max_score,
        };
        self.lock().challenges.push(challenge.clone());
        Ok(challenge)
    }

    async fn insert_person(&self, record: &NewPerson) -> BackendResult<Person> {
        self.enter(BackendOp::InsertPerson).await?;
        let person = Person {
            id: new_entity_id(),
            enrollment_number: record.enrollment_number,
            name: record.name.clone(),
        };
        self.lock().people.push(person.clone());
        Ok(person)
    }

    async fn delete_challenge(&self, id: &ChallengeId) -> BackendResult<()> {
        self.enter(BackendOp::DeleteChallenge).await?;
        let mut state = self.lock();
        state.scores.retain(|s| &s.challenge_id != id);
        state.challenges.retain(|c| &c.id != id);
        Ok(())
    }

    async fn delete_person(&self, id: &PersonId) -> BackendResult<()> {
        self.enter(BackendOp::DeletePerson).await?;
        self.lock().people.retain(|p| &p.id != id);
        Ok(())
    }

    async fn upsert_score(
        &self,
        person_id: &PersonId,
        challenge_id: &ChallengeId,
        value: i64,
    ) -> BackendResult<()> {
        self.enter(BackendOp::UpsertScore).await?;
        let mut state = self.lock();
        match state
            .scores
            .iter()
            .position(|s| s.is_for(person_id, challenge_id))
        {
            Some(i) => state.scores[i].value = value,
            None => state
                .scores
                .push(Score::new(person_id.clone(), challenge_id.clone(), value)),
        }
        Ok(())
    }

    async fn current_user_role(&self) -> BackendResult<Role> {
        self.enter(BackendOp::CurrentUserRole).await?;
        Ok(self.lock().role)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_challenge(number: i64, name: &str) -> NewChallenge {
        NewChallenge {
            display_number: number,
            name: name.to_string(),
            description: None,
            max_score: 100,
        }
    }

    #[tokio::test]
    async fn test_load_all_orders_by_sequence_numbers() {
        let backend = MockBackend::new();
        backend.insert_challenge(&new_challenge(2, "B")).await.unwrap();
        backend.insert_challenge(&new_challenge(1, "A")).await.unwrap();

        let loaded = backend.load_all().await.unwrap();
        let numbers: Vec<i64> = loaded.challenges.iter().map(|c| c.display_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_composite_key() {
        let backend = MockBackend::new();
        let p = PersonId::from("p1");
        let c = ChallengeId::from("c1");
        backend.upsert_score(&p, &c, 10).await.unwrap();
        backend.upsert_score(&p, &c, 30).await.unwrap();

        let scores = backend.entities().scores;
        assert_eq!(scores, vec![Score::new(p, c, 30)]);
    }

    #[tokio::test]
    async fn test_delete_challenge_cascades_scores() {
        let backend = MockBackend::new();
        let challenge = backend.insert_challenge(&new_challenge(1, "A")).await.unwrap();
        let p = PersonId::from("p1");
        backend.upsert_score(&p, &challenge.id, 5).await.unwrap();
        backend
            .upsert_score(&p, &ChallengeId::from("other"), 7)
            .await
            .unwrap();

        backend.delete_challenge(&challenge.id).await.unwrap();

        let entities = backend.entities();
        assert!(entities.challenges.is_empty());
        assert_eq!(entities.scores.len(), 1);
        assert_eq!(entities.scores[0].value, 7);
    }

    #[tokio::test]
    async fn test_delete_person_leaves_scores() {
        let backend = MockBackend::new();
        let person = backend
            .insert_person(&NewPerson {
                enrollment_number: 1,
                name: "Ana".to_string(),
            })
            .await
            .unwrap();
        backend
            .upsert_score(&person.id, &ChallengeId::from("c1"), 5)
            .await
            .unwrap();

        backend.delete_person(&person.id).await.unwrap();

        let entities = backend.entities();
        assert!(entities.people.is_empty());
        assert_eq!(entities.scores.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_applies_once_and_counts() {
        let backend = MockBackend::new();
        backend.fail_next(BackendOp::InsertChallenge, "row-level security");

        let err = backend
            .insert_challenge(&new_challenge(1, "A"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "row-level security");
        assert!(backend.entities().challenges.is_empty());

        backend.insert_challenge(&new_challenge(1, "A")).await.unwrap();
        assert_eq!(backend.calls(BackendOp::InsertChallenge), 2);
        assert_eq!(backend.calls(BackendOp::InsertPerson), 0);
    }

    #[tokio::test]
    async fn test_role_defaults_to_user() {
        let backend = MockBackend::new();
        assert_eq!(backend.current_user_role().await.unwrap(), Role::User);
        backend.set_role(Role::Admin);
        assert_eq!(backend.current_user_role().await.unwrap(), Role::Admin);
    }
}
