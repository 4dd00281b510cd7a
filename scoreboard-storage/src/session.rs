//! Session service: validation, numbering and backend calls for every
//! mutation, plus the reload cycle that keeps the entity store converged.
//!
//! Every backend call runs under a timeout. A failed or timed-out call
//! leaves the store exactly as it was. Successful mutations patch the one
//! affected row and then trigger a full reload.

use crate::store::{EntityStore, StoreSnapshot};
use crate::{Backend, BackendOp};
use scoreboard_core::{
    clamp_score, next_sequence, validate_new_name, BackendError, BackendResult, Challenge,
    ChallengeId, DerivedViews, EntityType, NewChallenge, NewPerson, Person, PersonId, Role,
    Score, ScoreboardResult, ValidationError,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout applied to every backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_millis(12_000);

/// Tuning for a [`Scoreboard`] session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub backend_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }
}

impl SessionOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }
}

/// User input for a new challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDraft {
    pub name: String,
    pub description: Option<String>,
    pub max_score: i64,
}

impl ChallengeDraft {
    pub fn new(name: impl Into<String>, max_score: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            max_score,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

async fn with_timeout<T, F>(timeout: Duration, op: BackendOp, call: F) -> BackendResult<T>
where
    F: Future<Output = BackendResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout {
            operation: op.to_string(),
            after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// One authenticated session against a backend.
pub struct Scoreboard<B: Backend> {
    backend: B,
    options: SessionOptions,
    store: EntityStore,
    role: Role,
    selected_challenge: Option<ChallengeId>,
    stale: bool,
}

impl<B: Backend> Scoreboard<B> {
    pub fn new(backend: B, options: SessionOptions) -> Self {
        Self {
            backend,
            options,
            store: EntityStore::new(),
            role: Role::User,
            selected_challenge: None,
            stale: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.store.snapshot()
    }

    /// The four derived views for the current snapshot.
    pub fn views(&self) -> Arc<DerivedViews> {
        self.store.views()
    }

    /// True when a mutation succeeded but the follow-up reload did not, so
    /// the visible state may lag the backend.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number the next challenge would receive right now.
    pub fn preview_challenge_number(&self) -> i64 {
        next_sequence(self.store.snapshot().challenges())
    }

    /// Number the next person would receive right now.
    pub fn preview_enrollment_number(&self) -> i64 {
        next_sequence(self.store.snapshot().people())
    }

    pub fn selected_challenge(&self) -> Option<&ChallengeId> {
        self.selected_challenge.as_ref()
    }

    pub fn select_challenge(&mut self, id: &ChallengeId) -> ScoreboardResult<()> {
        if self.store.snapshot().challenge(id).is_none() {
            return Err(ValidationError::UnknownChallenge { id: id.to_string() }.into());
        }
        self.selected_challenge = Some(id.clone());
        Ok(())
    }

    async fn call<T, F>(&self, op: BackendOp, call: F) -> BackendResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        let result = with_timeout(self.options.backend_timeout, op, call).await;
        if let Err(err) = &result {
            tracing::warn!(operation = %op, error = %err, "backend call failed");
        }
        result
    }

    /// Sign-in hook: fetch the role and the full snapshot.
    ///
    /// A failed role lookup falls back to [`Role::User`]; the snapshot is
    /// loaded either way.
    pub async fn open(&mut self) -> ScoreboardResult<()> {
        self.role = self
            .call(BackendOp::CurrentUserRole, self.backend.current_user_role())
            .await
            .unwrap_or_default();
        tracing::info!(role = ?self.role, "session opened");
        self.reload().await
    }

    /// Replace the store with a fresh backend snapshot.
    pub async fn reload(&mut self) -> ScoreboardResult<()> {
        let loaded = self
            .call(BackendOp::LoadAll, self.backend.load_all())
            .await?;
        tracing::debug!(
            challenges = loaded.challenges.len(),
            people = loaded.people.len(),
            scores = loaded.scores.len(),
            "snapshot loaded"
        );
        self.store.replace(loaded);
        self.stale = false;
        self.fix_selection();
        Ok(())
    }

    /// Forget everything held for the session.
    pub fn sign_out(&mut self) {
        self.store.clear();
        self.role = Role::User;
        self.selected_challenge = None;
        self.stale = false;
        tracing::info!("session closed");
    }

    fn fix_selection(&mut self) {
        let snapshot = self.store.snapshot();
        let still_there = self
            .selected_challenge
            .as_ref()
            .is_some_and(|id| snapshot.challenge(id).is_some());
        if !still_there {
            self.selected_challenge = snapshot.challenges().first().map(|c| c.id.clone());
        }
    }

    async fn converge(&mut self) {
        if let Err(err) = self.reload().await {
            self.stale = true;
            tracing::warn!(error = %err, "reload after mutation failed; view may be stale");
        }
    }

    pub async fn create_challenge(&mut self, draft: ChallengeDraft) -> ScoreboardResult<Challenge> {
        let snapshot = self.store.snapshot();
        let name = validate_new_name(snapshot.challenges(), &draft.name, EntityType::Challenge)?;
        if draft.max_score < 0 {
            return Err(ValidationError::InvalidMaxScore {
                value: draft.max_score,
            }
            .into());
        }
        let record = NewChallenge {
            display_number: next_sequence(snapshot.challenges()),
            name,
            description: draft
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            max_score: draft.max_score,
        };

        let challenge = self
            .call(BackendOp::InsertChallenge, self.backend.insert_challenge(&record))
            .await?;
        tracing::info!(
            id = %challenge.id,
            number = challenge.display_number,
            name = %challenge.name,
            "challenge created"
        );
        self.store.append_challenge(challenge.clone());
        self.converge().await;
        Ok(challenge)
    }

    pub async fn create_person(&mut self, name: &str) -> ScoreboardResult<Person> {
        let snapshot = self.store.snapshot();
        let name = validate_new_name(snapshot.people(), name, EntityType::Person)?;
        let record = NewPerson {
            enrollment_number: next_sequence(snapshot.people()),
            name,
        };

        let person = self
            .call(BackendOp::InsertPerson, self.backend.insert_person(&record))
            .await?;
        tracing::info!(
            id = %person.id,
            number = person.enrollment_number,
            name = %person.name,
            "person created"
        );
        self.store.append_person(person.clone());
        self.converge().await;
        Ok(person)
    }

    /// Delete a challenge. Its scores go with it; people are untouched.
    pub async fn delete_challenge(&mut self, id: &ChallengeId) -> ScoreboardResult<()> {
        if self.store.snapshot().challenge(id).is_none() {
            return Err(ValidationError::UnknownChallenge { id: id.to_string() }.into());
        }
        self.call(BackendOp::DeleteChallenge, self.backend.delete_challenge(id))
            .await?;
        tracing::info!(id = %id, "challenge deleted");
        self.store.remove_challenge(id);
        self.fix_selection();
        self.converge().await;
        Ok(())
    }

    pub async fn delete_person(&mut self, id: &PersonId) -> ScoreboardResult<()> {
        if self.store.snapshot().person(id).is_none() {
            return Err(ValidationError::UnknownPerson { id: id.to_string() }.into());
        }
        self.call(BackendOp::DeletePerson, self.backend.delete_person(id))
            .await?;
        tracing::info!(id = %id, "person deleted");
        self.store.remove_person(id);
        self.converge().await;
        Ok(())
    }

    /// Record a score, clamped to `[0, max_score]` of the challenge.
    ///
    /// The local row is patched only after the backend confirms. Returns the
    /// value actually stored.
    pub async fn set_score(
        &mut self,
        person_id: &PersonId,
        challenge_id: &ChallengeId,
        value: i64,
    ) -> ScoreboardResult<i64> {
        let snapshot = self.store.snapshot();
        let challenge = snapshot
            .challenge(challenge_id)
            .ok_or_else(|| ValidationError::UnknownChallenge {
                id: challenge_id.to_string(),
            })?;
        if snapshot.person(person_id).is_none() {
            return Err(ValidationError::UnknownPerson {
                id: person_id.to_string(),
            }
            .into());
        }
        let value = clamp_score(value, challenge.max_score);

        self.call(
            BackendOp::UpsertScore,
            self.backend.upsert_score(person_id, challenge_id, value),
        )
        .await?;
        tracing::info!(person = %person_id, challenge = %challenge_id, value, "score saved");
        self.store
            .upsert_score(Score::new(person_id.clone(), challenge_id.clone(), value));
        self.converge().await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_reports_operation() {
        let err = with_timeout(Duration::from_millis(10), BackendOp::LoadAll, async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<(), BackendError>(())
        })
        .await
        .unwrap_err();

        assert_eq!(
            err,
            BackendError::Timeout {
                operation: "load all".to_string(),
                after_ms: 10,
            }
        );
    }

    #[test]
    fn test_challenge_draft_builder() {
        let draft = ChallengeDraft::new("Quiz", 100).with_description("warm-up");
        assert_eq!(draft.name, "Quiz");
        assert_eq!(draft.description.as_deref(), Some("warm-up"));
        assert_eq!(SessionOptions::default().backend_timeout, DEFAULT_BACKEND_TIMEOUT);
    }
}
