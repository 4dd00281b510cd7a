//! Entity store: the session's local mirror of the backend.
//!
//! Every change produces a new immutable [`StoreSnapshot`] with a fresh
//! generation. Derived views are computed lazily once per generation and
//! shared by every reader of that snapshot.

use crate::LoadedEntities;
use chrono::Utc;
use once_cell::sync::OnceCell;
use scoreboard_core::{
    Challenge, ChallengeId, DerivedViews, Person, PersonId, Score, Timestamp,
};
use std::sync::Arc;

/// Immutable view of the three collections at one point in time.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    generation: u64,
    loaded_at: Option<Timestamp>,
    challenges: Vec<Challenge>,
    people: Vec<Person>,
    scores: Vec<Score>,
    views: OnceCell<Arc<DerivedViews>>,
}

impl StoreSnapshot {
    fn new(
        generation: u64,
        loaded_at: Option<Timestamp>,
        challenges: Vec<Challenge>,
        people: Vec<Person>,
        scores: Vec<Score>,
    ) -> Self {
        Self {
            generation,
            loaded_at,
            challenges,
            people,
            scores,
            views: OnceCell::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the last full reload completed, if any.
    pub fn loaded_at(&self) -> Option<Timestamp> {
        self.loaded_at
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    pub fn challenge(&self, id: &ChallengeId) -> Option<&Challenge> {
        self.challenges.iter().find(|c| &c.id == id)
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.people.iter().find(|p| &p.id == id)
    }

    /// Derived views for this snapshot, computed on first access.
    pub fn views(&self) -> Arc<DerivedViews> {
        self.views
            .get_or_init(|| {
                Arc::new(DerivedViews::compute(
                    &self.challenges,
                    &self.people,
                    &self.scores,
                ))
            })
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty() && self.people.is_empty() && self.scores.is_empty()
    }
}

/// Owner of the current snapshot. Replaced wholesale on reload or patched
/// one element at a time after a confirmed mutation.
#[derive(Debug, Default)]
pub struct EntityStore {
    current: Arc<StoreSnapshot>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot. Cheap to clone and safe to hold across changes.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn views(&self) -> Arc<DerivedViews> {
        self.current.views()
    }

    pub fn generation(&self) -> u64 {
        self.current.generation
    }

    /// Replace everything with a fresh backend snapshot.
    pub fn replace(&mut self, loaded: LoadedEntities) {
        self.current = Arc::new(StoreSnapshot::new(
            self.current.generation + 1,
            Some(Utc::now()),
            loaded.challenges,
            loaded.people,
            loaded.scores,
        ));
    }

    /// Drop every row (sign-out).
    pub fn clear(&mut self) {
        self.current = Arc::new(StoreSnapshot::new(
            self.current.generation + 1,
            None,
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ));
    }

    fn patch(
        &mut self,
        edit: impl FnOnce(&mut Vec<Challenge>, &mut Vec<Person>, &mut Vec<Score>),
    ) {
        let mut challenges = self.current.challenges.clone();
        let mut people = self.current.people.clone();
        let mut scores = self.current.scores.clone();
        edit(&mut challenges, &mut people, &mut scores);
        self.current = Arc::new(StoreSnapshot::new(
            self.current.generation + 1,
            self.current.loaded_at,
            challenges,
            people,
            scores,
        ));
    }

    /// Append one backend-confirmed challenge.
    pub fn append_challenge(&mut self, challenge: Challenge) {
        self.patch(|challenges, _, _| challenges.push(challenge));
    }

    /// Append one backend-confirmed person.
    pub fn append_person(&mut self, person: Person) {
        self.patch(|_, people, _| people.push(person));
    }

    /// Replace the score for its composite key, or append it.
    pub fn upsert_score(&mut self, score: Score) {
        self.patch(|_, _, scores| {
            match scores
                .iter()
                .position(|s| s.is_for(&score.person_id, &score.challenge_id))
            {
                Some(i) => scores[i] = score,
                None => scores.push(score),
            }
        });
    }

    /// Remove a challenge and its scores.
    pub fn remove_challenge(&mut self, id: &ChallengeId) {
        self.patch(|challenges, _, scores| {
            challenges.retain(|c| &c.id != id);
            scores.retain(|s| &s.challenge_id != id);
        });
    }

    /// Remove a person. Their score rows stay until the next reload and are
    /// ignored by the score index meanwhile.
    pub fn remove_person(&mut self, id: &PersonId) {
        self.patch(|_, people, _| people.retain(|p| &p.id != id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> LoadedEntities {
        LoadedEntities {
            challenges: vec![Challenge {
                id: "c1".into(),
                display_number: 1,
                name: "Quiz".to_string(),
                description: None,
                max_score: 100,
            }],
            people: vec![Person {
                id: "p1".into(),
                enrollment_number: 1,
                name: "Ana".to_string(),
            }],
            scores: vec![Score::new("p1".into(), "c1".into(), 40)],
        }
    }

    #[test]
    fn test_views_are_memoized_per_generation() {
        let mut store = EntityStore::new();
        store.replace(loaded());

        let first = store.views();
        let second = store.views();
        assert!(Arc::ptr_eq(&first, &second));

        store.upsert_score(Score::new("p1".into(), "c1".into(), 90));
        let third = store.views();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.overall_ranking[0].total, 90);
    }

    #[test]
    fn test_held_snapshot_is_unaffected_by_patches() {
        let mut store = EntityStore::new();
        store.replace(loaded());
        let before = store.snapshot();

        store.remove_challenge(&"c1".into());

        assert_eq!(before.challenges().len(), 1);
        assert_eq!(before.scores().len(), 1);
        let after = store.snapshot();
        assert!(after.challenges().is_empty());
        assert!(after.scores().is_empty());
        assert_eq!(after.people().len(), 1);
        assert!(after.generation() > before.generation());
    }

    #[test]
    fn test_upsert_score_replaces_in_place() {
        let mut store = EntityStore::new();
        store.replace(loaded());
        store.upsert_score(Score::new("p1".into(), "c1".into(), 55));
        store.upsert_score(Score::new("p1".into(), "c2".into(), 5));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.scores().len(), 2);
        assert_eq!(snapshot.scores()[0].value, 55);
    }

    #[test]
    fn test_remove_person_orphans_are_ignored() {
        let mut store = EntityStore::new();
        store.replace(loaded());
        store.remove_person(&"p1".into());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.scores().len(), 1);
        let views = snapshot.views();
        assert!(views.score_index.is_empty());
        assert!(views.overall_ranking.is_empty());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut store = EntityStore::new();
        store.replace(loaded());
        assert!(store.snapshot().loaded_at().is_some());

        store.clear();
        let snapshot = store.snapshot();
        assert!(snapshot.is_empty());
        assert!(snapshot.loaded_at().is_none());
        assert!(store.views().per_challenge.is_empty());
    }
}
