//! The four read-only views shown to the presentation layer.

use crate::ranking::{
    overall_ranking, overall_table, per_challenge_ranking, ChallengeRanking, OverallRankingEntry,
    OverallTableRow,
};
use crate::{Challenge, ChallengeId, Person, Score, ScoreIndex};
use serde::Serialize;

/// All derived state, computed in one pass from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedViews {
    pub score_index: ScoreIndex,
    pub per_challenge: Vec<ChallengeRanking>,
    pub overall_ranking: Vec<OverallRankingEntry>,
    pub overall_table: Vec<OverallTableRow>,
}

impl DerivedViews {
    pub fn compute(challenges: &[Challenge], people: &[Person], scores: &[Score]) -> Self {
        let score_index = ScoreIndex::build(people, scores);
        Self {
            per_challenge: per_challenge_ranking(challenges, people, &score_index),
            overall_ranking: overall_ranking(challenges, people, &score_index),
            overall_table: overall_table(challenges, people, &score_index),
            score_index,
        }
    }

    /// Standings for one challenge.
    pub fn ranking_for(&self, challenge_id: &ChallengeId) -> Option<&ChallengeRanking> {
        self.per_challenge
            .iter()
            .find(|r| &r.challenge_id == challenge_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PersonId;

    #[test]
    fn test_compute_empty() {
        let views = DerivedViews::compute(&[], &[], &[]);
        assert_eq!(views, DerivedViews::default());
    }

    #[test]
    fn test_ranking_for() {
        let challenges = vec![Challenge {
            id: "c1".into(),
            display_number: 1,
            name: "Quiz".to_string(),
            description: Some("warm-up".to_string()),
            max_score: 10,
        }];
        let people = vec![Person {
            id: PersonId::from("p1"),
            enrollment_number: 1,
            name: "Ana".to_string(),
        }];
        let views = DerivedViews::compute(&challenges, &people, &[]);

        let ranking = views.ranking_for(&"c1".into()).unwrap();
        assert_eq!(ranking.challenge_name, "Quiz");
        assert_eq!(ranking.entries.len(), 1);
        assert!(views.ranking_for(&"c9".into()).is_none());
    }
}
