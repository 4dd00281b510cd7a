//! Ranking engine: per-challenge ranking, overall ranking and overall table.
//!
//! All three are recomputed from scratch from the flat collections and a
//! [`ScoreIndex`]. They share one ordering: points descending, then name
//! ascending (see [`compare_names`]), then enrollment number, then id.

use crate::names::compare_names;
use crate::{Challenge, ChallengeId, Person, PersonId, ScoreIndex};
use serde::Serialize;
use std::cmp::Ordering;

/// One person's standing on a single challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub person_id: PersonId,
    pub person_name: String,
    pub score: i64,
}

/// Ordered standings for one challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeRanking {
    pub challenge_id: ChallengeId,
    pub challenge_name: String,
    pub entries: Vec<RankingEntry>,
}

/// One person's total across every challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallRankingEntry {
    pub person_id: PersonId,
    pub person_name: String,
    pub total: i64,
    /// Sum of every challenge's max score; identical for all people.
    pub max: i64,
}

/// A single cell of the overall table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeCell {
    pub challenge_id: ChallengeId,
    pub score: i64,
    pub max_score: i64,
}

/// A person's full row in the overall table, cells in challenge order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallTableRow {
    pub person_id: PersonId,
    pub person_name: String,
    pub cells: Vec<ChallengeCell>,
    pub total: i64,
}

/// Shared ordering for every ranked view.
fn rank_order(a_points: i64, a: &Person, b_points: i64, b: &Person) -> Ordering {
    b_points
        .cmp(&a_points)
        .then_with(|| compare_names(&a.name, &b.name))
        .then_with(|| a.enrollment_number.cmp(&b.enrollment_number))
        .then_with(|| a.id.cmp(&b.id))
}

fn sort_ranked<T>(rows: &mut [(&Person, i64, T)]) {
    rows.sort_by(|(a, a_points, _), (b, b_points, _)| rank_order(*a_points, a, *b_points, b));
}

/// Max score as it contributes to totals; negative values count as 0.
fn effective_max(challenge: &Challenge) -> i64 {
    challenge.max_score.max(0)
}

/// Sum that pins at `i64::MAX` instead of overflowing.
fn saturating_total(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}

/// Standings per challenge, in the order the challenges are given.
pub fn per_challenge_ranking(
    challenges: &[Challenge],
    people: &[Person],
    index: &ScoreIndex,
) -> Vec<ChallengeRanking> {
    challenges
        .iter()
        .map(|challenge| {
            let mut rows: Vec<(&Person, i64, ())> = people
                .iter()
                .map(|p| (p, index.lookup(&p.id, &challenge.id), ()))
                .collect();
            sort_ranked(&mut rows);

            ChallengeRanking {
                challenge_id: challenge.id.clone(),
                challenge_name: challenge.name.clone(),
                entries: rows
                    .into_iter()
                    .map(|(p, score, ())| RankingEntry {
                        person_id: p.id.clone(),
                        person_name: p.name.clone(),
                        score,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Totals across all challenges, best first.
pub fn overall_ranking(
    challenges: &[Challenge],
    people: &[Person],
    index: &ScoreIndex,
) -> Vec<OverallRankingEntry> {
    let max = saturating_total(challenges.iter().map(effective_max));

    let mut rows: Vec<(&Person, i64, ())> = people
        .iter()
        .map(|p| {
            let total = saturating_total(challenges.iter().map(|c| index.lookup(&p.id, &c.id)));
            (p, total, ())
        })
        .collect();
    sort_ranked(&mut rows);

    rows.into_iter()
        .map(|(p, total, ())| OverallRankingEntry {
            person_id: p.id.clone(),
            person_name: p.name.clone(),
            total,
            max,
        })
        .collect()
}

/// Full score grid, rows ordered exactly like [`overall_ranking`].
pub fn overall_table(
    challenges: &[Challenge],
    people: &[Person],
    index: &ScoreIndex,
) -> Vec<OverallTableRow> {
    let mut rows: Vec<(&Person, i64, Vec<ChallengeCell>)> = people
        .iter()
        .map(|p| {
            let cells: Vec<ChallengeCell> = challenges
                .iter()
                .map(|c| ChallengeCell {
                    challenge_id: c.id.clone(),
                    score: index.lookup(&p.id, &c.id),
                    max_score: effective_max(c),
                })
                .collect();
            let total = saturating_total(cells.iter().map(|cell| cell.score));
            (p, total, cells)
        })
        .collect();
    sort_ranked(&mut rows);

    rows.into_iter()
        .map(|(p, total, cells)| OverallTableRow {
            person_id: p.id.clone(),
            person_name: p.name.clone(),
            cells,
            total,
        })
        .collect()
}
