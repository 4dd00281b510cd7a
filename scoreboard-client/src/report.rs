//! Plain-text rendering of the derived views.

use scoreboard_core::{Challenge, DerivedViews};
use std::fmt::{self, Write};

/// Render the overall ranking, the overall table and every per-challenge
/// ranking. Challenges appear in the order given.
pub fn render_report(views: &DerivedViews, challenges: &[Challenge]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    if write_report(&mut out, views, challenges).is_err() {
        out.clear();
    }
    out
}

fn write_report(out: &mut String, views: &DerivedViews, challenges: &[Challenge]) -> fmt::Result {
    writeln!(out, "Overall ranking")?;
    if views.overall_ranking.is_empty() {
        writeln!(out, "  (no people)")?;
    }
    for (position, entry) in views.overall_ranking.iter().enumerate() {
        writeln!(
            out,
            "  {:>3}. {:<24} {:>6} / {}",
            position + 1,
            entry.person_name,
            entry.total,
            entry.max
        )?;
    }

    if !views.overall_table.is_empty() && !challenges.is_empty() {
        write_table(out, views, challenges)?;
    }

    for ranking in &views.per_challenge {
        writeln!(out, "\n{}", ranking.challenge_name)?;
        if ranking.entries.is_empty() {
            writeln!(out, "  (no people)")?;
        }
        for (position, entry) in ranking.entries.iter().enumerate() {
            writeln!(
                out,
                "  {:>3}. {:<24} {:>6}",
                position + 1,
                entry.person_name,
                entry.score
            )?;
        }
    }
    Ok(())
}

fn write_table(out: &mut String, views: &DerivedViews, challenges: &[Challenge]) -> fmt::Result {
    writeln!(out, "\nTable")?;
    write!(out, "  {:<24}", "")?;
    for challenge in challenges {
        write!(out, " {:>8}", format!("#{}", challenge.display_number))?;
    }
    writeln!(out, " {:>8}", "total")?;
    for row in &views.overall_table {
        write!(out, "  {:<24}", row.person_name)?;
        for cell in &row.cells {
            write!(out, " {:>8}", cell.score)?;
        }
        writeln!(out, " {:>8}", row.total)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_core::{Person, Score};

    fn challenge(id: &str, number: i64, name: &str, max_score: i64) -> Challenge {
        Challenge {
            id: id.into(),
            display_number: number,
            name: name.to_string(),
            description: None,
            max_score,
        }
    }

    fn person(id: &str, number: i64, name: &str) -> Person {
        Person {
            id: id.into(),
            enrollment_number: number,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_report_lists_rankings_in_order() {
        let challenges = vec![challenge("c1", 1, "Quiz", 100), challenge("c2", 2, "Relay", 50)];
        let people = vec![person("p1", 1, "Ana"), person("p2", 2, "Bruno")];
        let scores = vec![
            Score::new("p1".into(), "c1".into(), 80),
            Score::new("p2".into(), "c1".into(), 80),
            Score::new("p2".into(), "c2".into(), 50),
        ];
        let views = DerivedViews::compute(&challenges, &people, &scores);

        let report = render_report(&views, &challenges);

        let bruno = report.find("1. Bruno").unwrap();
        let ana = report.find("2. Ana").unwrap();
        assert!(bruno < ana);
        assert!(report.contains("130 / 150"));
        assert!(report.contains("\nQuiz\n"));
        assert!(report.contains("\nRelay\n"));
        assert!(report.contains("#2"));
    }

    #[test]
    fn test_report_for_empty_views() {
        let views = DerivedViews::compute(&[], &[], &[]);
        let report = render_report(&views, &[]);
        assert_eq!(report, "Overall ranking\n  (no people)\n");
    }
}
