use crate::model::{ContributorActivity, ContributorStats};
use std::collections::HashSet;

/// One row per (contributor, week), contributor order first, then week order.
///
/// Rows are neither re-sorted nor merged: a repeated (author, week) pair from
/// upstream shows up twice.
pub fn flatten_contributor_activity(stats: &[ContributorStats]) -> Vec<ContributorActivity> {
    stats
        .iter()
        .flat_map(|contributor| {
            contributor.weeks.iter().map(move |week| ContributorActivity {
                author: contributor.author.clone(),
                total_commits: contributor.total,
                week: week.week,
                weekly_commits: week.commits,
            })
        })
        .collect()
}

/// First `(author, total)` seen per author.
pub fn contributor_totals(activity: &[ContributorActivity]) -> Vec<(String, u64)> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut totals = Vec::new();
    for row in activity {
        if seen.insert(&row.author) {
            totals.push((row.author.clone(), row.total_commits));
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContributorWeek;
    use chrono::{TimeZone, Utc};

    #[test]
    fn duplicate_weeks_are_preserved() {
        let w = Utc.with_ymd_and_hms(2021, 3, 7, 0, 0, 0).unwrap();
        let stats = vec![ContributorStats {
            author: "dup".into(),
            total: 4,
            weeks: vec![
                ContributorWeek { week: w, commits: 2 },
                ContributorWeek { week: w, commits: 2 },
            ],
        }];
        let rows = flatten_contributor_activity(&stats);
        assert_eq!(rows.len(), 2);
        assert_eq!(contributor_totals(&rows), vec![("dup".to_string(), 4)]);
    }

    #[test]
    fn contributor_without_weeks_produces_no_rows() {
        let stats = vec![ContributorStats { author: "idle".into(), total: 0, weeks: vec![] }];
        assert!(flatten_contributor_activity(&stats).is_empty());
    }
}
