use super::client::{ensure_success, GitHubClient};
use crate::error::{DashError, Result};
use crate::model::{ContributorStats, ContributorWeek};
use chrono::DateTime;
use log::warn;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Deserialize)]
struct StatsEntry {
    author: Option<StatsAuthor>,
    total: u64,
    weeks: Vec<StatsWeek>,
}

#[derive(Deserialize)]
struct StatsAuthor {
    login: String,
}

#[derive(Deserialize)]
struct StatsWeek {
    w: i64,
    c: u64,
}

/// Weekly commit series per contributor, in the order GitHub lists them.
///
/// GitHub computes these statistics lazily and answers 202 until they are
/// ready; that case and 204 (no history) yield an empty series.
pub fn fetch_contributor_stats(client: &GitHubClient, full_name: &str) -> Result<Vec<ContributorStats>> {
    let resp = client.send(&format!("/repos/{full_name}/stats/contributors"), &[])?;
    match resp.status() {
        StatusCode::ACCEPTED => {
            warn!("{full_name}: contributor statistics are still being computed, rerun later for activity charts");
            return Ok(Vec::new());
        }
        StatusCode::NO_CONTENT => return Ok(Vec::new()),
        _ => {}
    }
    let entries: Vec<StatsEntry> = ensure_success(resp)?.json()?;
    entries.into_iter().map(into_stats).collect()
}

fn into_stats(entry: StatsEntry) -> Result<ContributorStats> {
    let weeks = entry
        .weeks
        .into_iter()
        .map(|week| {
            let start = DateTime::from_timestamp(week.w, 0)
                .ok_or_else(|| DashError::InvalidDate(format!("Invalid week timestamp: {}", week.w)))?;
            Ok(ContributorWeek {
                week: start,
                commits: week.c,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ContributorStats {
        author: entry.author.map(|a| a.login).unwrap_or_else(|| "ghost".to_string()),
        total: entry.total,
        weeks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stats_payload_in_order() {
        let raw = r#"[
            {"author": {"login": "ana"}, "total": 5, "weeks": [{"w": 1604188800, "a": 1, "d": 0, "c": 2}, {"w": 1604793600, "a": 0, "d": 0, "c": 3}]},
            {"author": null, "total": 1, "weeks": [{"w": 1604188800, "a": 0, "d": 0, "c": 1}]}
        ]"#;
        let entries: Vec<StatsEntry> = serde_json::from_str(raw).unwrap();
        let stats: Vec<_> = entries.into_iter().map(|e| into_stats(e).unwrap()).collect();
        assert_eq!(stats[0].author, "ana");
        assert_eq!(stats[0].weeks[1].commits, 3);
        assert_eq!(stats[0].weeks[0].week.timestamp(), 1604188800);
        assert_eq!(stats[1].author, "ghost");
    }
}
