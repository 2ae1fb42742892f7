use crate::aggregate::{contributor_totals, flatten_contributor_activity};
use crate::cli::CommonArgs;
use crate::config::Project;
use crate::fetch::Session;
use crate::github::fetch_contributor_stats;
use crate::model::{ContributorActivity, SCHEMA_VERSION};
use anyhow::Context;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct ContributorsOutput<'a> {
    version: u32,
    generated_at: DateTime<Utc>,
    repository: &'a str,
    entries: &'a [ContributorActivity],
}

pub fn exec(common: CommonArgs, repo: &str, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let project = Project::parse(repo).with_context(|| format!("Invalid repository '{repo}'"))?;
    let session = Session::open(&common)?;

    let stats = fetch_contributor_stats(&session.client, &project.name)
        .with_context(|| format!("Failed to fetch contributor statistics for '{}'", project.name))?;
    let mut activity = flatten_contributor_activity(&stats);
    if let Some(window) = &project.window {
        activity.retain(|row| window.contains(&row.week));
    }

    if json {
        let output = ContributorsOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            repository: &project.name,
            entries: &activity,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if ndjson {
        for row in &activity {
            println!("{}", serde_json::to_string(row)?);
        }
    } else {
        output_summary(&project.name, &activity);
    }

    Ok(())
}

fn output_summary(repo: &str, activity: &[ContributorActivity]) {
    println!("{}", style(format!("Contributors of {repo}")).bold());
    println!("{}", "─".repeat(50));

    if activity.is_empty() {
        println!("No contributor activity available");
        return;
    }

    for (author, total) in contributor_totals(activity) {
        let rows: Vec<_> = activity.iter().filter(|r| r.author == author).collect();
        let active_weeks = rows.iter().filter(|r| r.weekly_commits > 0).count();
        let busiest = rows.iter().max_by_key(|r| r.weekly_commits);
        print!(
            "{:<24} {:>6} commits over {:>4} active weeks",
            style(&author).cyan(),
            total,
            active_weeks
        );
        match busiest {
            Some(b) if b.weekly_commits > 0 => println!(
                ", busiest week {} ({} commits)",
                style(b.week.format("%Y-%m-%d")).dim(),
                b.weekly_commits
            ),
            _ => println!(),
        }
    }
}
