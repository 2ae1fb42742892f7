use crate::cli::CommonArgs;
use crate::fetch::{load_table, Session};
use crate::model::{RepositoriesOutput, RepositoryField, RepositoryRecord, RepositoryTable, SCHEMA_VERSION};
use chrono::Utc;
use console::style;
use std::path::PathBuf;

pub fn exec(
    common: CommonArgs,
    json: bool,
    ndjson: bool,
    input: Option<PathBuf>,
    sort: RepositoryField,
    ascending: bool,
) -> anyhow::Result<()> {
    let session = Session::open(&common)?;
    let (user, table) = load_table(&session, input.as_deref())?;
    let sorted = table.sorted_by(sort, !ascending);

    if json {
        output_json(&sorted, &user)?;
    } else if ndjson {
        output_ndjson(&sorted)?;
    } else {
        output_table(&sorted, &user)?;
    }

    Ok(())
}

fn output_json(table: &RepositoryTable, user: &str) -> anyhow::Result<()> {
    let output = RepositoriesOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        user: user.to_string(),
        total_stars: table.total_stars(),
        entries: table.records().to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(table: &RepositoryTable) -> anyhow::Result<()> {
    for record in table {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}

fn output_table(table: &RepositoryTable, user: &str) -> anyhow::Result<()> {
    if table.is_empty() {
        println!("No repositories found for {user}");
        return Ok(());
    }

    println!(
        "{:<36} {:>6} {:>6} {:>8} {:>7} {:<8} {:<20}",
        style("Repository").bold(),
        style("Stars").bold(),
        style("Forks").bold(),
        style("Commits").bold(),
        style("Issues").bold(),
        style("Access").bold(),
        style("License").bold()
    );
    println!("{}", "─".repeat(98));
    for r in table {
        println!(
            "{:<36} {:>6} {:>6} {:>8} {:>7} {:<8} {:<20}",
            truncate(&r.name, 36),
            style(r.star_count).yellow(),
            r.fork_count,
            r.commit_count,
            r.open_issue_count,
            r.visibility,
            r.license.as_deref().unwrap_or("-")
        );
        if let Some(lang) = primary_language(r) {
            println!("  {}", style(lang).dim());
        }
    }
    println!(
        "\n{} repositories, {} stars received",
        style(table.len()).cyan(),
        style(table.total_stars()).yellow()
    );
    Ok(())
}

fn primary_language(record: &RepositoryRecord) -> Option<&str> {
    record
        .languages
        .iter()
        .fold(None, |best: Option<(&str, u64)>, (l, b)| match best {
            Some((_, top)) if top >= b => best,
            _ => Some((l, b)),
        })
        .map(|(l, _)| l)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
