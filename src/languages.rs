use crate::aggregate::{language_percentages, language_rank, language_totals, sort_descending};
use crate::cli::CommonArgs;
use crate::fetch::{load_table, Session};
use crate::model::{LanguageBytes, LanguageEntry, LanguageRank, LanguageShare, LanguagesOutput, SCHEMA_VERSION};
use crate::report::compose::format_percent;
use anyhow::Context;
use chrono::Utc;
use console::style;
use std::path::PathBuf;

pub fn exec(
    common: CommonArgs,
    json: bool,
    ndjson: bool,
    rank: Option<String>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let session = Session::open(&common)?;
    let (user, table) = load_table(&session, input.as_deref())?;

    let totals = language_totals(table.iter().map(|r| &r.languages));
    let sorted = sort_descending(language_percentages(&totals));
    let entries = language_entries(&sorted, &totals);

    let rank = match rank {
        Some(language) => Some(
            language_rank(&sorted, &totals, &language)
                .with_context(|| format!("Cannot rank '{language}'"))?,
        ),
        None => None,
    };

    if json {
        output_json(entries, rank, &user, totals.total())?;
    } else if ndjson {
        output_ndjson(&entries)?;
    } else {
        output_table(&entries, rank.as_ref(), &user)?;
    }

    Ok(())
}

fn language_entries(sorted: &[LanguageShare], totals: &LanguageBytes) -> Vec<LanguageEntry> {
    sorted
        .iter()
        .map(|s| LanguageEntry {
            language: s.language.clone(),
            bytes: totals.get(&s.language).unwrap_or(0),
            fraction: s.fraction,
        })
        .collect()
}

fn output_json(entries: Vec<LanguageEntry>, rank: Option<LanguageRank>, user: &str, total: u64) -> anyhow::Result<()> {
    let output = LanguagesOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        user: user.to_string(),
        total_bytes: total,
        rank,
        entries,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(entries: &[LanguageEntry]) -> anyhow::Result<()> {
    for entry in entries {
        println!("{}", serde_json::to_string(entry)?);
    }
    Ok(())
}

fn output_table(entries: &[LanguageEntry], rank: Option<&LanguageRank>, user: &str) -> anyhow::Result<()> {
    if entries.is_empty() {
        println!("No language data for {user}");
        return Ok(());
    }

    println!("{}", style(format!("Languages used by {user}")).bold());
    println!("{}", "─".repeat(60));

    for (i, e) in entries.iter().enumerate() {
        let bar_len = (e.fraction * 30.0).round() as usize;
        println!(
            "{:>3}. {:<20} {:>12} {:>7} {}",
            i + 1,
            e.language,
            e.bytes,
            format_percent(e.fraction),
            style("█".repeat(bar_len)).green()
        );
    }

    if let Some(r) = rank {
        let next = r
            .next
            .as_deref()
            .map(|n| format!(", followed by {n}"))
            .unwrap_or_default();
        println!(
            "\n{} is at position {} ({} bytes, {}){}",
            style(&r.language).cyan(),
            r.position + 1,
            r.bytes,
            format_percent(r.fraction),
            next
        );
    }

    Ok(())
}
