use crate::cli::CommonArgs;
use crate::fetch::{collect_snapshot, Session};
use anyhow::Context;
use console::style;
use std::path::PathBuf;

/// Fetches once and writes the snapshot as JSON, for later offline rendering
/// with `--input`.
pub fn exec(common: CommonArgs, output: Option<PathBuf>, projects: Vec<String>) -> anyhow::Result<()> {
    let session = Session::open(&common)?;
    let projects = session.projects(&projects)?;
    let snapshot = collect_snapshot(&session, &projects)?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            if !common.quiet {
                eprintln!(
                    "{} {} repositories and {} projects to {}",
                    style("Exported").green(),
                    snapshot.repositories.len(),
                    snapshot.projects.len(),
                    style(path.display()).bold()
                );
            }
        }
        None => println!("{json}"),
    }
    Ok(())
}
