use super::compose::{dashboard, language_plots, repository_table, DashboardInput};
use super::sink::{open_in_viewer, save, ReportHost, UploadMeta};
use crate::cli::CommonArgs;
use crate::config::{DEFAULT_HIGHLIGHT_LANGUAGE, DEFAULT_OUTPUT};
use crate::fetch::{load_or_collect, Session};
use anyhow::{anyhow, Context};
use console::style;
use std::path::PathBuf;
use std::time::Instant;

/// A single section rendered on its own instead of the full dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportPart {
    /// Most-starred repository table
    Table,
    /// Language bar and donut charts
    Languages,
}

pub struct ReportOptions {
    pub output: Option<PathBuf>,
    pub open: bool,
    pub upload: bool,
    pub input: Option<PathBuf>,
    pub projects: Vec<String>,
    pub highlight: Option<String>,
    pub only: Option<ReportPart>,
}

pub fn exec(common: CommonArgs, opts: ReportOptions) -> anyhow::Result<()> {
    let started = Instant::now();
    let session = Session::open(&common)?;
    let projects = session.projects(&opts.projects)?;

    let snapshot = load_or_collect(&session, opts.input.as_deref(), &projects)?;

    let highlight = opts
        .highlight
        .or_else(|| session.file.highlight_language.clone())
        .unwrap_or_else(|| DEFAULT_HIGHLIGHT_LANGUAGE.to_string());

    let document = match opts.only {
        Some(ReportPart::Table) => repository_table(&snapshot.repositories),
        Some(ReportPart::Languages) => language_plots(&snapshot.repositories),
        None => dashboard(&DashboardInput {
            profile: &snapshot.profile,
            repositories: &snapshot.repositories,
            projects: &snapshot.projects,
            highlight_language: &highlight,
        })
        .context("Failed to compose report")?,
    };

    let output = opts
        .output
        .or_else(|| session.file.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    save(&document, &output).with_context(|| format!("Failed to write {}", output.display()))?;

    if !common.quiet {
        let elapsed = humantime::format_duration(std::time::Duration::from_secs(started.elapsed().as_secs()));
        eprintln!(
            "{} {} ({} repositories, {} projects) in {}",
            style("Report written to").green(),
            style(output.display()).bold(),
            snapshot.repositories.len(),
            snapshot.projects.len(),
            elapsed
        );
    }

    if opts.open {
        open_in_viewer(&output).context("Failed to open report viewer")?;
    }

    if opts.upload {
        let upload = session
            .file
            .upload
            .as_ref()
            .ok_or_else(|| anyhow!("--upload needs an \"upload\" section in the config file"))?;
        let host = ReportHost::login(&upload.endpoint, session.secrets.report_token.clone())
            .context("Failed to set up report host client")?;
        let url = host
            .upload(&document, &UploadMeta::from(upload))
            .context("Failed to upload report")?;
        if !common.quiet {
            eprintln!(
                "{} {}",
                style("Uploaded:").green(),
                url.unwrap_or_else(|| upload.endpoint.clone())
            );
        }
    }

    Ok(())
}
