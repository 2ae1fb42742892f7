use crate::model::RepositoryField;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghdash")]
#[command(about = "GitHub account dashboard: repositories, languages and contributor activity")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "GitHub login to report on (overrides the config file)")]
    pub user: Option<String>,

    #[arg(long, help = "Path to JSON config file [default: ./ghdash.json if present]")]
    pub config: Option<PathBuf>,

    #[arg(long, short, help = "Hide progress output", default_value_t = false)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the full HTML dashboard
    Report {
        #[arg(long, short, help = "Output HTML file [default: report.html]")]
        output: Option<PathBuf>,

        #[arg(long, help = "Open the report once written")]
        open: bool,

        #[arg(long, help = "Upload the report to the configured host")]
        upload: bool,

        #[arg(long, help = "Render from an exported snapshot instead of fetching")]
        input: Option<PathBuf>,

        #[arg(long = "project", help = "Collaborative project OWNER/REPO[@START..END], repeatable")]
        projects: Vec<String>,

        #[arg(long, help = "Language whose rank is called out [default: Python]")]
        highlight: Option<String>,

        #[arg(long, value_enum, help = "Render only this section")]
        only: Option<crate::report::exec::ReportPart>,
    },
    /// List repositories, most starred first
    Repos {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, value_enum, default_value = "stars", help = "Sort key")]
        sort: RepositoryField,

        #[arg(long, help = "Sort ascending instead of descending")]
        ascending: bool,

        #[arg(long, help = "Read repositories from an exported snapshot")]
        input: Option<PathBuf>,
    },
    /// Language totals and shares across all repositories
    Languages {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, help = "Report the rank of this language")]
        rank: Option<String>,

        #[arg(long, help = "Read repositories from an exported snapshot")]
        input: Option<PathBuf>,
    },
    /// Weekly commit activity per contributor of one repository
    Contributors {
        #[arg(help = "Repository as OWNER/REPO")]
        repo: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Fetch everything once and write it as a JSON snapshot
    Export {
        #[arg(long, short, help = "Snapshot file [default: stdout]")]
        output: Option<PathBuf>,

        #[arg(long = "project", help = "Collaborative project OWNER/REPO[@START..END], repeatable")]
        projects: Vec<String>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report { output, open, upload, input, projects, highlight, only } => crate::report::exec(
                self.common,
                crate::report::exec::ReportOptions { output, open, upload, input, projects, highlight, only },
            ),
            Commands::Repos { json, ndjson, sort, ascending, input } => {
                crate::repos::exec(self.common, json, ndjson, input, sort, ascending)
            }
            Commands::Languages { json, ndjson, rank, input } => {
                crate::languages::exec(self.common, json, ndjson, rank, input)
            }
            Commands::Contributors { repo, json, ndjson } => {
                crate::contributors::exec(self.common, &repo, json, ndjson)
            }
            Commands::Export { output, projects } => crate::export::exec(self.common, output, projects),
        }
    }
}
