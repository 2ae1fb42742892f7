use crate::aggregate::{flatten_contributor_activity, language_percentages};
use crate::cli::CommonArgs;
use crate::config::{FileConfig, Project, Secrets};
use crate::error::Result;
use crate::github::{fetch_contributor_stats, fetch_languages, fetch_profile, fetch_repository_table, GitHubClient};
use crate::model::{ProjectInsights, RepositoryTable, Snapshot};
use anyhow::{anyhow, Context};
use log::info;
use std::path::Path;

/// Everything a command needs before it talks to GitHub.
pub struct Session {
    pub client: GitHubClient,
    pub secrets: Secrets,
    pub file: FileConfig,
    pub user: Option<String>,
    pub show_progress: bool,
}

impl Session {
    pub fn open(common: &CommonArgs) -> anyhow::Result<Self> {
        let file = FileConfig::load(common.config.as_deref()).context("Failed to load config file")?;
        let secrets = Secrets::from_env();
        let client = GitHubClient::new(secrets.api_url.clone(), secrets.github_token.clone())
            .context("Failed to build GitHub client")?;
        let user = common.user.clone().or_else(|| file.user.clone());

        Ok(Self {
            client,
            secrets,
            file,
            user,
            show_progress: !common.quiet,
        })
    }

    pub fn user(&self) -> anyhow::Result<&str> {
        self.user
            .as_deref()
            .ok_or_else(|| anyhow!("No user given: pass --user or set \"user\" in the config file"))
    }

    /// Projects from the command line, or the config file when none were given.
    pub fn projects(&self, from_cli: &[String]) -> anyhow::Result<Vec<Project>> {
        if from_cli.is_empty() {
            return self.file.projects().context("Invalid project in config file");
        }
        from_cli
            .iter()
            .map(|spec| Project::parse(spec).with_context(|| format!("Invalid --project '{spec}'")))
            .collect()
    }
}

/// Language shares and contributor activity for one collaborative project.
pub fn project_insights(client: &GitHubClient, project: &Project) -> Result<ProjectInsights> {
    let languages = language_percentages(&fetch_languages(client, &project.name)?);
    let stats = fetch_contributor_stats(client, &project.name)?;
    Ok(ProjectInsights {
        full_name: project.name.clone(),
        window: project.window,
        languages,
        activity: flatten_contributor_activity(&stats),
    })
}

pub fn collect_snapshot(session: &Session, projects: &[Project]) -> anyhow::Result<Snapshot> {
    let user = session.user()?;
    let client = &session.client;

    let profile = fetch_profile(client, user).with_context(|| format!("Failed to fetch profile of '{user}'"))?;
    let repositories = fetch_repository_table(client, user, session.show_progress)
        .with_context(|| format!("Failed to fetch repositories of '{user}'"))?;

    let mut insights = Vec::with_capacity(projects.len());
    for project in projects {
        info!("collecting insights for {}", project.name);
        insights.push(
            project_insights(client, project)
                .with_context(|| format!("Failed to fetch insights for '{}'", project.name))?,
        );
    }

    Ok(Snapshot::new(profile, repositories, insights))
}

/// Reads a previously exported snapshot, or fetches a fresh one.
pub fn load_or_collect(session: &Session, input: Option<&Path>, projects: &[Project]) -> anyhow::Result<Snapshot> {
    match input {
        Some(path) => {
            Snapshot::load(path).with_context(|| format!("Failed to read snapshot {}", path.display()))
        }
        None => collect_snapshot(session, projects),
    }
}

/// Repository table for `session`'s user, or the one stored in `input`.
pub fn load_table(session: &Session, input: Option<&Path>) -> anyhow::Result<(String, RepositoryTable)> {
    if let Some(path) = input {
        let snapshot =
            Snapshot::load(path).with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        return Ok((snapshot.profile.login, snapshot.repositories));
    }
    let user = session.user()?;
    let table = fetch_repository_table(&session.client, user, session.show_progress)
        .with_context(|| format!("Failed to fetch repositories of '{user}'"))?;
    Ok((user.to_string(), table))
}
