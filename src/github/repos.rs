use super::client::GitHubClient;
use super::license::resolve_license;
use super::user::authenticated_login;
use crate::error::Result;
use crate::model::{LanguageBytes, RepositoryRecord, RepositoryTable, Visibility};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RepoListing {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub private: bool,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
}

#[derive(Deserialize)]
struct TopicsResponse {
    names: Vec<String>,
}

/// Every repository owned by `username` that the client can see.
///
/// When the token belongs to `username` the private repositories are
/// included; otherwise only the public listing is available.
pub fn list_repositories(client: &GitHubClient, username: &str) -> Result<Vec<RepoListing>> {
    let is_self = client.is_authenticated() && authenticated_login(client)?.eq_ignore_ascii_case(username);
    if is_self {
        client.get_all("/user/repos", &[("affiliation", "owner")])
    } else {
        client.get_all(&format!("/users/{username}/repos"), &[("type", "owner")])
    }
}

pub fn fetch_languages(client: &GitHubClient, full_name: &str) -> Result<LanguageBytes> {
    client.get_json(&format!("/repos/{full_name}/languages"), &[])
}

fn fetch_topics(client: &GitHubClient, full_name: &str) -> Result<Vec<String>> {
    let resp: TopicsResponse = client.get_json(&format!("/repos/{full_name}/topics"), &[])?;
    let mut topics = Vec::with_capacity(resp.names.len());
    for name in resp.names {
        if !topics.contains(&name) {
            topics.push(name);
        }
    }
    Ok(topics)
}

/// Builds the full record for one listed repository.
pub fn fetch_repository(client: &GitHubClient, listing: &RepoListing) -> Result<RepositoryRecord> {
    let full = listing.full_name.as_str();

    // an empty repository has no history and answers 409
    let commit_count = client.count_or_zero(&format!("/repos/{full}/commits"), &[], &[StatusCode::CONFLICT])?;
    let collaborator_count = client.count(&format!("/repos/{full}/collaborators"), &[])?;

    Ok(RepositoryRecord {
        name: listing.name.clone(),
        languages: fetch_languages(client, full)?,
        topics: fetch_topics(client, full)?,
        description: listing.description.clone(),
        commit_count,
        collaborator_count,
        fork_count: listing.forks_count,
        star_count: listing.stargazers_count,
        open_issue_count: listing.open_issues_count,
        visibility: Visibility::from_private_flag(listing.private),
        license: resolve_license(client, full)?,
    })
}

pub fn fetch_repository_table(client: &GitHubClient, username: &str, show_progress: bool) -> Result<RepositoryTable> {
    let listings = list_repositories(client, username)?;
    info!("{} repositories listed for {username}", listings.len());

    let pb = if show_progress {
        let pb = ProgressBar::new(listings.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut records = Vec::with_capacity(listings.len());
    for listing in &listings {
        pb.set_message(listing.name.clone());
        records.push(fetch_repository(client, listing)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    RepositoryTable::new(records)
}
