use super::client::GitHubClient;
use crate::error::Result;
use crate::model::UserProfile;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    name: Option<String>,
    bio: Option<String>,
    company: Option<String>,
    blog: Option<String>,
    avatar_url: Option<String>,
    #[serde(default)]
    public_repos: u64,
    // only present when the token belongs to this user
    total_private_repos: Option<u64>,
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
}

/// Login of the token's owner.
pub fn authenticated_login(client: &GitHubClient) -> Result<String> {
    let user: GitHubUser = client.get_json("/user", &[])?;
    Ok(user.login)
}

pub fn fetch_profile(client: &GitHubClient, username: &str) -> Result<UserProfile> {
    let user: GitHubUser = client.get_json(&format!("/users/{username}"), &[])?;
    let organizations = client.count(&format!("/users/{username}/orgs"), &[])?;

    Ok(UserProfile {
        login: user.login,
        name: non_empty(user.name),
        bio: non_empty(user.bio),
        company: non_empty(user.company),
        blog: non_empty(user.blog),
        avatar_url: non_empty(user.avatar_url),
        public_repos: user.public_repos,
        private_repos: user.total_private_repos,
        followers: user.followers,
        following: user.following,
        organizations,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
