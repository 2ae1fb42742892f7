pub mod client;
pub mod license;
pub mod repos;
pub mod stats;
pub mod user;

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use license::resolve_license;
pub use repos::{fetch_languages, fetch_repository_table, list_repositories, RepoListing};
pub use stats::fetch_contributor_stats;
pub use user::fetch_profile;
