use super::client::{ensure_success, GitHubClient};
use crate::error::Result;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Deserialize)]
struct LicenseResponse {
    license: Option<LicenseInfo>,
}

#[derive(Deserialize)]
struct LicenseInfo {
    name: String,
}

/// License name of `full_name` (`owner/repo`), or `None` when the repository
/// has no license file. Only a 404 counts as absent; every other failure is
/// returned as an error.
pub fn resolve_license(client: &GitHubClient, full_name: &str) -> Result<Option<String>> {
    let resp = client.send(&format!("/repos/{full_name}/license"), &[])?;
    if resp.status() == StatusCode::NOT_FOUND {
        debug!("{full_name}: no license");
        return Ok(None);
    }
    let body: LicenseResponse = ensure_success(resp)?.json()?;
    Ok(body.license.map(|l| l.name))
}
