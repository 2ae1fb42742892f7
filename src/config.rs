use crate::error::{DashError, Result};
use crate::github::DEFAULT_API_URL;
use crate::model::TimeWindow;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const DEFAULT_CONFIG_FILE: &str = "ghdash.json";
pub const DEFAULT_OUTPUT: &str = "report.html";
pub const DEFAULT_HIGHLIGHT_LANGUAGE: &str = "Python";

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_API_TOKEN";
pub const REPORT_TOKEN_VAR: &str = "REPORT_HOST_TOKEN";
pub const API_URL_VAR: &str = "GITHUB_API_URL";

/// Contents of the optional JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub user: Option<String>,
    pub projects: Vec<ProjectConfig>,
    pub highlight_language: Option<String>,
    pub output: Option<PathBuf>,
    pub upload: Option<UploadConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub window: Option<WindowConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub endpoint: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

/// A collaborative project shown on the repositories page.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub window: Option<TimeWindow>,
}

impl Project {
    /// Parses `owner/repo` or `owner/repo@START..END`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (name, window) = match spec.split_once('@') {
            Some((name, range)) => {
                let (start, end) = range
                    .split_once("..")
                    .ok_or_else(|| DashError::Config(format!("Expected START..END in '{spec}'")))?;
                (name, Some(parse_window(start, end)?))
            }
            None => (spec, None),
        };
        validate_full_name(name)?;
        Ok(Self {
            name: name.to_string(),
            window,
        })
    }
}

impl TryFrom<&ProjectConfig> for Project {
    type Error = DashError;

    fn try_from(cfg: &ProjectConfig) -> Result<Self> {
        validate_full_name(&cfg.name)?;
        let window = match &cfg.window {
            Some(w) => Some(parse_window(&w.start, &w.end)?),
            None => None,
        };
        Ok(Self {
            name: cfg.name.clone(),
            window,
        })
    }
}

fn validate_full_name(name: &str) -> Result<()> {
    match name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => Ok(()),
        _ => Err(DashError::Config(format!("Expected OWNER/REPO, got '{name}'"))),
    }
}

impl FileConfig {
    /// Reads `path`, or `ghdash.json` in the working directory when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let raw = std::fs::read_to_string(&path)?;
        Self::parse(&raw).map_err(|e| DashError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        self.projects.iter().map(Project::try_from).collect()
    }
}

/// Values read from the environment. Tokens are not checked here; a missing
/// one shows up as an authentication failure on the first call that needs it.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub github_token: Option<String>,
    pub report_token: Option<String>,
    pub api_url: String,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            github_token: env_var(GITHUB_TOKEN_VAR),
            report_token: env_var(REPORT_TOKEN_VAR),
            api_url: env_var(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

pub fn parse_window(start: &str, end: &str) -> Result<TimeWindow> {
    TimeWindow::new(parse_date(start)?, parse_date(end)?)
}

/// Accepts RFC3339, `YYYY-MM-DD`, or a relative `"<duration> ago"` such as `"6months ago"`.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    if let Some(ago) = input.strip_suffix("ago") {
        let duration = humantime::parse_duration(ago.trim())
            .map_err(|e| DashError::InvalidDate(format!("'{input}': {e}")))?;
        let target = SystemTime::now()
            .checked_sub(duration)
            .ok_or_else(|| DashError::InvalidDate(format!("Duration overflow for '{input}'")))?;
        return Ok(DateTime::<Utc>::from(target));
    }

    Err(DashError::InvalidDate(format!(
        "'{input}' is not RFC3339, YYYY-MM-DD, or '<duration> ago'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_project_with_window() {
        let p = Project::parse("robomorelli/cell_counting_yellow@2020-11-01..2021-12-31").unwrap();
        assert_eq!(p.name, "robomorelli/cell_counting_yellow");
        let w = p.window.unwrap();
        assert_eq!((w.start.year(), w.start.month()), (2020, 11));
        assert_eq!((w.end.year(), w.end.day()), (2021, 31));
    }

    #[test]
    fn rejects_bad_project_names() {
        assert!(Project::parse("no-slash").is_err());
        assert!(Project::parse("a/b/c").is_err());
        assert!(Project::parse("a/b@2020-01-01").is_err());
    }

    #[test]
    fn relative_dates_are_in_the_past() {
        let dt = parse_date("2weeks ago").unwrap();
        assert!(dt < Utc::now());
        assert!(parse_date("next tuesday").is_err());
    }

    #[test]
    fn file_config_parses_projects() {
        let cfg = FileConfig::parse(
            r#"{
                "user": "clissa",
                "highlight_language": "Rust",
                "projects": [
                    {"name": "operationalintelligence/opint-framework",
                     "window": {"start": "2019-07-01", "end": "2020-06-30"}},
                    {"name": "robomorelli/cell_counting_yellow"}
                ],
                "upload": {"endpoint": "https://reports.example.com/api", "name": "Dashboard"}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.user.as_deref(), Some("clissa"));
        let projects = cfg.projects().unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects[0].window.is_some());
        assert!(projects[1].window.is_none());
        assert!(cfg.upload.unwrap().public);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        assert!(FileConfig::parse(r#"{"usr": "typo"}"#).is_err());
    }
}
