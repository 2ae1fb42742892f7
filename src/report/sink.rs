use super::document::Document;
use super::html::render_html;
use crate::error::Result;
use log::{debug, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Renders `document` and writes it to `path`, creating parent directories.
pub fn save(document: &Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_html(document))?;
    info!("report written to {}", path.display());
    Ok(())
}

/// Hands `path` to the platform's default opener. The openers return once
/// the viewer is launched, so their exit status is checked.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    let cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    launch(cmd, path)
}

fn launch(mut cmd: Command, path: &Path) -> Result<()> {
    let status = cmd.arg(path).status()?;
    if !status.success() {
        return Err(std::io::Error::other(format!("viewer exited with {status} for {}", path.display())).into());
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct UploadMeta {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(alias = "web_url")]
    url: Option<String>,
}

/// A report hosting service accepting multipart uploads.
pub struct ReportHost {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl ReportHost {
    /// No request is made here; a bad or missing token fails on upload.
    pub fn login(endpoint: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ghdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token,
        })
    }

    /// Uploads the rendered report. Returns the hosted URL when the service reports one.
    pub fn upload(&self, document: &Document, meta: &UploadMeta) -> Result<Option<String>> {
        let html = render_html(document);
        let report = Part::bytes(html.into_bytes())
            .file_name("report.html")
            .mime_str("text/html")?;
        let form = Form::new()
            .text("name", meta.name.clone())
            .text("description", meta.description.clone())
            .text("publicly_visible", meta.public.to_string())
            .part("report", report);

        debug!("POST {} ({})", self.endpoint, meta.name);
        let mut req = self.http.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let resp = req.send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(crate::github::client::api_error(status, self.endpoint.clone(), &body));
        }

        let url = serde_json::from_str::<UploadResponse>(&body).ok().and_then(|r| r.url);
        match &url {
            Some(u) => info!("report uploaded to {u}"),
            None => info!("report uploaded to {}", self.endpoint),
        }
        Ok(url)
    }
}

impl From<&crate::config::UploadConfig> for UploadMeta {
    fn from(cfg: &crate::config::UploadConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            public: cfg.public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::text;
    use tempfile::tempdir;

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/nested/report.html");
        save(&Document::single("t", vec![text("# hi")]), &path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>hi</h1>"));
    }

    #[cfg(unix)]
    #[test]
    fn viewer_failure_is_reported() {
        let path = Path::new("report.html");
        assert!(launch(Command::new("true"), path).is_ok());
        let err = launch(Command::new("false"), path).unwrap_err();
        assert!(err.to_string().contains("report.html"));
    }
}
