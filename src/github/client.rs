use crate::error::{DashError, Result};
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const PER_PAGE: &str = "100";

/// Blocking GitHub REST client. Every call waits for its response.
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("ghdash/{VERSION}"))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Sends a GET without judging the status; callers that treat some
    /// statuses as data (404, 409, 202) inspect it themselves.
    pub fn send(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = self.url(path);
        debug!("GET {url} {query:?}");
        let mut req = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        Ok(req.send()?)
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let resp = self.send(path, query)?;
        ensure_success(resp)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        Ok(self.get(path, query)?.json()?)
    }

    /// Follows `rel="next"` links until the listing is exhausted.
    pub fn get_all<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let mut params: Vec<(&str, &str)> = query.to_vec();
        params.push(("per_page", PER_PAGE));

        let mut items = Vec::new();
        let mut resp = self.get(path, &params)?;
        loop {
            let next = next_link(resp.headers());
            let mut page: Vec<T> = resp.json()?;
            items.append(&mut page);
            match next {
                Some(url) => resp = self.get(&url, &[])?,
                None => break,
            }
        }
        Ok(items)
    }

    /// Item count of a listing, read from the last-page link of a one-item page.
    pub fn count(&self, path: &str, query: &[(&str, &str)]) -> Result<u64> {
        let resp = self.send(path, &with_single_page(query))?;
        count_response(ensure_success(resp)?)
    }

    /// Like [`count`](Self::count), but maps the given statuses to zero.
    pub fn count_or_zero(&self, path: &str, query: &[(&str, &str)], empty: &[StatusCode]) -> Result<u64> {
        let resp = self.send(path, &with_single_page(query))?;
        if empty.contains(&resp.status()) {
            debug!("{path}: {} treated as empty", resp.status());
            return Ok(0);
        }
        count_response(ensure_success(resp)?)
    }
}

fn with_single_page<'a>(query: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut params = query.to_vec();
    params.push(("per_page", "1"));
    params
}

fn count_response(resp: Response) -> Result<u64> {
    if let Some(last) = last_page(resp.headers()) {
        return Ok(last);
    }
    let page: Vec<serde_json::Value> = resp.json()?;
    Ok(page.len() as u64)
}

pub(crate) fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().unwrap_or_default();
    Err(api_error(status, url, &body))
}

pub(crate) fn api_error(status: StatusCode, url: String, body: &str) -> DashError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    DashError::Api {
        status: status.as_u16(),
        url,
        message,
    }
}

fn link_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(LINK).and_then(|v| v.to_str().ok())
}

fn next_link(headers: &HeaderMap) -> Option<String> {
    link_header(headers).and_then(|h| find_link(h, "next"))
}

fn last_page(headers: &HeaderMap) -> Option<u64> {
    link_header(headers)
        .and_then(|h| find_link(h, "last"))
        .and_then(|url| page_param(&url))
}

/// Picks the URL tagged `rel="{rel}"` out of an RFC 8288 `Link` header.
pub fn find_link(header: &str, rel: &str) -> Option<String> {
    let wanted = format!("rel=\"{rel}\"");
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';').map(str::trim);
        let target = pieces.next()?;
        if pieces.any(|p| p == wanted) {
            target
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(str::to_string)
        } else {
            None
        }
    })
}

/// The `page` query parameter of `url`; `per_page` is not mistaken for it.
pub fn page_param(url: &str) -> Option<u64> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .find_map(|kv| kv.strip_prefix("page="))
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<https://api.github.com/user/repos?per_page=1&page=2>; rel=\"next\", \
                          <https://api.github.com/user/repos?per_page=1&page=37>; rel=\"last\"";

    #[test]
    fn finds_next_and_last_links() {
        assert_eq!(
            find_link(HEADER, "next").as_deref(),
            Some("https://api.github.com/user/repos?per_page=1&page=2")
        );
        let last = find_link(HEADER, "last").unwrap();
        assert_eq!(page_param(&last), Some(37));
        assert_eq!(find_link(HEADER, "prev"), None);
    }

    #[test]
    fn page_param_ignores_per_page() {
        assert_eq!(page_param("https://x/y?per_page=100"), None);
        assert_eq!(page_param("https://x/y?page=3&per_page=100"), Some(3));
    }

    #[test]
    fn api_error_prefers_json_message() {
        let err = api_error(StatusCode::UNAUTHORIZED, "u".into(), r#"{"message":"Bad credentials"}"#);
        assert!(matches!(err, DashError::Api { status: 401, ref message, .. } if message == "Bad credentials"));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn relative_paths_are_joined_to_base() {
        let client = GitHubClient::new("http://localhost:1/", None).unwrap();
        assert_eq!(client.url("/users/x"), "http://localhost:1/users/x");
        assert_eq!(client.url("https://other/y"), "https://other/y");
    }
}
