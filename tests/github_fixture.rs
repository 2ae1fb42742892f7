use ghdash::github::{fetch_contributor_stats, fetch_repository_table, resolve_license, GitHubClient};
use ghdash::model::Visibility;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn with_link(mut self, link: String) -> Self {
        self.headers.push(("Link".to_string(), link));
        self
    }
}

type Handler = dyn Fn(&str, &str) -> Reply + Send + Sync;

/// Serves canned responses on a local port; the handler sees the base URL
/// and the request target (path plus query).
fn serve(handler: Arc<Handler>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let base_for_thread = base.clone();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(s) => s,
                Err(_) => continue,
            };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) if line == "\r\n" || line == "\n" => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
            let target = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
            let reply = handler(&base_for_thread, &target);

            let mut head = format!(
                "HTTP/1.1 {} Fixture\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                reply.status,
                reply.body.len()
            );
            for (name, value) in &reply.headers {
                head.push_str(&format!("{name}: {value}\r\n"));
            }
            head.push_str("\r\n");
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(reply.body.as_bytes());
            let _ = stream.flush();
        }
    });

    base
}

fn path_of(target: &str) -> &str {
    target.split('?').next().unwrap_or(target)
}

#[test]
fn missing_license_is_none_but_other_failures_are_errors() {
    let base = serve(Arc::new(|_base: &str, target: &str| match path_of(target) {
        "/repos/ana/unlicensed/license" => Reply::json(404, r#"{"message": "Not Found"}"#),
        "/repos/ana/licensed/license" => Reply::json(200, r#"{"license": {"key": "mit", "name": "MIT License"}}"#),
        _ => Reply::json(500, r#"{"message": "boom"}"#),
    }));
    let client = GitHubClient::new(base, None).unwrap();

    assert_eq!(resolve_license(&client, "ana/unlicensed").unwrap(), None);
    assert_eq!(
        resolve_license(&client, "ana/licensed").unwrap(),
        Some("MIT License".to_string())
    );

    let err = resolve_license(&client, "ana/broken").unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[test]
fn listing_follows_next_links_until_exhausted() {
    let base = serve(Arc::new(|base: &str, target: &str| {
        if path_of(target) != "/users/ana/repos" {
            return Reply::json(404, "{}");
        }
        if target.contains("page=2") {
            Reply::json(200, r#"[{"name": "c", "full_name": "ana/c", "description": null, "private": false}]"#)
        } else {
            Reply::json(
                200,
                r#"[{"name": "a", "full_name": "ana/a", "description": null, "private": false},
                    {"name": "b", "full_name": "ana/b", "description": null, "private": false}]"#,
            )
            .with_link(format!(
                r#"<{base}/users/ana/repos?page=2>; rel="next", <{base}/users/ana/repos?page=2>; rel="last""#
            ))
        }
    }));
    let client = GitHubClient::new(base, None).unwrap();

    let listings = ghdash::github::list_repositories(&client, "ana").unwrap();
    let names: Vec<_> = listings.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn counts_read_last_page_and_tolerate_empty_history() {
    let base = serve(Arc::new(|base: &str, target: &str| match path_of(target) {
        "/repos/ana/busy/commits" => Reply::json(200, r#"[{"sha": "1"}]"#)
            .with_link(format!(r#"<{base}/repos/ana/busy/commits?per_page=1&page=42>; rel="last""#)),
        "/repos/ana/empty/commits" => Reply::json(409, r#"{"message": "Git Repository is empty."}"#),
        _ => Reply::json(404, "{}"),
    }));
    let client = GitHubClient::new(base, None).unwrap();

    assert_eq!(client.count("/repos/ana/busy/commits", &[]).unwrap(), 42);
    assert_eq!(
        client
            .count_or_zero("/repos/ana/empty/commits", &[], &[StatusCode::CONFLICT])
            .unwrap(),
        0
    );
    assert!(client.count("/repos/ana/empty/commits", &[]).is_err());
}

#[test]
fn pending_statistics_yield_empty_series() {
    let base = serve(Arc::new(|_base: &str, target: &str| match path_of(target) {
        "/repos/ana/cold/stats/contributors" => Reply::json(202, "{}"),
        "/repos/ana/warm/stats/contributors" => Reply::json(
            200,
            r#"[{"author": {"login": "ana"}, "total": 3, "weeks": [{"w": 1604188800, "a": 0, "d": 0, "c": 3}]}]"#,
        ),
        _ => Reply::json(404, "{}"),
    }));
    let client = GitHubClient::new(base, None).unwrap();

    assert!(fetch_contributor_stats(&client, "ana/cold").unwrap().is_empty());
    let warm = fetch_contributor_stats(&client, "ana/warm").unwrap();
    assert_eq!(warm.len(), 1);
    assert_eq!(warm[0].author, "ana");
    assert_eq!(warm[0].total, 3);
}

#[test]
fn repository_table_combines_every_endpoint() {
    let base = serve(Arc::new(|base: &str, target: &str| match path_of(target) {
        "/users/ana/repos" => Reply::json(
            200,
            r#"[{"name": "tool", "full_name": "ana/tool", "description": "A tool", "private": false,
                 "forks_count": 2, "stargazers_count": 10, "open_issues_count": 1},
                {"name": "fresh", "full_name": "ana/fresh", "description": null, "private": true,
                 "forks_count": 0, "stargazers_count": 0, "open_issues_count": 0}]"#,
        ),
        "/repos/ana/tool/commits" => Reply::json(200, "[{}]")
            .with_link(format!(r#"<{base}/repos/ana/tool/commits?per_page=1&page=7>; rel="last""#)),
        "/repos/ana/fresh/commits" => Reply::json(409, r#"{"message": "Git Repository is empty."}"#),
        "/repos/ana/tool/collaborators" | "/repos/ana/fresh/collaborators" => Reply::json(200, "[{}]"),
        "/repos/ana/tool/languages" => Reply::json(200, r#"{"Rust": 900, "Shell": 100}"#),
        "/repos/ana/fresh/languages" => Reply::json(200, "{}"),
        "/repos/ana/tool/topics" => Reply::json(200, r#"{"names": ["cli", "cli", "github"]}"#),
        "/repos/ana/fresh/topics" => Reply::json(200, r#"{"names": []}"#),
        "/repos/ana/tool/license" => Reply::json(200, r#"{"license": {"name": "MIT License"}}"#),
        "/repos/ana/fresh/license" => Reply::json(404, r#"{"message": "Not Found"}"#),
        _ => Reply::json(404, "{}"),
    }));
    let client = GitHubClient::new(base, None).unwrap();

    let table = fetch_repository_table(&client, "ana", false).unwrap();
    assert_eq!(table.len(), 2);

    let tool = table.get("tool").unwrap();
    assert_eq!(tool.commit_count, 7);
    assert_eq!(tool.collaborator_count, 1);
    assert_eq!(tool.star_count, 10);
    assert_eq!(tool.topics, vec!["cli".to_string(), "github".to_string()]);
    assert_eq!(tool.languages.languages().collect::<Vec<_>>(), vec!["Rust", "Shell"]);
    assert_eq!(tool.license.as_deref(), Some("MIT License"));
    assert_eq!(tool.visibility, Visibility::Public);

    let fresh = table.get("fresh").unwrap();
    assert_eq!(fresh.commit_count, 0);
    assert_eq!(fresh.license, None);
    assert!(fresh.languages.is_empty());
    assert_eq!(fresh.visibility, Visibility::Private);
}
