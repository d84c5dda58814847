//! Common test utilities and helpers for repo-privacy-check tests
#![allow(dead_code)]

use repo_privacy_check::config::GitHubConfig;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const ORG: &str = "ki-labs";
pub const TOKEN: &str = "123";
pub const HOOK_PATH: &str = "/hook";

/// Matches the first listing request, which carries no `page` parameter
pub struct NoPageParam;

impl Match for NoPageParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}

pub fn listing_path() -> String {
    format!("/orgs/{}/repos", ORG)
}

/// One element of the listing response body
pub fn repo_json(url: &str, private: bool) -> Value {
    json!({
        "id": 1,
        "name": url.rsplit('/').next().unwrap_or(url),
        "html_url": url,
        "private": private,
        "fork": false
    })
}

/// A GitHub style `Link` header announcing `last` as the final page
pub fn link_header(server: &MockServer, last: u32) -> String {
    format!(
        r#"<{uri}/organizations/5430905/repos?page=2>; rel="next", <{uri}/organizations/5430905/repos?page={last}>; rel="last""#,
        uri = server.uri(),
        last = last
    )
}

pub fn github_config(server: &MockServer) -> GitHubConfig {
    GitHubConfig {
        api_url: server.uri(),
        organization: ORG.to_string(),
        ..GitHubConfig::default()
    }
}

pub fn hook_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), HOOK_PATH)
}

/// Respond to one listing page; `None` is the first, parameterless request
pub async fn mount_page(
    server: &MockServer,
    page: Option<u32>,
    status: u16,
    body: Value,
    link: Option<String>,
    expected_calls: u64,
) {
    let mut response = ResponseTemplate::new(status).set_body_json(body);
    if let Some(link) = link {
        response = response.insert_header("Link", link.as_str());
    }

    let mock = Mock::given(method("GET"))
        .and(path(listing_path()))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()));

    let mock = match page {
        None => mock.and(NoPageParam),
        Some(page) => mock.and(query_param("page", page.to_string().as_str())),
    };

    mock.respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Accept webhook posts with `status`, expecting exactly `expected_calls`
pub async fn mount_hook(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Accept exactly one webhook post whose body is `{"text": text}`
pub async fn mount_hook_expecting(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .and(header("content-type", "application/json"))
        .and(wiremock::matchers::body_json(json!({ "text": text })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}
