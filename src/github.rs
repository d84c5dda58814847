//! GitHub organization repository listing
//!
//! Fetches the organization listing one page at a time and reads the page
//! count from the first page's `Link` header. Pages are exposed as a lazy
//! stream so that the first failure ends the walk without issuing any
//! further requests.

use async_trait::async_trait;
use futures::stream::{self, Stream};
use regex::Regex;
use reqwest::header::{ACCEPT, LINK};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::config::GitHubConfig;
use crate::error::{AuditError, PaginationFault, Result};

/// One entry of the organization listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryRecord {
    /// Browser URL of the repository
    #[serde(rename = "html_url")]
    pub reference: String,

    #[serde(rename = "private")]
    pub is_private: bool,
}

impl RepositoryRecord {
    pub fn new(reference: impl Into<String>, is_private: bool) -> Self {
        Self {
            reference: reference.into(),
            is_private,
        }
    }
}

/// The result of one listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number this response answers
    pub number: u32,
    pub records: Vec<RepositoryRecord>,
    /// Raw `Link` response header, only consulted on page 1
    pub link: Option<String>,
}

/// How to treat a first page that carries no pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinglePagePolicy {
    /// A missing `Link` header is fatal
    #[default]
    Strict,
    /// A missing `Link` header means the organization fits on one page
    AssumeSinglePage,
}

impl Page {
    /// Total page count according to this page's metadata
    pub fn last_page(&self, policy: SinglePagePolicy) -> Result<u32> {
        match (self.link.as_deref(), policy) {
            (None, SinglePagePolicy::AssumeSinglePage) => Ok(1),
            (link, _) => last_page_number(link),
        }
    }
}

fn link_entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*<(?P<url>[^>]*)>(?P<params>.*)$"#).expect("valid link entry regex")
    })
}

fn rel_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"rel\s*=\s*"(?P<rel>[^"]*)""#).expect("valid rel regex"))
}

/// Extract the final page number from a `Link` header.
///
/// The header is a comma separated list of `<url>; rel="name"` entries, e.g.
/// `<https://api.github.com/organizations/1/repos?page=2>; rel="next", <https://api.github.com/organizations/1/repos?page=3>; rel="last"`.
pub fn last_page_number(link: Option<&str>) -> Result<u32> {
    let link = link.ok_or(PaginationFault::MissingLinkHeader)?;

    link.split(',')
        .filter_map(|entry| link_entry_regex().captures(entry))
        .find(|entry| {
            rel_regex().captures(&entry["params"]).is_some_and(|rel| {
                rel["rel"].split_whitespace().any(|name| name == "last")
            })
        })
        .and_then(|entry| page_query_param(&entry["url"]))
        .ok_or_else(|| PaginationFault::NoLastPage.into())
}

/// Read the `page` query parameter from a URL
fn page_query_param(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .find_map(|param| param.strip_prefix("page="))
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|page| *page >= 1)
}

/// Anything that can answer a listing request for one page
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetch one page; `None` requests the first page without a page parameter
    async fn fetch_page(&self, page: Option<u32>) -> Result<Page>;
}

/// Listing API client bound to a single organization
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    organization: String,
    token: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            organization: config.organization.clone(),
            token: token.into(),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// URL of one listing page
    pub fn listing_url(&self, page: Option<u32>) -> String {
        let mut url = format!("{}/orgs/{}/repos", self.api_url, self.organization);
        if let Some(page) = page {
            url.push_str(&format!("?page={}", page));
        }
        url
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn fetch_page(&self, page: Option<u32>) -> Result<Page> {
        let number = page.unwrap_or(1);
        let url = self.listing_url(page);
        debug!("Fetching repositories page {} from {}", number, url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AuditError::remote_call(number, format!("request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuditError::remote_call(
                number,
                format!("unexpected status {}", status),
            ));
        }

        let link = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let records: Vec<RepositoryRecord> = response.json().await.map_err(|e| {
            AuditError::remote_call(number, format!("invalid response body: {}", e))
        })?;

        debug!("Page {} listed {} repositories", number, records.len());
        Ok(Page {
            number,
            records,
            link,
        })
    }
}

/// Position of the page walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    First,
    Next { page: u32, last: u32 },
    Done,
}

impl Cursor {
    fn after(current: u32, last: u32) -> Self {
        if current < last {
            Cursor::Next {
                page: current + 1,
                last,
            }
        } else {
            Cursor::Done
        }
    }
}

/// Lazily walk every listing page in ascending order.
///
/// Page 1 is requested without a page parameter and its `Link` header decides
/// how many more pages follow. The stream yields at most one error, after
/// which it ends.
pub fn pages<'a, S>(
    source: &'a S,
    policy: SinglePagePolicy,
) -> impl Stream<Item = Result<Page>> + 'a
where
    S: RepositorySource + ?Sized,
{
    stream::try_unfold(Cursor::First, move |cursor| advance(source, cursor, policy))
}

async fn advance<S>(
    source: &S,
    cursor: Cursor,
    policy: SinglePagePolicy,
) -> Result<Option<(Page, Cursor)>>
where
    S: RepositorySource + ?Sized,
{
    match cursor {
        Cursor::First => {
            let page = source.fetch_page(None).await?;
            let last = page.last_page(policy)?;
            info!("Organization listing spans {} page(s)", last);
            Ok(Some((page, Cursor::after(1, last))))
        }
        Cursor::Next { page, last } => {
            let fetched = source.fetch_page(Some(page)).await?;
            Ok(Some((fetched, Cursor::after(page, last))))
        }
        Cursor::Done => Ok(None),
    }
}
