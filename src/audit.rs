//! Audit orchestration
//!
//! Walks every listing page, classifies each as it arrives and, once the
//! whole organization has been seen, sends exactly one notification. Any
//! failure aborts the run before anything is delivered.

use futures::{pin_mut, TryStreamExt};
use tracing::{debug, info};

use crate::error::Result;
use crate::github::{self, RepositorySource, SinglePagePolicy};
use crate::notify::{format_payload, NotificationPayload, Notifier};
use crate::visibility::extract_public;

/// Outcome of a completed audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub organization: String,
    pub pages_fetched: u32,
    pub repositories_seen: usize,
    /// Public repository references in page order
    pub public_repositories: Vec<String>,
}

impl AuditReport {
    fn new(organization: &str) -> Self {
        Self {
            organization: organization.to_string(),
            pages_fetched: 0,
            repositories_seen: 0,
            public_repositories: Vec::new(),
        }
    }

    /// Alert message for this report
    pub fn payload(&self) -> NotificationPayload {
        format_payload(&self.public_repositories)
    }
}

/// Privacy audit of one organization
pub struct Audit<S, N> {
    source: S,
    notifier: N,
    organization: String,
    policy: SinglePagePolicy,
}

impl<S, N> Audit<S, N>
where
    S: RepositorySource,
    N: Notifier,
{
    pub fn new(
        source: S,
        notifier: N,
        organization: impl Into<String>,
        policy: SinglePagePolicy,
    ) -> Self {
        Self {
            source,
            notifier,
            organization: organization.into(),
            policy,
        }
    }

    /// Walk every page and gather the public repositories without notifying
    pub async fn collect(&self) -> Result<AuditReport> {
        info!("Auditing repositories of organization: {}", self.organization);

        let pages = github::pages(&self.source, self.policy);
        pin_mut!(pages);

        let mut report = AuditReport::new(&self.organization);
        while let Some(page) = pages.try_next().await? {
            let public = extract_public(&page.records);
            debug!(
                "Page {}: {} repositories, {} public",
                page.number,
                page.records.len(),
                public.len()
            );

            report.pages_fetched += 1;
            report.repositories_seen += page.records.len();
            report.public_repositories.extend(public);
        }

        info!(
            "Found {} public repositories out of {} in {}",
            report.public_repositories.len(),
            report.repositories_seen,
            self.organization
        );
        Ok(report)
    }

    /// Full run: collect, then deliver one notification
    pub async fn run(&self) -> Result<AuditReport> {
        let report = self.collect().await?;
        self.notifier.deliver(&report.payload()).await?;
        Ok(report)
    }
}
