//! Webhook alerting
//!
//! Formats the list of public repositories into a single chat message and
//! posts it to an incoming-webhook URL (Slack compatible `{"text": ...}` body).

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AuditError, Result};

const HEADER: &str = "The following repositories are public:\n";
const REMINDER: &str = "\nPlease make sure they should be public!\n";

/// Message body accepted by the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub text: String,
}

/// Build the alert text for the given public repositories
pub fn format_payload(public_repositories: &[String]) -> NotificationPayload {
    NotificationPayload {
        text: format!("{}{}{}", HEADER, public_repositories.join("\n"), REMINDER),
    }
}

/// Destination for the alert
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<()>;
}

/// Incoming-webhook notifier
pub struct SlackNotifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<()> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| AuditError::delivery(format!("could not encode payload: {}", e)))?;

        debug!("Posting {} byte notification", body.len());
        let response = self
            .http
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| AuditError::delivery(format!("request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuditError::delivery(format!("unexpected status {}", status)));
        }

        info!("Notification delivered");
        Ok(())
    }
}
