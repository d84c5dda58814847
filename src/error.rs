//! Error types for the privacy audit
//!
//! Every failure in the pipeline is fatal for the run. Components return
//! these values up the call chain; only the binary turns them into a
//! diagnostic and an exit status.

use thiserror::Error;

/// Why the pagination metadata on the first page could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationFault {
    /// The response carried no `Link` header at all
    #[error("Link does not exist in response header!")]
    MissingLinkHeader,

    /// A `Link` header was present but had no parseable `rel="last"` page
    #[error("no page found in response header!")]
    NoLastPage,
}

/// Fatal conditions that abort an audit run
#[derive(Debug, Error)]
pub enum AuditError {
    /// A required environment variable is absent or empty
    #[error("{var} ENV var not set")]
    MissingConfiguration { var: String },

    /// The repository listing API did not answer a page with 200
    #[error("Calling GitHub API Error! (page {page}: {reason})")]
    RemoteCallFailure { page: u32, reason: String },

    /// The first page's pagination metadata is absent or unusable
    #[error("Calling GitHub API Error, {0}")]
    MalformedPaginationMetadata(#[from] PaginationFault),

    /// The webhook did not accept the notification
    #[error("Posting to slack error! ({reason})")]
    NotificationDeliveryFailure { reason: String },
}

impl AuditError {
    pub fn missing_configuration(var: impl Into<String>) -> Self {
        Self::MissingConfiguration { var: var.into() }
    }

    pub fn remote_call(page: u32, reason: impl Into<String>) -> Self {
        Self::RemoteCallFailure {
            page,
            reason: reason.into(),
        }
    }

    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::NotificationDeliveryFailure {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = AuditError> = std::result::Result<T, E>;
