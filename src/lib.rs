//! repo-privacy-check - GitHub organization visibility audit
//!
//! Lists every repository of an organization, picks out the public ones and
//! posts a single reminder to a chat webhook so someone can confirm they are
//! meant to be public.
//!
//! ## Modules
//!
//! - [`config`]: Configuration file and environment credentials
//! - [`github`]: Paginated organization listing
//! - [`visibility`]: Public repository classification
//! - [`notify`]: Alert formatting and webhook delivery
//! - [`audit`]: Orchestration of a full run
//! - [`error`]: Fatal error kinds

pub mod audit;
pub mod config;
pub mod error;
pub mod github;
pub mod notify;
pub mod visibility;

pub use audit::{Audit, AuditReport};
pub use config::{Config, Credentials};
pub use error::{AuditError, PaginationFault};
pub use github::{GitHubClient, Page, RepositoryRecord, RepositorySource, SinglePagePolicy};
pub use notify::{format_payload, NotificationPayload, Notifier, SlackNotifier};
pub use visibility::extract_public;
