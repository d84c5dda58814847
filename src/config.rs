use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AuditError;
use crate::github::SinglePagePolicy;

/// Organization audited when no configuration overrides it
pub const DEFAULT_ORGANIZATION: &str = "ki-labs";

/// Main configuration structure for the privacy audit
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// Repository listing API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Alert delivery settings
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Shared HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Organization whose repositories are audited
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Treat a first page without a `Link` header as the only page
    #[serde(default)]
    pub single_page_without_link: bool,
}

/// Notification configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationConfig {
    /// Environment variable holding the webhook URL
    #[serde(default = "default_webhook_env")]
    pub webhook_env: String,
}

/// HTTP client configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// User-Agent sent with every request (GitHub rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

// Default value functions
fn default_organization() -> String {
    DEFAULT_ORGANIZATION.to_string()
}
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "GIT_TOKEN".to_string()
}
fn default_webhook_env() -> String {
    "SLACK_HOOK".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            api_url: default_api_url(),
            token_env: default_token_env(),
            single_page_without_link: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_env: default_webhook_env(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GitHubConfig {
    pub fn single_page_policy(&self) -> SinglePagePolicy {
        if self.single_page_without_link {
            SinglePagePolicy::AssumeSinglePage
        } else {
            SinglePagePolicy::Strict
        }
    }
}

impl HttpConfig {
    /// Build the client shared by the listing API and the webhook
    pub fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout))
            .user_agent(self.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")
    }
}

impl Config {
    /// Load configuration from the default location, falling back to built-in defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            tracing::debug!(
                "No configuration at {:?}, using built-in defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join(env!("CARGO_PKG_NAME")).join("config.yml"))
    }
}

/// Secrets read from the environment once per run
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub webhook_url: String,
}

impl Credentials {
    /// Read both secrets from the process environment
    pub fn from_env(config: &Config) -> Result<Self, AuditError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read both secrets through `lookup`; absent and empty values are both fatal
    pub fn from_lookup<F>(config: &Config, lookup: F) -> Result<Self, AuditError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AuditError::missing_configuration(name))
        };

        let token = require(config.github.token_env.as_str())?;
        let webhook_url = require(config.notification.webhook_env.as_str())?;

        Ok(Self { token, webhook_url })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("webhook_url", &"<redacted>")
            .finish()
    }
}
