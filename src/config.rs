//! Client settings resolved from defaults, the environment and `.env`.

use std::time::Duration;

use crate::error::{AgentClientError, AgentResult};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8123";

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable for the service base URL.
pub const ENV_BASE_URL: &str = "AGENT_BASE_URL";
/// Fallback environment variable for the service base URL.
pub const ENV_BASE_URL_FALLBACK: &str = "BASE_URL";
/// Environment variable holding the bearer token.
pub const ENV_AUTH_SECRET: &str = "AUTH_SECRET";
pub const ENV_AGENT: &str = "AGENT_NAME";
pub const ENV_MODEL: &str = "AGENT_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "AGENT_TIMEOUT_SECS";

/// Settings for an [`AgentClient`](crate::client::AgentClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the agent service, without trailing slash.
    pub base_url: String,
    /// Bearer token sent as `Authorization: Bearer <secret>`.
    pub auth_secret: Option<String>,
    /// Agent to use instead of the service default.
    pub agent: Option<String>,
    /// Model to request instead of the service default.
    pub model: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_secret: None,
            agent: None,
            model: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first if
    /// one exists in the working directory or its parents.
    pub fn from_env() -> AgentResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(url) = get(ENV_BASE_URL).or_else(|| get(ENV_BASE_URL_FALLBACK)) {
            settings = settings.with_base_url(url);
        }
        settings.auth_secret = get(ENV_AUTH_SECRET);
        settings.agent = get(ENV_AGENT);
        settings.model = get(ENV_MODEL);

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AgentClientError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            settings.timeout = Duration::from_secs(secs);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Override the base URL (trailing slashes are dropped).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Check that the base URL is an http(s) URL and the timeout is non-zero.
    pub fn validate(&self) -> AgentResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AgentClientError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(AgentClientError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
