//! Builder for constructing an [`AgentClient`](crate::client::AgentClient)
//! with custom configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::Settings;
use crate::error::AgentResult;

/// Builder for [`AgentClient`](crate::client::AgentClient).
///
/// # Example
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use agent_run_client::builders::AgentClientBuilder;
/// use std::time::Duration;
///
/// let client = AgentClientBuilder::new("http://localhost:8123")
///     .with_timeout(Duration::from_secs(30))
///     .with_agent("marketing-agent")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AgentClientBuilder {
    settings: Settings,
    headers: HashMap<String, String>,
}

impl AgentClientBuilder {
    /// Create a new client builder for the given base URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_settings(Settings::default().with_base_url(url))
    }

    /// Start from already-resolved settings.
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings,
            headers: HashMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Add a custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.settings.auth_secret = Some(token.into());
        self
    }

    /// Prefer this agent over the service default.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.settings.agent = Some(agent.into());
        self
    }

    /// Request this model when an input does not name one.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.settings.model = Some(model.into());
        self
    }

    /// The settings the client will be built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build the client and fetch the service info.
    ///
    /// A configured agent that the service does not offer is replaced by the
    /// service default.
    pub async fn build(self) -> AgentResult<crate::client::AgentClient> {
        let mut client = self.build_without_info()?;
        client.retrieve_info().await?;
        Ok(client)
    }

    /// Build the client without contacting the service.
    pub fn build_without_info(self) -> AgentResult<crate::client::AgentClient> {
        use crate::client::{AgentClient, HttpTransport, TransportConfig};

        self.settings.validate()?;

        let mut config = TransportConfig::from(&self.settings);
        config.headers = self.headers;
        let transport = HttpTransport::with_config(&self.settings.base_url, config)?;

        let mut client = AgentClient::with_transport(Box::new(transport));
        client.set_agent_unchecked(self.settings.agent);
        client.set_model(self.settings.model);
        Ok(client)
    }
}
