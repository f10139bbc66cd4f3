use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Paths of the three chat operations, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub send: String,
    pub history: String,
    pub clear: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            send: "/chat/".to_string(),
            history: "/chat/history/".to_string(),
            clear: "/chat/history/clear/".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub endpoints: Endpoints,
    /// Applied by the HTTP client to each request.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: Endpoints::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

/// Fully resolved request URLs.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedEndpoints {
    pub send: Url,
    pub history: Url,
    pub clear: Url,
}

impl ResolvedEndpoints {
    pub(crate) fn resolve(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| GatewayError::Config(format!("invalid endpoint path {path:?}: {e}")))
        };
        Ok(Self {
            send: join(&config.endpoints.send)?,
            history: join(&config.endpoints.history)?,
            clear: join(&config.endpoints.clear)?,
        })
    }
}

/// Build the HTTP client used for every gateway call.
pub fn build_client(config: &GatewayConfig) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("chatlink/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| GatewayError::Config(e.to_string()))
}
