//! `reqwest`-backed [`ChatGateway`].
//!
//! Every operation is a JSON `POST`. A 2xx status is success; any other
//! status, and any 2xx whose body does not decode into the expected shape,
//! becomes [`GatewayError::ServerRejected`]. Transport problems (refused
//! connection, timeout, reset) become [`GatewayError::NetworkFailure`].

use chatlink_core::models::history::HistoryEntry;
use chatlink_core::models::identity::Identity;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::client::{GatewayConfig, ResolvedEndpoints, build_client};
use crate::error::GatewayError;
use crate::gateway::ChatGateway;
use crate::wire::{HistoryResponse, IdentityRequest, SendRequest, SendResponse};

#[derive(Debug, Clone)]
pub struct HttpChatGateway {
    client: Client,
    endpoints: ResolvedEndpoints,
}

impl HttpChatGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let endpoints = ResolvedEndpoints::resolve(config)?;
        let client = build_client(config)?;
        info!(base_url = %config.base_url, "chat gateway ready");
        Ok(Self { client, endpoints })
    }

    /// Use an existing client, e.g. one shared with other services.
    pub fn with_client(client: Client, config: &GatewayConfig) -> Result<Self, GatewayError> {
        let endpoints = ResolvedEndpoints::resolve(config)?;
        Ok(Self { client, endpoints })
    }

    /// Issue the request and check the status. The body is left unread.
    async fn post<B: Serialize>(&self, url: &Url, body: &B) -> Result<Response, GatewayError> {
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The rejection body is informational only; a failed read leaves it empty.
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::ServerRejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<R, GatewayError> {
        let response = self.post(url, body).await?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| GatewayError::ServerRejected {
            status,
            body: format!("malformed response body: {e}"),
        })
    }
}

impl ChatGateway for HttpChatGateway {
    async fn send_message(&self, identity: &Identity, text: &str) -> Result<String, GatewayError> {
        let request = SendRequest {
            email: identity.as_str(),
            message: text,
        };
        let response: SendResponse = self.post_json(&self.endpoints.send, &request).await?;
        Ok(response.chat_response.unwrap_or_default())
    }

    async fn fetch_history(&self, identity: &Identity) -> Result<Vec<HistoryEntry>, GatewayError> {
        let request = IdentityRequest {
            email: identity.as_str(),
        };
        let response: HistoryResponse = self.post_json(&self.endpoints.history, &request).await?;
        Ok(response.history.unwrap_or_default())
    }

    async fn clear_history(&self, identity: &Identity) -> Result<(), GatewayError> {
        let request = IdentityRequest {
            email: identity.as_str(),
        };
        self.post(&self.endpoints.clear, &request).await?;
        Ok(())
    }
}
