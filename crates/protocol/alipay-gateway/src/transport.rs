//! HTTP transport to the gateway.
//!
//! The transport performs exactly one round trip per call. It never retries:
//! a refund that timed out may still have been executed, so repeating it is
//! the caller's decision.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::request::SignedRequest;

/// Sends a signed request and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `request` to `gateway_url`.
    async fn send(&self, gateway_url: &str, request: &SignedRequest) -> GatewayResult<Vec<u8>>;
}

/// `reqwest` based transport issuing `GET gateway?params`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport. `timeout` applies to the whole round trip.
    pub fn new(timeout: Option<Duration>) -> GatewayResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::transport(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing HTTP client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, gateway_url: &str, request: &SignedRequest) -> GatewayResult<Vec<u8>> {
        let url = request.to_url(gateway_url)?;
        debug!(gateway = %gateway_url, method = %request.method(), "Sending gateway request");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, method = %request.method(), "Gateway HTTP failure");
            return Err(GatewayError::transport(format!(
                "gateway returned HTTP {}: {}",
                status, body
            )));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Gateway response received");
        Ok(body.to_vec())
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish()
    }
}
