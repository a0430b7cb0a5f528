//! Signed round trips to the gateway.
//!
//! Each call moves through `BUILT -> SENT -> {SUCCEEDED, FAILED}` once.

use std::sync::Arc;

use alipay_crypto::{PrivateKey, SignType};
use tracing::debug;

use crate::config::{ClientConfig, Credentials};
use crate::error::GatewayResult;
use crate::request::{RequestBuilder, SignedRequest};
use crate::response::{validate_response, validate_signed_response, GatewayResponse};
use crate::transport::Transport;
use crate::types::{ApiMethod, BizContent, Identity};

/// Builds, sends and validates signed requests.
#[derive(Clone)]
pub struct Gateway {
    credentials: Arc<Credentials>,
    transport: Arc<dyn Transport>,
    endpoint: String,
    sign_type: SignType,
    verify_response_signature: bool,
}

impl Gateway {
    /// Create a gateway for `config` using already loaded credentials.
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<Credentials>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            endpoint: config.endpoint().to_string(),
            sign_type: config.sign_type,
            verify_response_signature: config.verify_response_signature,
        }
    }

    /// The endpoint requests go to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The configured sign type.
    pub fn sign_type(&self) -> SignType {
        self.sign_type
    }

    /// Sign a request without sending it.
    pub fn sign_request(
        &self,
        identity: &Identity,
        private_key: &PrivateKey,
        method: ApiMethod,
        biz: &BizContent,
        return_url: Option<&str>,
    ) -> GatewayResult<SignedRequest> {
        RequestBuilder::new(identity, private_key, self.sign_type)
            .notify_url(self.credentials.notify_url.as_deref())
            .return_url(return_url)
            .build(method, biz)
    }

    /// Sign `biz` as `identity`, send it and validate the reply.
    pub async fn execute(
        &self,
        identity: &Identity,
        private_key: &PrivateKey,
        method: ApiMethod,
        biz: &BizContent,
    ) -> GatewayResult<GatewayResponse> {
        let request = self.sign_request(identity, private_key, method, biz, None)?;
        debug!(method = %method, identity = %identity, "Request signed");

        let raw = self.transport.send(&self.endpoint, &request).await?;

        if self.verify_response_signature {
            validate_signed_response(
                &raw,
                method,
                &self.credentials.gateway_public_key,
                self.sign_type,
            )
        } else {
            validate_response(&raw, method)
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("endpoint", &self.endpoint)
            .field("sign_type", &self.sign_type)
            .field("verify_response_signature", &self.verify_response_signature)
            .finish()
    }
}
