//! Mock implementation of the `Transport` trait for testing.
//!
//! Answers every request with a canned body (or a transport failure) and
//! records what was sent.

use std::sync::{Arc, RwLock};

use alipay_crypto::{sign, PrivateKey, SignType};
use alipay_gateway::{
    ApiMethod, GatewayError, GatewayResult, SignedRequest, Transport, SUCCESS_CODE,
};
use async_trait::async_trait;

struct MockTransportInner {
    /// Body returned on every call.
    body: Vec<u8>,
    /// When true, every call returns a transport error.
    should_fail: bool,
    /// Every request sent: (gateway_url, request).
    requests: Vec<(String, SignedRequest)>,
}

/// A mock transport returning a fixed body.
///
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and all
/// clones share the same state.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<RwLock<MockTransportInner>>,
}

impl MockTransport {
    /// Respond with `body` to every request.
    pub fn responding(body: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockTransportInner {
                body: body.into(),
                should_fail: false,
                requests: Vec::new(),
            })),
        }
    }

    /// Respond with a successful reply to `method` carrying `fields`.
    pub fn success(method: ApiMethod, fields: &[(&str, &str)]) -> Self {
        Self::responding(Self::success_body(method, fields))
    }

    /// Respond with a failed reply to `method`.
    pub fn failure(method: ApiMethod, code: &str, sub_code: &str, sub_msg: &str) -> Self {
        let object = response_object(&[
            ("code", code),
            ("msg", "Business Failed"),
            ("sub_code", sub_code),
            ("sub_msg", sub_msg),
        ]);
        Self::responding(format!(r#"{{"{}":{}}}"#, method.response_key(), object))
    }

    /// Fail every request at the transport level.
    pub fn failing() -> Self {
        let mock = Self::responding(Vec::new());
        mock.set_should_fail(true);
        mock
    }

    /// A successful reply body to `method` carrying `fields`.
    pub fn success_body(method: ApiMethod, fields: &[(&str, &str)]) -> String {
        format!(r#"{{"{}":{}}}"#, method.response_key(), success_object(fields))
    }

    /// A successful reply body signed by `gateway_key`, the way the gateway
    /// signs its replies: over the exact response object text.
    pub fn signed_success_body(
        method: ApiMethod,
        fields: &[(&str, &str)],
        gateway_key: &PrivateKey,
        sign_type: SignType,
    ) -> String {
        let object = success_object(fields);
        let signature = sign(object.as_bytes(), gateway_key, sign_type).unwrap();
        format!(
            r#"{{"{}":{},"sign":"{}"}}"#,
            method.response_key(),
            object,
            signature
        )
    }

    /// Replace the canned body.
    pub fn set_body(&self, body: impl Into<Vec<u8>>) {
        self.inner.write().unwrap().body = body.into();
    }

    /// Set the failure mode at runtime.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().unwrap().should_fail = should_fail;
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Number of requests sent.
    pub fn call_count(&self) -> usize {
        self.inner.read().unwrap().requests.len()
    }

    /// Whether any request was sent.
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// All requests sent, with the gateway URL each went to.
    pub fn requests(&self) -> Vec<(String, SignedRequest)> {
        self.inner.read().unwrap().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<SignedRequest> {
        self.inner
            .read()
            .unwrap()
            .requests
            .last()
            .map(|(_, request)| request.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, gateway_url: &str, request: &SignedRequest) -> GatewayResult<Vec<u8>> {
        let mut inner = self.inner.write().unwrap();
        inner.requests.push((gateway_url.to_string(), request.clone()));
        if inner.should_fail {
            return Err(GatewayError::transport("mock: configured to fail"));
        }
        Ok(inner.body.clone())
    }
}

fn success_object(fields: &[(&str, &str)]) -> String {
    let mut all = vec![("code", SUCCESS_CODE), ("msg", "Success")];
    all.extend_from_slice(fields);
    response_object(&all)
}

fn response_object(fields: &[(&str, &str)]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|(k, v)| format!(r#""{}":"{}""#, k, v))
        .collect();
    format!("{{{}}}", members.join(","))
}
