//! Recording implementation of the `RefundCall` trait.
//!
//! Captures exactly what the refund entry points hand to the signed-refund
//! step, without signing or sending anything.

use std::sync::{Arc, RwLock};

use alipay_crypto::PrivateKey;
use alipay_gateway::{
    validate_response, ApiMethod, GatewayError, GatewayResponse, GatewayResult, Identity,
    RefundCall, RefundParams,
};
use async_trait::async_trait;

use crate::MockTransport;

/// One captured refund.
#[derive(Debug, Clone)]
pub struct RecordedRefund {
    /// Identity the refund was made as.
    pub identity: Identity,
    /// Key handed over for signing.
    pub private_key: PrivateKey,
    pub method: ApiMethod,
    /// Business parameters, as forwarded.
    pub params: RefundParams,
}

struct RecordingRefundInner {
    calls: Vec<RecordedRefund>,
    /// When set, every call fails with this gateway error.
    failure: Option<(String, String)>,
}

/// A `RefundCall` that records its arguments and reports success.
///
/// Cheap to clone; all clones share the same record.
#[derive(Clone)]
pub struct RecordingRefund {
    inner: Arc<RwLock<RecordingRefundInner>>,
}

impl Default for RecordingRefund {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRefund {
    /// A recorder with no calls, answering with success.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RecordingRefundInner {
                calls: Vec::new(),
                failure: None,
            })),
        }
    }

    /// Fail every call with gateway `code` and `message`.
    pub fn with_failure(self, code: &str, message: &str) -> Self {
        self.inner.write().unwrap().failure = Some((code.to_string(), message.to_string()));
        self
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Every recorded call, oldest first.
    pub fn calls(&self) -> Vec<RecordedRefund> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.inner.read().unwrap().calls.len()
    }

    /// The single recorded call. Panics unless exactly one was made.
    pub fn only_call(&self) -> RecordedRefund {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one refund call");
        calls[0].clone()
    }
}

#[async_trait]
impl RefundCall for RecordingRefund {
    async fn refund(
        &self,
        identity: &Identity,
        private_key: &PrivateKey,
        method: ApiMethod,
        params: RefundParams,
    ) -> GatewayResult<GatewayResponse> {
        let refund_fee = params.refund_amount.clone();
        let failure = {
            let mut inner = self.inner.write().unwrap();
            inner.calls.push(RecordedRefund {
                identity: identity.clone(),
                private_key: private_key.clone(),
                method,
                params,
            });
            inner.failure.clone()
        };
        if let Some((code, message)) = failure {
            return Err(GatewayError::Gateway {
                code,
                sub_code: None,
                message,
            });
        }
        let body = MockTransport::success_body(method, &[("refund_fee", refund_fee.as_str())]);
        validate_response(body.as_bytes(), method)
    }
}
