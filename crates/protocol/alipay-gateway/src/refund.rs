//! The signed-refund seam.
//!
//! Every refund entry point of [`AlipayClient`](crate::AlipayClient) ends in
//! a single [`RefundCall::refund`]. The default implementation is
//! [`Gateway`]; tests substitute a recording fake to check what the entry
//! points forward.

use alipay_crypto::PrivateKey;
use async_trait::async_trait;
use tracing::info;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;
use crate::response::GatewayResponse;
use crate::types::{to_biz_content, ApiMethod, Identity, RefundParams};

/// Performs a signed refund.
#[async_trait]
pub trait RefundCall: Send + Sync {
    /// Refund as `identity`, signing with `private_key`.
    async fn refund(
        &self,
        identity: &Identity,
        private_key: &PrivateKey,
        method: ApiMethod,
        params: RefundParams,
    ) -> GatewayResult<GatewayResponse>;
}

#[async_trait]
impl RefundCall for Gateway {
    async fn refund(
        &self,
        identity: &Identity,
        private_key: &PrivateKey,
        method: ApiMethod,
        params: RefundParams,
    ) -> GatewayResult<GatewayResponse> {
        let biz = to_biz_content(&params).map_err(|e| GatewayError::invalid_request(e.to_string()))?;
        info!(
            method = %method,
            out_trade_no = %params.out_trade_no,
            refund_amount = %params.refund_amount,
            "Submitting refund"
        );
        self.execute(identity, private_key, method, &biz).await
    }
}
