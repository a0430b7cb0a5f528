//! Client for the Alipay open gateway.
//!
//! Builds signed requests, sends them to the gateway and maps the replies
//! into typed results. Signing primitives live in [`alipay_crypto`].
//!
//! # Overview
//!
//! - **Auth modes**: app mode (`app_id`, open API) and web mode (`partner`)
//! - **Refunds**: [`AlipayClient::refund_app_order`],
//!   [`AlipayClient::refund_wap_order`] and [`AlipayClient::refund_web_order`]
//!   all end in one [`RefundCall`]
//! - **Queries**: [`AlipayClient::query_order`]
//! - **Payment orders**: signed app order strings and wap/page pay URLs
//! - **Notifications**: [`AlipayClient::verify_notification`]
//!
//! # Architecture
//!
//! ```text
//! AlipayClient ──► RefundCall (trait)
//!      │              └─ Gateway
//!      │                   │
//!      │                   ├─ RequestBuilder ──► SignedRequest
//!      │                   ├─ Transport (trait)
//!      │                   │    └─ HttpTransport
//!      │                   └─ validate_response
//!      ▼
//! Credentials (loaded once, shared)
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use alipay_gateway::{AlipayClient, ClientConfig};
//! use std::path::Path;
//!
//! # async fn example() -> alipay_gateway::GatewayResult<()> {
//! let config = ClientConfig::load(Path::new("alipay.toml"))?;
//! let client = AlipayClient::new(config)?;
//!
//! match client.refund_wap_order("20240101000001", "12.50", None).await {
//!     Ok(response) => println!("refund accepted: {:?}", response.payload()),
//!     Err(e) if e.code().is_some() => println!("refused: {} ({})", e, e.suggestion()),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod gateway;
mod refund;
mod request;
mod response;
mod transport;
mod types;

pub use client::AlipayClient;
pub use config::{AuthMode, ClientConfig, Credentials, KeyPaths};
pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use refund::RefundCall;
pub use request::{gateway_now, RequestBuilder, SignedRequest};
pub use response::{validate_response, validate_signed_response, GatewayResponse};
pub use transport::{HttpTransport, Transport};
pub use types::{
    to_biz_content, Amount, ApiMethod, BizContent, Identity, PayParams, QueryParams, RefundChannel,
    RefundParams, API_VERSION, CHARSET, ERROR_RESPONSE_KEY, GATEWAY_URL, SANDBOX_GATEWAY_URL,
    SUCCESS_CODE, TIMESTAMP_FORMAT, WEB_GATEWAY_URL,
};

// Signing primitives, re-exported for callers that only depend on this crate.
pub use alipay_crypto::{canonicalize, sign, verify, CryptoError, Params, PrivateKey, PublicKey, SignType};
