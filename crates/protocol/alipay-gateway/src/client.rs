//! The public client.

use std::sync::Arc;

use alipay_crypto::{canonicalize, sign, verify, PrivateKey, PublicKey, SignType, SIGN_FIELD};
use tracing::info;

use crate::config::{ClientConfig, Credentials};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;
use crate::refund::RefundCall;
use crate::response::GatewayResponse;
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    to_biz_content, Amount, ApiMethod, BizContent, Identity, PayParams, QueryParams, RefundChannel,
    RefundParams,
};

const APP_PAY_PRODUCT: &str = "QUICK_MSECURITY_PAY";
const WAP_PAY_PRODUCT: &str = "QUICK_WAP_WAY";
const PAGE_PAY_PRODUCT: &str = "FAST_INSTANT_TRADE_PAY";

/// Client for the Alipay open gateway.
///
/// Cheap to clone; clones share the loaded credentials, which never change
/// after construction.
///
/// # Example
///
/// ```rust,no_run
/// use alipay_gateway::{AlipayClient, ClientConfig, KeyPaths};
///
/// # async fn example() -> alipay_gateway::GatewayResult<()> {
/// let config = ClientConfig::app(
///     "2021000000000000",
///     KeyPaths::new("keys/app_private_key.pem", "keys/alipay_public_key.pem"),
/// )
/// .with_notify_url("https://example.com/alipay/notify");
///
/// let client = AlipayClient::new(config)?;
/// let response = client
///     .refund_app_order("20240101000001", "0.01", Some("out of stock"))
///     .await?;
/// println!("refunded {:?}", response.get_str("refund_fee"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AlipayClient {
    credentials: Arc<Credentials>,
    gateway: Gateway,
    refunder: Arc<dyn RefundCall>,
}

impl AlipayClient {
    /// Create a client talking HTTP to the configured endpoint.
    pub fn new(config: ClientConfig) -> GatewayResult<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> GatewayResult<Self> {
        let credentials = Arc::new(config.resolve()?);
        let gateway = Gateway::new(&config, Arc::clone(&credentials), transport);
        info!(
            mode = config.auth.name(),
            identity = %credentials.identity,
            sign_type = %config.sign_type,
            endpoint = %gateway.endpoint(),
            "Alipay client ready"
        );
        Ok(Self {
            credentials,
            refunder: Arc::new(gateway.clone()),
            gateway,
        })
    }

    /// Replace the signed-refund implementation.
    pub fn with_refund_call(mut self, refunder: Arc<dyn RefundCall>) -> Self {
        self.refunder = refunder;
        self
    }

    // =========================================================================
    // Identity and keys
    // =========================================================================

    /// The identity requests are made as.
    pub fn identity(&self) -> &Identity {
        &self.credentials.identity
    }

    /// The application id, in app mode.
    pub fn app_id(&self) -> Option<&str> {
        match &self.credentials.identity {
            Identity::AppId(id) => Some(id),
            Identity::Partner(_) => None,
        }
    }

    /// The partner id, in web mode.
    pub fn partner(&self) -> Option<&str> {
        match &self.credentials.identity {
            Identity::Partner(id) => Some(id),
            Identity::AppId(_) => None,
        }
    }

    /// The key requests are signed with.
    pub fn private_key(&self) -> &PrivateKey {
        &self.credentials.private_key
    }

    /// The caller's own public key, when configured.
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.credentials.public_key.as_ref()
    }

    /// The gateway's public key.
    pub fn gateway_public_key(&self) -> &PublicKey {
        &self.credentials.gateway_public_key
    }

    /// The configured sign type.
    pub fn sign_type(&self) -> SignType {
        self.gateway.sign_type()
    }

    /// The endpoint requests go to.
    pub fn endpoint(&self) -> &str {
        self.gateway.endpoint()
    }

    /// Sign arbitrary content with the caller's private key.
    pub fn sign(&self, content: &[u8]) -> GatewayResult<String> {
        Ok(sign(content, &self.credentials.private_key, self.sign_type())?)
    }

    /// Verify a gateway signature over arbitrary content.
    pub fn verify(&self, content: &[u8], signature: &str) -> bool {
        verify(
            content,
            signature,
            &self.credentials.gateway_public_key,
            self.sign_type(),
        )
    }

    fn require_app(&self, operation: &str) -> GatewayResult<&Identity> {
        match &self.credentials.identity {
            identity @ Identity::AppId(_) => Ok(identity),
            Identity::Partner(_) => Err(GatewayError::config(format!(
                "{} requires an app-mode client",
                operation
            ))),
        }
    }

    fn require_web(&self, operation: &str) -> GatewayResult<&Identity> {
        match &self.credentials.identity {
            identity @ Identity::Partner(_) => Ok(identity),
            Identity::AppId(_) => Err(GatewayError::config(format!(
                "{} requires a web-mode (partner) client",
                operation
            ))),
        }
    }

    // =========================================================================
    // Refunds
    // =========================================================================

    /// Refund a trade paid through the in-app flow.
    pub async fn refund_app_order(
        &self,
        out_trade_no: &str,
        refund_amount: impl Into<Amount>,
        refund_reason: Option<&str>,
    ) -> GatewayResult<GatewayResponse> {
        let params = refund_params(out_trade_no, refund_amount, refund_reason);
        self.refund(RefundChannel::App, params).await
    }

    /// Refund a trade paid through the mobile web flow.
    pub async fn refund_wap_order(
        &self,
        out_trade_no: &str,
        refund_amount: impl Into<Amount>,
        refund_reason: Option<&str>,
    ) -> GatewayResult<GatewayResponse> {
        let params = refund_params(out_trade_no, refund_amount, refund_reason);
        self.refund(RefundChannel::Wap, params).await
    }

    /// Refund a trade paid through the desktop web flow (partner mode).
    pub async fn refund_web_order(
        &self,
        out_trade_no: &str,
        refund_amount: impl Into<Amount>,
        refund_reason: Option<&str>,
    ) -> GatewayResult<GatewayResponse> {
        let params = refund_params(out_trade_no, refund_amount, refund_reason);
        self.refund(RefundChannel::Web, params).await
    }

    /// Refund through `channel` with full refund parameters.
    ///
    /// App and wap refunds need an app-mode client, web refunds a
    /// partner-mode client.
    pub async fn refund(
        &self,
        channel: RefundChannel,
        params: RefundParams,
    ) -> GatewayResult<GatewayResponse> {
        let identity = match channel {
            RefundChannel::App => self.require_app("app refund")?,
            RefundChannel::Wap => self.require_app("wap refund")?,
            RefundChannel::Web => self.require_web("web refund")?,
        };
        self.refunder
            .refund(identity, &self.credentials.private_key, channel.method(), params)
            .await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Query a trade by merchant order number or gateway trade number.
    pub async fn query_order(&self, query: QueryParams) -> GatewayResult<GatewayResponse> {
        let identity = self.require_app("trade query")?;
        if query.out_trade_no.is_none() && query.trade_no.is_none() {
            return Err(GatewayError::invalid_request(
                "trade query needs out_trade_no or trade_no",
            ));
        }
        let biz = biz_content(&query)?;
        self.gateway
            .execute(identity, &self.credentials.private_key, ApiMethod::TradeQuery, &biz)
            .await
    }

    // =========================================================================
    // Payment orders (signed locally, sent by the payer)
    // =========================================================================

    /// Signed order string handed to the mobile SDK for in-app payment.
    pub fn app_pay_order_string(&self, order: PayParams) -> GatewayResult<String> {
        let identity = self.require_app("app payment")?;
        let biz = biz_content(&order.or_product_code(APP_PAY_PRODUCT))?;
        self.gateway
            .sign_request(identity, &self.credentials.private_key, ApiMethod::TradeAppPay, &biz, None)?
            .to_query_string()
    }

    /// Gateway URL a mobile browser is redirected to.
    pub fn wap_pay_url(&self, order: PayParams, return_url: Option<&str>) -> GatewayResult<String> {
        let identity = self.require_app("wap payment")?;
        let biz = biz_content(&order.or_product_code(WAP_PAY_PRODUCT))?;
        self.gateway
            .sign_request(
                identity,
                &self.credentials.private_key,
                ApiMethod::TradeWapPay,
                &biz,
                return_url,
            )?
            .to_url(self.gateway.endpoint())
    }

    /// Gateway URL a desktop browser is redirected to. Works in both modes.
    pub fn page_pay_url(&self, order: PayParams, return_url: Option<&str>) -> GatewayResult<String> {
        let biz = biz_content(&order.or_product_code(PAGE_PAY_PRODUCT))?;
        self.gateway
            .sign_request(
                &self.credentials.identity,
                &self.credentials.private_key,
                ApiMethod::TradePagePay,
                &biz,
                return_url,
            )?
            .to_url(self.gateway.endpoint())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Verify an asynchronous notification's parameters.
    ///
    /// `sign` and `sign_type` are left out of the signed content. Returns
    /// `false` when the notification carries no signature.
    pub fn verify_notification<I, K, V>(&self, params: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut signature = None;
        let mut signed = Vec::new();
        for (key, value) in params {
            match key.as_ref() {
                SIGN_FIELD => signature = Some(value.as_ref().to_string()),
                "sign_type" => {}
                _ => signed.push((key, value)),
            }
        }
        let Some(signature) = signature else {
            return false;
        };
        self.verify(canonicalize(signed).as_bytes(), &signature)
    }
}

impl std::fmt::Debug for AlipayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlipayClient")
            .field("identity", &self.credentials.identity)
            .field("gateway", &self.gateway)
            .finish()
    }
}

fn refund_params(
    out_trade_no: &str,
    refund_amount: impl Into<Amount>,
    refund_reason: Option<&str>,
) -> RefundParams {
    let params = RefundParams::new(out_trade_no, refund_amount);
    match refund_reason {
        Some(reason) => params.with_reason(reason),
        None => params,
    }
}

fn biz_content<T: serde::Serialize>(params: &T) -> GatewayResult<BizContent> {
    to_biz_content(params).map_err(|e| GatewayError::invalid_request(e.to_string()))
}
