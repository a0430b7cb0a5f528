//! Gateway protocol types and constants.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status code the gateway uses for a successful call.
pub const SUCCESS_CODE: &str = "10000";

/// Open-platform gateway (app mode).
pub const GATEWAY_URL: &str = "https://openapi.alipay.com/gateway.do";

/// Legacy merchant gateway (partner mode).
pub const WEB_GATEWAY_URL: &str = "https://mapi.alipay.com/gateway.do";

/// Sandbox gateway, shared by both modes.
pub const SANDBOX_GATEWAY_URL: &str = "https://openapi.alipaydev.com/gateway.do";

/// Protocol version sent in the `version` parameter.
pub const API_VERSION: &str = "1.0";

/// Charset of every request.
pub const CHARSET: &str = "utf-8";

/// Layout of the `timestamp` parameter (gateway local time, UTC+8).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Response object name used by the gateway for request-level failures.
pub const ERROR_RESPONSE_KEY: &str = "error_response";

/// Business parameters before they are placed into a request.
pub type BizContent = Map<String, Value>;

// =============================================================================
// Identity
// =============================================================================

/// The caller identity a request is made under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Open-platform application id (app mode).
    AppId(String),
    /// Merchant partner id (web mode).
    Partner(String),
}

impl Identity {
    /// The identity value.
    pub fn value(&self) -> &str {
        match self {
            Self::AppId(v) | Self::Partner(v) => v,
        }
    }

    /// Name of the request parameter carrying the identity.
    pub fn field(&self) -> &'static str {
        match self {
            Self::AppId(_) => "app_id",
            Self::Partner(_) => "partner",
        }
    }

    /// Whether this is an app-mode identity.
    pub fn is_app(&self) -> bool {
        matches!(self, Self::AppId(_))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.field(), self.value())
    }
}

// =============================================================================
// API methods
// =============================================================================

/// Gateway operations this client can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// In-app payment order string
    TradeAppPay,
    /// Mobile web payment page
    TradeWapPay,
    /// Desktop web payment page
    TradePagePay,
    /// Trade status query
    TradeQuery,
    /// Refund of an app-flow trade
    TradeRefund,
    /// Refund of a wap/web-flow trade
    TradePageRefund,
}

impl ApiMethod {
    /// The method identifier sent in `method` (app mode) or `service` (web mode).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TradeAppPay => "alipay.trade.app.pay",
            Self::TradeWapPay => "alipay.trade.wap.pay",
            Self::TradePagePay => "alipay.trade.page.pay",
            Self::TradeQuery => "alipay.trade.query",
            Self::TradeRefund => "alipay.trade.refund",
            Self::TradePageRefund => "alipay.trade.page.refund",
        }
    }

    /// Key of the response object, e.g. `alipay_trade_refund_response`.
    pub fn response_key(&self) -> String {
        format!("{}_response", self.as_str().replace('.', "_"))
    }
}

impl std::fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a refunded trade originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefundChannel {
    /// Paid through the in-app flow
    App,
    /// Paid through the mobile web flow
    Wap,
    /// Paid through the desktop web flow
    Web,
}

impl RefundChannel {
    /// The refund method for trades from this channel.
    pub fn method(&self) -> ApiMethod {
        match self {
            Self::App => ApiMethod::TradeRefund,
            Self::Wap | Self::Web => ApiMethod::TradePageRefund,
        }
    }
}

// =============================================================================
// Business parameters
// =============================================================================

/// A money amount in yuan.
///
/// Strings pass through verbatim. Floats are rounded to whole fen (two
/// decimal places), so binary rounding noise never reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    /// The amount as sent.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<f64> for Amount {
    fn from(yuan: f64) -> Self {
        Self(format!("{:.2}", yuan))
    }
}

impl From<&str> for Amount {
    fn from(yuan: &str) -> Self {
        Self(yuan.to_string())
    }
}

impl From<String> for Amount {
    fn from(yuan: String) -> Self {
        Self(yuan)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Business parameters of a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundParams {
    /// Merchant order number of the trade being refunded.
    pub out_trade_no: String,

    /// Amount to refund, in yuan.
    pub refund_amount: String,

    /// Free-form reason shown to the payer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,

    /// Idempotency key for partial refunds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_request_no: Option<String>,
}

impl RefundParams {
    /// Refund `refund_amount` of trade `out_trade_no`.
    pub fn new(out_trade_no: impl Into<String>, refund_amount: impl Into<Amount>) -> Self {
        Self {
            out_trade_no: out_trade_no.into(),
            refund_amount: refund_amount.into().into_string(),
            refund_reason: None,
            out_request_no: None,
        }
    }

    /// Attach a refund reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.refund_reason = Some(reason.into());
        self
    }

    /// Attach a partial-refund request number.
    pub fn with_request_no(mut self, out_request_no: impl Into<String>) -> Self {
        self.out_request_no = Some(out_request_no.into());
        self
    }
}

/// Business parameters of a trade query. One of the two numbers is required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryParams {
    /// Merchant order number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,

    /// Gateway trade number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_no: Option<String>,
}

impl QueryParams {
    /// Query by merchant order number.
    pub fn by_out_trade_no(out_trade_no: impl Into<String>) -> Self {
        Self {
            out_trade_no: Some(out_trade_no.into()),
            trade_no: None,
        }
    }

    /// Query by gateway trade number.
    pub fn by_trade_no(trade_no: impl Into<String>) -> Self {
        Self {
            out_trade_no: None,
            trade_no: Some(trade_no.into()),
        }
    }
}

/// Business parameters of a payment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayParams {
    /// Merchant order number.
    pub out_trade_no: String,

    /// Order amount, in yuan.
    pub total_amount: String,

    /// Order title.
    pub subject: String,

    /// Sales product code. Filled per payment flow when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    /// Order description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Payment deadline, e.g. `30m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_express: Option<String>,
}

impl PayParams {
    /// A payment of `total_amount` for order `out_trade_no`.
    pub fn new(
        out_trade_no: impl Into<String>,
        total_amount: impl Into<Amount>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            out_trade_no: out_trade_no.into(),
            total_amount: total_amount.into().into_string(),
            subject: subject.into(),
            product_code: None,
            body: None,
            timeout_express: None,
        }
    }

    /// Attach an order description.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a payment deadline.
    pub fn with_timeout_express(mut self, timeout: impl Into<String>) -> Self {
        self.timeout_express = Some(timeout.into());
        self
    }

    pub(crate) fn or_product_code(mut self, product_code: &str) -> Self {
        if self.product_code.is_none() {
            self.product_code = Some(product_code.to_string());
        }
        self
    }
}

/// Serialize business parameters into a JSON object.
pub fn to_biz_content<T: Serialize>(params: &T) -> Result<BizContent, serde_json::Error> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "business parameters must serialize to an object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_key() {
        assert_eq!(ApiMethod::TradeRefund.response_key(), "alipay_trade_refund_response");
        assert_eq!(
            ApiMethod::TradePageRefund.response_key(),
            "alipay_trade_page_refund_response"
        );
        assert_eq!(ApiMethod::TradeQuery.response_key(), "alipay_trade_query_response");
    }

    #[test]
    fn test_refund_channel_methods() {
        assert_eq!(RefundChannel::App.method(), ApiMethod::TradeRefund);
        assert_eq!(RefundChannel::Wap.method(), ApiMethod::TradePageRefund);
        assert_eq!(RefundChannel::Web.method(), ApiMethod::TradePageRefund);
    }

    #[test]
    fn test_identity_fields() {
        let app = Identity::AppId("2021".into());
        let web = Identity::Partner("2088".into());
        assert_eq!(app.field(), "app_id");
        assert_eq!(web.field(), "partner");
        assert_eq!(web.value(), "2088");
        assert!(app.is_app());
        assert_eq!(app.to_string(), "app_id=2021");
    }

    #[test]
    fn test_refund_params_biz_content() {
        let params = RefundParams::new("T1", 0.01).with_reason("中文测试");
        let biz = to_biz_content(&params).unwrap();
        assert_eq!(biz["out_trade_no"], "T1");
        assert_eq!(biz["refund_amount"], "0.01");
        assert_eq!(biz["refund_reason"], "中文测试");
        assert!(!biz.contains_key("out_request_no"));
    }

    #[test]
    fn test_float_amounts_rounded_to_fen() {
        assert_eq!(Amount::from(0.1 + 0.2).as_str(), "0.30");
        assert_eq!(Amount::from(0.01).as_str(), "0.01");
        assert_eq!(Amount::from(12.5).as_str(), "12.50");
        assert_eq!(Amount::from(100.0).to_string(), "100.00");

        let params = RefundParams::new("T1", 0.1 + 0.2);
        assert_eq!(params.refund_amount, "0.30");
        assert_eq!(PayParams::new("T1", 19.999, "book").total_amount, "20.00");
    }

    #[test]
    fn test_string_amounts_verbatim() {
        assert_eq!(Amount::from("0.1").as_str(), "0.1");
        assert_eq!(Amount::from(String::from("88.88")).into_string(), "88.88");
        assert_eq!(RefundParams::new("T1", "5").refund_amount, "5");
    }

    #[test]
    fn test_pay_params_product_code() {
        let params = PayParams::new("T1", "9.90", "book").or_product_code("QUICK_WAP_WAY");
        assert_eq!(params.product_code.as_deref(), Some("QUICK_WAP_WAY"));

        let mut explicit = PayParams::new("T1", "9.90", "book");
        explicit.product_code = Some("CUSTOM".into());
        let explicit = explicit.or_product_code("QUICK_WAP_WAY");
        assert_eq!(explicit.product_code.as_deref(), Some("CUSTOM"));
    }

    #[test]
    fn test_non_object_biz_rejected() {
        assert!(to_biz_content(&"just a string").is_err());
    }
}
