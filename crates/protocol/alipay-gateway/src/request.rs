//! Request construction and signing.
//!
//! A request is the business parameters plus the common parameters of the
//! auth mode, signed over its canonical form:
//!
//! | | App mode | Web mode |
//! |---|---|---|
//! | identity | `app_id` | `partner` |
//! | operation | `method` | `service` |
//! | charset | `charset` | `_input_charset` |
//! | version | `version=1.0` | (none) |
//! | business params | JSON in `biz_content` | flattened |
//!
//! Both modes send `sign_type`, `timestamp`, and `notify_url` /
//! `return_url` when configured.

use alipay_crypto::{sign, Params, PrivateKey, SignType, SIGN_FIELD};
use chrono::{NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::types::{ApiMethod, BizContent, Identity, API_VERSION, CHARSET, TIMESTAMP_FORMAT};

/// Protocol fields of a web-mode request; business parameters may not
/// carry these names once flattened.
const RESERVED_WEB_FIELDS: &[&str] = &[
    "partner",
    "service",
    "_input_charset",
    "sign_type",
    "timestamp",
    "notify_url",
    "return_url",
    SIGN_FIELD,
];

/// Current gateway local time (UTC+8).
pub fn gateway_now() -> NaiveDateTime {
    Utc::now().naive_utc() + TimeDelta::hours(8)
}

/// Builds and signs requests for one identity.
#[derive(Debug, Clone)]
pub struct RequestBuilder<'a> {
    identity: &'a Identity,
    private_key: &'a PrivateKey,
    sign_type: SignType,
    notify_url: Option<&'a str>,
    return_url: Option<&'a str>,
    timestamp: Option<NaiveDateTime>,
}

impl<'a> RequestBuilder<'a> {
    /// A builder signing as `identity` with `private_key`.
    pub fn new(identity: &'a Identity, private_key: &'a PrivateKey, sign_type: SignType) -> Self {
        Self {
            identity,
            private_key,
            sign_type,
            notify_url: None,
            return_url: None,
            timestamp: None,
        }
    }

    /// Set the asynchronous notification URL.
    pub fn notify_url(mut self, url: Option<&'a str>) -> Self {
        self.notify_url = url;
        self
    }

    /// Set the URL the payer's browser returns to.
    pub fn return_url(mut self, url: Option<&'a str>) -> Self {
        self.return_url = url;
        self
    }

    /// Pin the request timestamp instead of using the current time.
    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Assemble the unsigned parameter set.
    pub fn params(&self, method: ApiMethod, biz: &BizContent) -> GatewayResult<Params> {
        let timestamp = self.timestamp.unwrap_or_else(gateway_now);

        let mut params = Params::new();
        params.insert(self.identity.field(), self.identity.value());
        params.insert("sign_type", self.sign_type.as_str());
        params.insert("timestamp", timestamp.format(TIMESTAMP_FORMAT));
        params.insert_opt("notify_url", self.notify_url);
        params.insert_opt("return_url", self.return_url);

        match self.identity {
            Identity::AppId(_) => {
                params.insert("method", method.as_str());
                params.insert("charset", CHARSET);
                params.insert("version", API_VERSION);
                let biz_content = serde_json::to_string(biz)
                    .map_err(|e| GatewayError::invalid_request(e.to_string()))?;
                params.insert("biz_content", biz_content);
            }
            Identity::Partner(_) => {
                params.insert("service", method.as_str());
                params.insert("_input_charset", CHARSET);
                for (key, value) in biz {
                    if RESERVED_WEB_FIELDS.contains(&key.as_str()) {
                        return Err(GatewayError::invalid_request(format!(
                            "business parameter `{}` collides with a protocol field",
                            key
                        )));
                    }
                    match value {
                        Value::Null => {}
                        Value::String(s) => {
                            params.insert(key.as_str(), s);
                        }
                        other => {
                            params.insert(key.as_str(), other);
                        }
                    }
                }
            }
        }
        Ok(params)
    }

    /// Assemble, canonicalize and sign a request.
    pub fn build(&self, method: ApiMethod, biz: &BizContent) -> GatewayResult<SignedRequest> {
        let mut params = self.params(method, biz)?;
        params.remove(SIGN_FIELD);
        let signature = sign(&params.canonical_bytes(), self.private_key, self.sign_type)?;
        params.insert(SIGN_FIELD, signature);
        Ok(SignedRequest { method, params })
    }
}

/// A request carrying its `sign` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    method: ApiMethod,
    params: Params,
}

impl SignedRequest {
    /// The operation this request invokes.
    pub fn method(&self) -> ApiMethod {
        self.method
    }

    /// All parameters, `sign` included.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The base64 signature.
    pub fn signature(&self) -> &str {
        self.params.get(SIGN_FIELD).unwrap_or_default()
    }

    /// The exact bytes the signature covers.
    pub fn signed_content(&self) -> Vec<u8> {
        self.params.canonical_bytes()
    }

    /// Percent-encoded `application/x-www-form-urlencoded` rendering, in
    /// canonical order with `sign` last.
    pub fn to_query_string(&self) -> GatewayResult<String> {
        let mut pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .filter(|(k, v)| *k != SIGN_FIELD && !v.is_empty())
            .collect();
        pairs.push((SIGN_FIELD, self.signature()));
        serde_urlencoded::to_string(pairs).map_err(|e| GatewayError::invalid_request(e.to_string()))
    }

    /// Full GET URL against `gateway`.
    pub fn to_url(&self, gateway: &str) -> GatewayResult<String> {
        Ok(format!("{}?{}", gateway, self.to_query_string()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{to_biz_content, RefundParams};
    use alipay_crypto::verify;
    use alipay_test_utils::fixtures;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    fn app_key() -> PrivateKey {
        PrivateKey::from_pem(fixtures::APP_PRIVATE_KEY).unwrap()
    }

    fn refund_biz() -> BizContent {
        to_biz_content(&RefundParams::new("test_ouit_trade_no", 0.01).with_reason("中文测试")).unwrap()
    }

    #[test]
    fn test_app_mode_params() {
        let identity = Identity::AppId("appid".into());
        let key = app_key();
        let builder = RequestBuilder::new(&identity, &key, SignType::Rsa)
            .notify_url(Some("http://example.com/app_notify_url"))
            .timestamp(fixed_time());

        let params = builder.params(ApiMethod::TradeRefund, &refund_biz()).unwrap();
        assert_eq!(params.get("app_id"), Some("appid"));
        assert_eq!(params.get("method"), Some("alipay.trade.refund"));
        assert_eq!(params.get("charset"), Some("utf-8"));
        assert_eq!(params.get("version"), Some("1.0"));
        assert_eq!(params.get("sign_type"), Some("RSA"));
        assert_eq!(params.get("timestamp"), Some("2024-01-02 03:04:05"));
        assert_eq!(params.get("notify_url"), Some("http://example.com/app_notify_url"));
        assert_eq!(
            params.get("biz_content"),
            Some(r#"{"out_trade_no":"test_ouit_trade_no","refund_amount":"0.01","refund_reason":"中文测试"}"#)
        );
        assert!(!params.contains_key("partner"));
        assert!(!params.contains_key("return_url"));
    }

    #[test]
    fn test_web_mode_params() {
        let identity = Identity::Partner("partner".into());
        let key = app_key();
        let builder = RequestBuilder::new(&identity, &key, SignType::Rsa2).timestamp(fixed_time());

        let params = builder.params(ApiMethod::TradePageRefund, &refund_biz()).unwrap();
        assert_eq!(params.get("partner"), Some("partner"));
        assert_eq!(params.get("service"), Some("alipay.trade.page.refund"));
        assert_eq!(params.get("_input_charset"), Some("utf-8"));
        assert_eq!(params.get("refund_amount"), Some("0.01"));
        assert_eq!(params.get("refund_reason"), Some("中文测试"));
        assert!(!params.contains_key("biz_content"));
        assert!(!params.contains_key("method"));
        assert!(!params.contains_key("notify_url"));
    }

    #[test]
    fn test_web_mode_rejects_reserved_business_keys() {
        let identity = Identity::Partner("partner".into());
        let key = app_key();
        let builder = RequestBuilder::new(&identity, &key, SignType::Rsa2).timestamp(fixed_time());

        for reserved in ["partner", "sign_type", "timestamp", "service", "notify_url", "sign"] {
            let mut biz = refund_biz();
            biz.insert(reserved.to_string(), Value::String("someone_else".into()));
            let err = builder.build(ApiMethod::TradePageRefund, &biz).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidRequest(_)), "{}", reserved);
            assert!(err.to_string().contains(reserved));
        }
    }

    #[test]
    fn test_web_mode_declared_sign_type_matches_digest() {
        let identity = Identity::Partner("partner".into());
        let key = app_key();
        let request = RequestBuilder::new(&identity, &key, SignType::Rsa2)
            .timestamp(fixed_time())
            .build(ApiMethod::TradePageRefund, &refund_biz())
            .unwrap();

        assert_eq!(request.params().get("partner"), Some("partner"));
        assert_eq!(request.params().get("sign_type"), Some("RSA2"));
        let content = request.signed_content();
        assert!(verify(&content, request.signature(), &key.public_key(), SignType::Rsa2));
        assert!(!verify(&content, request.signature(), &key.public_key(), SignType::Rsa));
    }

    #[test]
    fn test_app_mode_keeps_business_keys_in_biz_content() {
        let identity = Identity::AppId("appid".into());
        let key = app_key();
        let mut biz = refund_biz();
        biz.insert("sign_type".into(), Value::String("RSA".into()));
        let params = RequestBuilder::new(&identity, &key, SignType::Rsa2)
            .timestamp(fixed_time())
            .params(ApiMethod::TradeRefund, &biz)
            .unwrap();

        assert_eq!(params.get("sign_type"), Some("RSA2"));
        assert!(params.get("biz_content").unwrap().contains(r#""sign_type":"RSA""#));
    }

    #[test]
    fn test_signature_covers_canonical_params() {
        let identity = Identity::AppId("appid".into());
        let key = app_key();
        let request = RequestBuilder::new(&identity, &key, SignType::Rsa2)
            .timestamp(fixed_time())
            .build(ApiMethod::TradeRefund, &refund_biz())
            .unwrap();

        let unsigned = RequestBuilder::new(&identity, &key, SignType::Rsa2)
            .timestamp(fixed_time())
            .params(ApiMethod::TradeRefund, &refund_biz())
            .unwrap();
        assert_eq!(request.signed_content(), unsigned.canonical_bytes());
        assert!(verify(
            &request.signed_content(),
            request.signature(),
            &key.public_key(),
            SignType::Rsa2
        ));
    }

    #[test]
    fn test_query_string_encoding() {
        let identity = Identity::AppId("appid".into());
        let key = app_key();
        let request = RequestBuilder::new(&identity, &key, SignType::Rsa2)
            .notify_url(Some("http://example.com/n?a=1"))
            .timestamp(fixed_time())
            .build(ApiMethod::TradeRefund, &refund_biz())
            .unwrap();

        let query = request.to_query_string().unwrap();
        assert!(query.starts_with("app_id=appid&biz_content=%7B"));
        assert!(query.contains("notify_url=http%3A%2F%2Fexample.com%2Fn%3Fa%3D1"));
        assert!(query.contains("timestamp=2024-01-02+03%3A04%3A05"));
        assert!(!query.contains("中文"));

        // `sign` goes last, whatever its sort position
        let (_, last) = query.rsplit_once('&').unwrap();
        assert!(last.starts_with("sign="));

        let decoded: Vec<(String, String)> = serde_urlencoded::from_str(&query).unwrap();
        let decoded: Params = decoded.into_iter().collect();
        assert_eq!(&decoded, request.params());
    }

    #[test]
    fn test_to_url() {
        let identity = Identity::AppId("appid".into());
        let key = app_key();
        let request = RequestBuilder::new(&identity, &key, SignType::Rsa2)
            .build(ApiMethod::TradeQuery, &BizContent::new())
            .unwrap();
        let url = request.to_url("https://openapi.alipay.com/gateway.do").unwrap();
        assert!(url.starts_with("https://openapi.alipay.com/gateway.do?app_id=appid&"));
    }

    #[test]
    fn test_gateway_now_format() {
        let rendered = gateway_now().format(TIMESTAMP_FORMAT).to_string();
        assert_eq!(rendered.len(), "2024-01-02 03:04:05".len());
    }
}
