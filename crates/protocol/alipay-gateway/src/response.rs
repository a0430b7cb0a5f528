//! Response validation and error mapping.
//!
//! A gateway reply looks like
//!
//! ```json
//! {
//!   "alipay_trade_refund_response": {"code": "10000", "msg": "Success", ...},
//!   "sign": "..."
//! }
//! ```
//!
//! The body is parsed from bytes as UTF-8 JSON, so non-ASCII messages are
//! never re-decoded through a platform encoding.

use std::collections::HashMap;

use alipay_crypto::{verify, PublicKey, SignType, SIGN_FIELD};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::types::{ApiMethod, ERROR_RESPONSE_KEY, SUCCESS_CODE};

/// A successful gateway reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    method: ApiMethod,
    payload: Map<String, Value>,
    signature_verified: Option<bool>,
}

impl GatewayResponse {
    /// The invoked operation.
    pub fn method(&self) -> ApiMethod {
        self.method
    }

    /// The `<method>_response` object.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// A string field of the payload.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Outcome of the response signature check. `None` when the check is
    /// disabled or the gateway sent no signature.
    pub fn signature_verified(&self) -> Option<bool> {
        self.signature_verified
    }

    /// Take the payload.
    pub fn into_payload(self) -> Map<String, Value> {
        self.payload
    }
}

/// Top-level members of a reply, values kept as raw JSON text.
struct Envelope<'a> {
    fields: HashMap<String, &'a RawValue>,
}

impl<'a> Envelope<'a> {
    fn parse(raw: &'a [u8]) -> GatewayResult<Self> {
        let fields: HashMap<String, &'a RawValue> = serde_json::from_slice(raw)
            .map_err(|e| GatewayError::malformed(format!("response is not a JSON object: {}", e)))?;
        Ok(Self { fields })
    }

    /// The response object of `method`, falling back to `error_response`.
    fn body(&self, method: ApiMethod) -> GatewayResult<&'a RawValue> {
        let key = method.response_key();
        self.fields
            .get(&key)
            .or_else(|| self.fields.get(ERROR_RESPONSE_KEY))
            .copied()
            .ok_or_else(|| GatewayError::malformed(format!("missing `{}`", key)))
    }

    fn signature(&self) -> Option<String> {
        self.fields
            .get(SIGN_FIELD)
            .and_then(|raw| serde_json::from_str::<String>(raw.get()).ok())
    }
}

/// Parse a reply and map its status code.
///
/// Returns the payload when `code` is `10000`; otherwise a
/// [`GatewayError::Gateway`] carrying `code`, `sub_code` and `sub_msg`
/// (or `msg`) verbatim.
pub fn validate_response(raw: &[u8], method: ApiMethod) -> GatewayResult<GatewayResponse> {
    let envelope = Envelope::parse(raw)?;
    let body = envelope.body(method)?;
    let payload = parse_payload(body)?;
    check_code(method, payload)
}

/// Like [`validate_response`], also checking the gateway's signature over
/// the raw response object text.
///
/// A signature mismatch does not fail the call; it is reported through
/// [`GatewayResponse::signature_verified`].
pub fn validate_signed_response(
    raw: &[u8],
    method: ApiMethod,
    gateway_public_key: &PublicKey,
    sign_type: SignType,
) -> GatewayResult<GatewayResponse> {
    let envelope = Envelope::parse(raw)?;
    let body = envelope.body(method)?;
    let verified = envelope
        .signature()
        .map(|signature| verify(body.get().as_bytes(), &signature, gateway_public_key, sign_type));
    if verified == Some(false) {
        warn!(method = %method, "Gateway response signature did not verify");
    }

    let payload = parse_payload(body)?;
    let mut response = check_code(method, payload)?;
    response.signature_verified = verified;
    Ok(response)
}

fn parse_payload(body: &RawValue) -> GatewayResult<Map<String, Value>> {
    serde_json::from_str(body.get())
        .map_err(|e| GatewayError::malformed(format!("response object is not a JSON object: {}", e)))
}

fn check_code(method: ApiMethod, payload: Map<String, Value>) -> GatewayResult<GatewayResponse> {
    let code = payload
        .get("code")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::malformed("response object has no `code`"))?;

    if code == SUCCESS_CODE {
        info!(method = %method, "Gateway call succeeded");
        return Ok(GatewayResponse {
            method,
            payload,
            signature_verified: None,
        });
    }

    let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);
    let sub_code = text("sub_code");
    let message = text("sub_msg").or_else(|| text("msg")).unwrap_or_default();
    warn!(
        method = %method,
        code = %code,
        sub_code = ?sub_code,
        "Gateway call failed"
    );
    Err(GatewayError::Gateway {
        code: code.to_string(),
        sub_code,
        message,
    })
}
