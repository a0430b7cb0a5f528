//! Error types for gateway calls.

use alipay_crypto::CryptoError;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced to callers of the gateway client.
///
/// Signature verification mismatches are not errors; they are reported as
/// booleans by the verifying methods.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing identity or key material for the selected auth mode, or an
    /// operation invoked on a client of the other mode.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/HTTP failure talking to the gateway.
    #[error("gateway transport error: {0}")]
    Transport(String),

    /// Local signing failed.
    #[error("signing failed: {0}")]
    Signature(#[from] CryptoError),

    /// The gateway answered with a non-success status code.
    #[error("gateway returned {code}: {message}")]
    Gateway {
        /// Status code, e.g. `40004`
        code: String,
        /// Detailed code, e.g. `ACQ.TRADE_NOT_EXIST`
        sub_code: Option<String>,
        /// `sub_msg` (or `msg` when absent), verbatim
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),

    /// Business parameters could not be encoded into a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GatewayError {
    /// Create a new Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new MalformedResponse error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a new InvalidRequest error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// The gateway status code, for `Gateway` errors.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Gateway { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The gateway detail code, for `Gateway` errors that carry one.
    pub fn sub_code(&self) -> Option<&str> {
        match self {
            Self::Gateway { sub_code, .. } => sub_code.as_deref(),
            _ => None,
        }
    }

    /// The gateway message, for `Gateway` errors.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Gateway { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the failure happened before anything reached the gateway.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Signature(_) | Self::InvalidRequest(_) | Self::Io(_) | Self::Toml(_)
        )
    }

    /// Whether a later attempt could succeed unchanged.
    ///
    /// The client never retries on its own; money-moving calls are not
    /// idempotent unless the caller reuses `out_request_no`.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Config(_) => "Check the identity and key paths for the configured auth mode",
            Self::Transport(_) => "Check connectivity; query the trade before repeating a refund",
            Self::Signature(_) => "Check that the private key is a valid RSA key",
            Self::Gateway { .. } => "See the gateway sub_code documentation",
            Self::MalformedResponse(_) => "Check the gateway URL and method",
            Self::InvalidRequest(_) => "Check the business parameters",
            Self::Io(_) | Self::Toml(_) => "Check the configuration file",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
