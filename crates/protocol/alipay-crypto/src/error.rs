//! Error types for alipay-crypto

use thiserror::Error;

/// Result alias for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while loading keys or signing.
///
/// Verification never produces one of these: a signature that does not
/// match is reported as `false` by [`crate::verify`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material could not be parsed
    #[error("Invalid RSA key: {0}")]
    InvalidKey(String),

    /// Key file could not be read
    #[error("Cannot read key file {path}: {reason}")]
    KeyFile { path: String, reason: String },

    /// Sign type string is neither `RSA` nor `RSA2`
    #[error("Unsupported sign type: {0}")]
    UnsupportedSignType(String),

    /// Refusing to sign an empty payload
    #[error("Cannot sign empty content")]
    EmptyContent,

    /// The RSA primitive rejected the operation
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
