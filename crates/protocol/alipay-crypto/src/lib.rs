//! Signing primitives for the Alipay open gateway.
//!
//! The gateway authenticates every request by an RSA signature over a
//! canonical rendering of the request parameters, and signs its own
//! responses and notifications the same way. This crate provides:
//!
//! - **Canonical encoding**: `k1=v1&k2=v2` over byte-sorted keys, `sign` and
//!   empty values excluded
//! - **Sign types**: `RSA` (SHA-1) and `RSA2` (SHA-256), PKCS#1 v1.5
//! - **Signing**: base64 signatures, bit-identical to
//!   `openssl dgst -sha256 -sign key.pem | openssl base64 -A`
//! - **Verification**: boolean outcome, never an error
//! - **Keys**: PKCS#1 / PKCS#8 / SPKI PEM and bare base64 public keys
//!
//! # Example
//!
//! ```no_run
//! use alipay_crypto::{sign, verify, Params, PrivateKey, SignType};
//!
//! # fn example() -> alipay_crypto::CryptoResult<()> {
//! let private_key = PrivateKey::from_pem_file("app_private_key.pem")?;
//! let public_key = private_key.public_key();
//!
//! let mut params = Params::new();
//! params.insert("out_trade_no", "20240101000001");
//! params.insert("total_amount", 88.88);
//!
//! let content = params.canonical_string();
//! let signature = sign(content.as_bytes(), &private_key, SignType::Rsa2)?;
//! assert!(verify(content.as_bytes(), &signature, &public_key, SignType::Rsa2));
//! # Ok(())
//! # }
//! ```

mod canonical;
mod error;
mod keys;
mod signature;

pub use canonical::{canonicalize, Params, SIGN_FIELD};
pub use error::{CryptoError, CryptoResult};
pub use keys::{PrivateKey, PublicKey};
pub use signature::{sign, verify};

use serde::{Deserialize, Serialize};

/// The digest variant used for RSA signing.
///
/// The gateway calls SHA-1 signatures `RSA` and SHA-256 signatures `RSA2`.
/// Both the signing and the verifying side match on this enum exhaustively,
/// so content signed with one variant is never checked against the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignType {
    /// SHA1withRSA
    #[serde(rename = "RSA")]
    Rsa,
    /// SHA256withRSA
    #[default]
    #[serde(rename = "RSA2")]
    Rsa2,
}

impl SignType {
    /// The value sent in the `sign_type` request parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Rsa2 => "RSA2",
        }
    }
}

impl std::fmt::Display for SignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RSA" => Ok(Self::Rsa),
            "RSA2" => Ok(Self::Rsa2),
            other => Err(CryptoError::UnsupportedSignType(other.to_string())),
        }
    }
}
