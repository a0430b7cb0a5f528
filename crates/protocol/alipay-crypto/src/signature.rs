//! Signature creation and verification.
//!
//! Both sign types are RSASSA-PKCS1-v1_5 over a digest of the raw content:
//!
//! ```text
//! RSA   = PKCS1v15_Sign(private_key, SHA1(content))
//! RSA2  = PKCS1v15_Sign(private_key, SHA256(content))
//! ```
//!
//! PKCS#1 v1.5 is deterministic, so the output equals what the OpenSSL
//! command-line tool produces for the same key, digest and input.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::Pkcs1v15Sign;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PrivateKey, PublicKey};
use crate::SignType;

/// Sign `content` and return the base64 signature.
///
/// The returned string never contains line breaks, so it can be placed in
/// a query parameter as is.
///
/// # Errors
/// `EmptyContent` for an empty payload, `SigningFailed` when the key is
/// too small for the digest.
pub fn sign(content: &[u8], private_key: &PrivateKey, sign_type: SignType) -> CryptoResult<String> {
    if content.is_empty() {
        return Err(CryptoError::EmptyContent);
    }

    let raw = match sign_type {
        SignType::Rsa => private_key
            .rsa()
            .sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(content)),
        SignType::Rsa2 => private_key
            .rsa()
            .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(content)),
    }
    .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let mut encoded = BASE64.encode(raw);
    encoded.retain(|c| c != '\n' && c != '\r');
    Ok(encoded)
}

/// Verify a base64 signature over `content`.
///
/// Returns `false` for a mismatch, altered content, a signature made with
/// the other sign type, or a signature that is not valid base64. Embedded
/// whitespace in the signature (line-wrapped base64) is ignored.
pub fn verify(content: &[u8], signature: &str, public_key: &PublicKey, sign_type: SignType) -> bool {
    let compact: String = signature.chars().filter(|c| !c.is_whitespace()).collect();
    let Ok(raw) = BASE64.decode(compact) else {
        return false;
    };

    let result = match sign_type {
        SignType::Rsa => public_key
            .rsa()
            .verify(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(content), &raw),
        SignType::Rsa2 => public_key
            .rsa()
            .verify(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(content), &raw),
    };
    result.is_ok()
}
