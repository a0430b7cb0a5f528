//! Fixed 2048-bit RSA key pairs.
//!
//! Three parties: the app-mode merchant, the web-mode partner and the
//! gateway itself (used to sign canned responses and notifications).

/// App-mode merchant private key (PKCS#1).
pub const APP_PRIVATE_KEY: &str = include_str!("../fixtures/app_private_key.pem");

/// App-mode merchant public key (SPKI).
pub const APP_PUBLIC_KEY: &str = include_str!("../fixtures/app_public_key.pem");

/// Web-mode partner private key (PKCS#1).
pub const WEB_PRIVATE_KEY: &str = include_str!("../fixtures/web_private_key.pem");

/// The same partner key in PKCS#8 form.
pub const WEB_PRIVATE_KEY_PKCS8: &str = include_str!("../fixtures/web_private_key_pkcs8.pem");

/// Web-mode partner public key (SPKI).
pub const WEB_PUBLIC_KEY: &str = include_str!("../fixtures/web_public_key.pem");

/// Gateway private key.
pub const GATEWAY_PRIVATE_KEY: &str = include_str!("../fixtures/gateway_private_key.pem");

/// Gateway public key (SPKI).
pub const GATEWAY_PUBLIC_KEY: &str = include_str!("../fixtures/gateway_public_key.pem");
