//! Helpers for building clients over fixture keys.
//!
//! [`KeyDir`] writes every fixture key to a temporary directory so configs
//! can point at real files, the way a deployment does.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use alipay_gateway::{AlipayClient, ClientConfig, KeyPaths, RefundCall, SignType, Transport};
use tempfile::TempDir;

use crate::fixtures;
use crate::{MockTransport, RecordingRefund};

/// Application id used by app-mode test clients.
pub const APP_ID: &str = "appid";

/// Partner id used by web-mode test clients.
pub const PARTNER: &str = "partner";

/// Notify URL used by app-mode test clients.
pub const APP_NOTIFY_URL: &str = "http://example.com/app_notify_url";

/// Notify URL used by web-mode test clients.
pub const WEB_NOTIFY_URL: &str = "https://example.com/web_notify_url";

/// A temporary directory holding every fixture key as a PEM file.
///
/// The directory is removed when the value is dropped.
pub struct KeyDir {
    dir: TempDir,
}

impl Default for KeyDir {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDir {
    /// Write all fixture keys to a fresh temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let files = [
            ("app_private_key.pem", fixtures::APP_PRIVATE_KEY),
            ("app_public_key.pem", fixtures::APP_PUBLIC_KEY),
            ("web_private_key.pem", fixtures::WEB_PRIVATE_KEY),
            ("web_public_key.pem", fixtures::WEB_PUBLIC_KEY),
            ("gateway_private_key.pem", fixtures::GATEWAY_PRIVATE_KEY),
            ("gateway_public_key.pem", fixtures::GATEWAY_PUBLIC_KEY),
        ];
        for (name, pem) in files {
            std::fs::write(dir.path().join(name), pem).unwrap();
        }
        Self { dir }
    }

    /// The directory root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// App-mode merchant private key (`app_private_key.pem`).
    pub fn app_private(&self) -> PathBuf {
        self.path().join("app_private_key.pem")
    }

    /// App-mode merchant public key (`app_public_key.pem`).
    pub fn app_public(&self) -> PathBuf {
        self.path().join("app_public_key.pem")
    }

    /// Web-mode partner private key, PKCS#1 (`web_private_key.pem`).
    pub fn web_private(&self) -> PathBuf {
        self.path().join("web_private_key.pem")
    }

    /// Web-mode partner public key (`web_public_key.pem`).
    pub fn web_public(&self) -> PathBuf {
        self.path().join("web_public_key.pem")
    }

    /// Gateway private key, for signing canned replies (`gateway_private_key.pem`).
    pub fn gateway_private(&self) -> PathBuf {
        self.path().join("gateway_private_key.pem")
    }

    /// Gateway public key (`gateway_public_key.pem`).
    pub fn gateway_public(&self) -> PathBuf {
        self.path().join("gateway_public_key.pem")
    }
}

/// App-mode config: merchant keys, gateway public key as counterparty.
pub fn app_config(keys: &KeyDir) -> ClientConfig {
    let paths = KeyPaths::new(keys.app_private(), keys.gateway_public())
        .with_public_key(keys.app_public());
    ClientConfig::app(APP_ID, paths).with_notify_url(APP_NOTIFY_URL)
}

/// Web-mode config: partner keys, gateway public key as counterparty.
pub fn web_config(keys: &KeyDir) -> ClientConfig {
    let paths = KeyPaths::new(keys.web_private(), keys.gateway_public())
        .with_public_key(keys.web_public());
    ClientConfig::web(PARTNER, paths).with_notify_url(WEB_NOTIFY_URL)
}

/// Client over `config` whose transport is `transport`.
pub fn client_with_transport(config: ClientConfig, transport: &MockTransport) -> AlipayClient {
    let transport: Arc<dyn Transport> = Arc::new(transport.clone());
    AlipayClient::with_transport(config, transport).unwrap()
}

/// Client over `config` whose refunds go to `refund`.
///
/// Its transport fails every call, so anything that bypasses the refund
/// seam shows up as a transport error.
pub fn client_with_refund(config: ClientConfig, refund: &RecordingRefund) -> AlipayClient {
    let refund: Arc<dyn RefundCall> = Arc::new(refund.clone());
    client_with_transport(config, &MockTransport::failing()).with_refund_call(refund)
}

/// App-mode client recording refunds, signing with `sign_type`.
pub fn app_client(keys: &KeyDir, sign_type: SignType, refund: &RecordingRefund) -> AlipayClient {
    client_with_refund(app_config(keys).with_sign_type(sign_type), refund)
}

/// Web-mode client recording refunds, signing with `sign_type`.
pub fn web_client(keys: &KeyDir, sign_type: SignType, refund: &RecordingRefund) -> AlipayClient {
    client_with_refund(web_config(keys).with_sign_type(sign_type), refund)
}
