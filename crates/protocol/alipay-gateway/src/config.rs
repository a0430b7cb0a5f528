//! Client configuration.
//!
//! A client runs in exactly one auth mode, chosen when the configuration is
//! built:
//!
//! - **App mode**: open-platform `app_id`, `method`/`biz_content` requests
//! - **Web mode**: merchant `partner` id, `service` requests with flat
//!   business parameters
//!
//! ```toml
//! sign_type = "RSA2"
//! sandbox = true
//!
//! [auth]
//! mode = "app"
//! app_id = "2021000000000000"
//! notify_url = "https://example.com/alipay/notify"
//!
//! [auth.keys]
//! private_key = "keys/app_private_key.pem"
//! gateway_public_key = "keys/alipay_public_key.pem"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use alipay_crypto::{PrivateKey, PublicKey, SignType};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::types::{Identity, GATEWAY_URL, SANDBOX_GATEWAY_URL, WEB_GATEWAY_URL};

/// Paths of the three keys a client works with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPaths {
    /// Caller's private key, signs requests.
    #[serde(default, alias = "app_private_key_path", alias = "web_private_key_path")]
    pub private_key: Option<PathBuf>,

    /// Caller's own public key. Not needed for calls; loaded when given.
    #[serde(default, alias = "app_public_key_path", alias = "web_public_key_path")]
    pub public_key: Option<PathBuf>,

    /// Gateway's public key, verifies responses and notifications.
    #[serde(
        default,
        alias = "app_alipay_public_key_path",
        alias = "web_alipay_public_key_path"
    )]
    pub gateway_public_key: Option<PathBuf>,
}

impl KeyPaths {
    /// Key paths with the two required keys.
    pub fn new(private_key: impl Into<PathBuf>, gateway_public_key: impl Into<PathBuf>) -> Self {
        Self {
            private_key: Some(private_key.into()),
            public_key: None,
            gateway_public_key: Some(gateway_public_key.into()),
        }
    }

    /// Also load the caller's own public key.
    pub fn with_public_key(mut self, public_key: impl Into<PathBuf>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    fn resolve_relative(&mut self, base: &Path) {
        for path in [
            &mut self.private_key,
            &mut self.public_key,
            &mut self.gateway_public_key,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Auth mode and the identity that goes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AuthMode {
    /// Open-platform application.
    App {
        /// Application id.
        #[serde(alias = "appid")]
        app_id: String,
        /// Asynchronous notification URL.
        #[serde(default, alias = "app_notify_url")]
        notify_url: Option<String>,
        /// Key material.
        #[serde(default)]
        keys: KeyPaths,
    },
    /// Merchant partner integration.
    Web {
        /// Partner id.
        partner: String,
        /// Asynchronous notification URL.
        #[serde(default, alias = "web_notify_url")]
        notify_url: Option<String>,
        /// Key material.
        #[serde(default)]
        keys: KeyPaths,
    },
}

impl AuthMode {
    /// Short name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::App { .. } => "app",
            Self::Web { .. } => "web",
        }
    }

    /// The key paths of this mode.
    pub fn keys(&self) -> &KeyPaths {
        match self {
            Self::App { keys, .. } | Self::Web { keys, .. } => keys,
        }
    }

    fn keys_mut(&mut self) -> &mut KeyPaths {
        match self {
            Self::App { keys, .. } | Self::Web { keys, .. } => keys,
        }
    }

    /// The configured notify URL.
    pub fn notify_url(&self) -> Option<&str> {
        match self {
            Self::App { notify_url, .. } | Self::Web { notify_url, .. } => notify_url.as_deref(),
        }
    }

    fn identity(&self) -> GatewayResult<Identity> {
        match self {
            Self::App { app_id, .. } if app_id.trim().is_empty() => {
                Err(GatewayError::config("app mode requires a non-empty app_id"))
            }
            Self::Web { partner, .. } if partner.trim().is_empty() => {
                Err(GatewayError::config("web mode requires a non-empty partner"))
            }
            Self::App { app_id, .. } => Ok(Identity::AppId(app_id.clone())),
            Self::Web { partner, .. } => Ok(Identity::Partner(partner.clone())),
        }
    }
}

/// Configuration of an [`AlipayClient`](crate::AlipayClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Auth mode, identity and keys.
    pub auth: AuthMode,

    /// Digest used for request signatures and for verification.
    #[serde(default)]
    pub sign_type: SignType,

    /// Use the sandbox gateway.
    #[serde(default)]
    pub sandbox: bool,

    /// Override the gateway endpoint entirely.
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// Check the gateway's signature on synchronous responses.
    #[serde(default)]
    pub verify_response_signature: bool,

    /// HTTP timeout in seconds, passed to the HTTP client.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// App-mode configuration.
    pub fn app(app_id: impl Into<String>, keys: KeyPaths) -> Self {
        Self::with_auth(AuthMode::App {
            app_id: app_id.into(),
            notify_url: None,
            keys,
        })
    }

    /// Web (partner) mode configuration.
    pub fn web(partner: impl Into<String>, keys: KeyPaths) -> Self {
        Self::with_auth(AuthMode::Web {
            partner: partner.into(),
            notify_url: None,
            keys,
        })
    }

    fn with_auth(auth: AuthMode) -> Self {
        Self {
            auth,
            sign_type: SignType::default(),
            sandbox: false,
            gateway_url: None,
            verify_response_signature: false,
            timeout_secs: None,
        }
    }

    /// Set the notify URL.
    pub fn with_notify_url(mut self, url: impl Into<String>) -> Self {
        match &mut self.auth {
            AuthMode::App { notify_url, .. } | AuthMode::Web { notify_url, .. } => {
                *notify_url = Some(url.into());
            }
        }
        self
    }

    /// Set the sign type.
    pub fn with_sign_type(mut self, sign_type: SignType) -> Self {
        self.sign_type = sign_type;
        self
    }

    /// Switch to the sandbox gateway.
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Use a custom gateway endpoint.
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    /// Enable or disable response signature checks.
    pub fn with_response_verification(mut self, enabled: bool) -> Self {
        self.verify_response_signature = enabled;
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// Relative key paths are resolved against the file's directory.
    pub fn load(path: &Path) -> GatewayResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        if let Some(base) = path.parent() {
            config.auth.keys_mut().resolve_relative(base);
        }
        Ok(config)
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        if let Some(url) = &self.gateway_url {
            return url;
        }
        match (&self.auth, self.sandbox) {
            (_, true) => SANDBOX_GATEWAY_URL,
            (AuthMode::App { .. }, false) => GATEWAY_URL,
            (AuthMode::Web { .. }, false) => WEB_GATEWAY_URL,
        }
    }

    /// HTTP timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check identity and key paths without reading any file.
    pub fn validate(&self) -> GatewayResult<()> {
        self.auth.identity()?;
        let keys = self.auth.keys();
        let mode = self.auth.name();
        if keys.private_key.is_none() {
            return Err(GatewayError::config(format!(
                "{} mode requires a private key path",
                mode
            )));
        }
        if keys.gateway_public_key.is_none() {
            return Err(GatewayError::config(format!(
                "{} mode requires the gateway public key path",
                mode
            )));
        }
        Ok(())
    }

    /// Validate and load all key material.
    pub fn resolve(&self) -> GatewayResult<Credentials> {
        self.validate()?;
        let identity = self.auth.identity()?;
        let keys = self.auth.keys();

        let private_key = match &keys.private_key {
            Some(path) => PrivateKey::from_pem_file(path)
                .map_err(|e| GatewayError::config(format!("private key: {}", e)))?,
            None => return Err(GatewayError::config("missing private key path")),
        };
        let gateway_public_key = match &keys.gateway_public_key {
            Some(path) => PublicKey::from_pem_file(path)
                .map_err(|e| GatewayError::config(format!("gateway public key: {}", e)))?,
            None => return Err(GatewayError::config("missing gateway public key path")),
        };
        let public_key = keys
            .public_key
            .as_ref()
            .map(PublicKey::from_pem_file)
            .transpose()
            .map_err(|e| GatewayError::config(format!("public key: {}", e)))?;

        Ok(Credentials {
            identity,
            private_key,
            public_key,
            gateway_public_key,
            notify_url: self.auth.notify_url().map(str::to_string),
        })
    }
}

/// Identity and loaded keys, fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Who requests are made as.
    pub identity: Identity,
    /// Signs requests.
    pub private_key: PrivateKey,
    /// Caller's own public key, when configured.
    pub public_key: Option<PublicKey>,
    /// Verifies gateway signatures.
    pub gateway_public_key: PublicKey,
    /// Asynchronous notification URL.
    pub notify_url: Option<String>,
}
