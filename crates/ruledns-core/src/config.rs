// ── Runtime provider configuration ──
//
// Describes *how* to reach Cloudflare: endpoint, credentials, transport
// tuning. Never touches disk; the CLI builds a `ProviderConfig` from its
// profile and hands it in, so several accounts can be driven side by side.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::engine::DEFAULT_PLACEHOLDER_ADDRESS;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file (TLS-intercepting proxies).
    CustomCa(PathBuf),
}

/// Configuration for talking to one Cloudflare account.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base URL (normally `https://api.cloudflare.com/client/v4/`).
    pub api_url: Url,
    /// API token with Zone:Read, DNS:Edit and Page Rules:Edit.
    pub api_token: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Address for synthesized apex records.
    pub placeholder_address: IpAddr,
}

impl ProviderConfig {
    pub fn new(api_url: Url, api_token: SecretString) -> Self {
        Self {
            api_url,
            api_token,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            placeholder_address: DEFAULT_PLACEHOLDER_ADDRESS,
        }
    }

    pub(crate) fn transport(&self) -> ruledns_api::TransportConfig {
        ruledns_api::TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => ruledns_api::TlsMode::System,
                TlsVerification::CustomCa(path) => ruledns_api::TlsMode::CustomCa(path.clone()),
            },
            timeout: self.timeout,
        }
    }
}
