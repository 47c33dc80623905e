//! CLI configuration -- thin wrapper around `ruledns_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --api-token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use ruledns_core::{ProviderConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ruledns_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Everything a provider-bound command needs from configuration.
#[derive(Debug)]
pub struct Session {
    pub profile_name: String,
    pub provider: ProviderConfig,
    pub default_zone: Option<String>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Build a `Session` from the config file, profile, and CLI overrides.
///
/// An explicitly requested profile must exist; the implicit default may
/// be absent, in which case flags and environment alone must suffice.
pub fn resolve_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    // 1. API URL (flag > env > profile > public endpoint)
    let api_url = match global.api_url.as_deref() {
        Some(raw) => raw.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?,
        None => ruledns_config::profile_api_url(&profile)?,
    };

    // 2. Token (flag > env > keyring > plaintext)
    let token = match global.api_token.as_deref() {
        Some(token) => SecretString::from(token.to_owned()),
        None => ruledns_config::resolve_api_token(&profile, &profile_name)?,
    };

    let mut provider = ProviderConfig::new(api_url, token);

    // 3. TLS
    if let Some(ref ca_path) = profile.ca_cert {
        provider.tls = TlsVerification::CustomCa(ca_path.clone());
    }

    // 4. Timeout (flag > profile > defaults)
    provider.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(cfg.defaults.timeout),
    );

    // 5. Apex placeholder
    if let Some(addr) = profile.placeholder_address {
        provider.placeholder_address = addr;
    }

    Ok(Session {
        profile_name,
        provider,
        default_zone: profile.default_zone,
    })
}
