//! Shared configuration for the ruledns CLI.
//!
//! TOML profiles, API-token resolution (env + keyring + plaintext), the
//! zone-id cache, and translation to `ruledns_core::ProviderConfig`. The
//! CLI adds `GlobalOpts`-aware overrides on top.

pub mod cache;

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ruledns_core::{ProviderConfig, TlsVerification};

pub use cache::ZoneCache;

/// Public Cloudflare v4 endpoint, used when a profile names none.
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4/";

/// Keyring service name for stored API tokens.
pub const KEYRING_SERVICE: &str = "ruledns";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("zone cache is corrupt: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Cloudflare account profile.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL; the public endpoint when absent.
    pub api_url: Option<String>,

    /// API token (plaintext -- prefer keyring or env var).
    pub api_token: Option<String>,

    /// Environment variable name containing the API token.
    pub api_token_env: Option<String>,

    /// Zone used when `--zone` is omitted.
    pub default_zone: Option<String>,

    /// Address for synthesized apex records.
    pub placeholder_address: Option<IpAddr>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "ruledns", "ruledns")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve the zone-id cache path in the platform cache directory.
pub fn cache_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".cache").join("zones.json"),
        |dirs| dirs.cache_dir().join("zones.json"),
    )
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("ruledns");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, layering `RULEDNS_*` environment variables on top.
///
/// Nested keys use a double underscore: `RULEDNS_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RULEDNS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/api-token"),
    )?)
}

/// Resolve an API token from the credential chain (no CLI flag step).
pub fn resolve_api_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_token_env → env var lookup
    if let Some(ref env_name) = profile.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.api_token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's API token in the system keyring.
pub fn store_api_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Parse and validate a profile's API URL.
pub fn profile_api_url(profile: &Profile) -> Result<url::Url, ConfigError> {
    let raw = profile.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected an http(s) URL, got {raw}"),
        });
    }
    Ok(url)
}

/// Build a `ProviderConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_provider_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ProviderConfig, ConfigError> {
    let api_url = profile_api_url(profile)?;
    let token = resolve_api_token(profile, profile_name)?;

    let mut config = ProviderConfig::new(api_url, token);
    if let Some(ref ca_path) = profile.ca_cert {
        config.tls = TlsVerification::CustomCa(ca_path.clone());
    }
    if let Some(addr) = profile.placeholder_address {
        config.placeholder_address = addr;
    }
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "work"

[defaults]
output = "json"

[profiles.work]
api_token = "plain-token"
default_zone = "example.com"
placeholder_address = "192.0.2.10"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("work"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        let work = &cfg.profiles["work"];
        assert_eq!(work.default_zone.as_deref(), Some("example.com"));
        assert_eq!(work.placeholder_address, Some("192.0.2.10".parse().unwrap()));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.timeout, 30);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_token_env: Some("CF_TOKEN".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"], cfg.profiles["default"]);
    }

    #[test]
    fn plaintext_token_used_when_env_var_unset() {
        let var = "RULEDNS_TEST_TOKEN_UNSET";
        assert!(std::env::var(var).is_err());
        let profile = Profile {
            api_token: Some("from-file".into()),
            api_token_env: Some(var.into()),
            ..Profile::default()
        };
        let token = resolve_api_token(&profile, "ruledns-test-no-keyring-entry").unwrap();
        assert_eq!(token.expose_secret(), "from-file");
    }

    #[test]
    fn provider_config_applies_profile_overrides() {
        let profile = Profile {
            api_url: Some("http://127.0.0.1:9000/client/v4".into()),
            api_token: Some("t".into()),
            placeholder_address: Some("100::".parse().unwrap()),
            ca_cert: Some(PathBuf::from("/etc/ssl/corp.pem")),
            timeout: Some(7),
            ..Profile::default()
        };
        let config = profile_to_provider_config(&profile, "ruledns-test-no-keyring-entry").unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/client/v4");
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/corp.pem"))
        );
        assert_eq!(config.placeholder_address, "100::".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let profile = Profile {
            api_url: Some("ftp://example.com".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_api_url(&profile),
            Err(ConfigError::Validation { .. })
        ));
    }
}
