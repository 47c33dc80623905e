// ── Core error types ──
//
// Two families live here. The engine errors (`ConversionError`,
// `ValidationError`, `AmbiguousRequirementError`) are local and
// recoverable: batch operations collect them per item instead of
// aborting. `CoreError` covers provider access, and its
// `From<ruledns_api::Error>` impl keeps HTTP details out of consumers.

use thiserror::Error;

use crate::model::{DnsRecord, RecordKey};

// ── Engine errors ────────────────────────────────────────────────────

/// A redirect's source names a host outside the description's domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("redirect source '{from}' does not resolve under {domain}")]
pub struct ValidationError {
    pub from: String,
    pub domain: String,
}

/// A redirect or Page Rule cannot be mapped to its counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("invalid target pattern '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("unsupported wildcard in '{target}': only a whole leading '*' label is allowed")]
    UnsupportedWildcard { target: String },

    #[error("host {host} is outside zone {zone}")]
    HostOutsideZone { host: String, zone: String },

    #[error("invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    #[error("invalid redirect source '{from}': {reason}")]
    InvalidSource { from: String, reason: String },

    #[error("invalid redirect destination '{to}': {reason}")]
    InvalidDestination { to: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Two rules demand different records for the same `(type, name)` slot.
///
/// Only produced when the first-wins tie-break is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "ambiguous requirement for {key}: rule '{first_rule}' wants {first}, rule '{second_rule}' wants {second}"
)]
pub struct AmbiguousRequirementError {
    pub key: RecordKey,
    pub first_rule: String,
    pub first: DnsRecord,
    pub second_rule: String,
    pub second: DnsRecord,
}

// ── Provider errors ──────────────────────────────────────────────────

/// Unified error type for provider access.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Cloudflare API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Rate limited by Cloudflare -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Zone not found: {name}")]
    ZoneNotFound { name: String },

    #[error("Record has no provider id and cannot be deleted: {record}")]
    MissingRecordId { record: DnsRecord },

    // ── Engine errors surfaced through the workflow ──────────────────
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Ambiguous(#[from] AmbiguousRequirementError),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Cloudflare error code (e.g. 81053 "record already exists").
        code: Option<i64>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ruledns_api::Error> for CoreError {
    fn from(err: ruledns_api::Error) -> Self {
        match err {
            ruledns_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ruledns_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ruledns_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ruledns_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ruledns_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ruledns_api::Error::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            ruledns_api::Error::Api {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            ruledns_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
