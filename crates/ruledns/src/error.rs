//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ruledns_config::ConfigError;
use ruledns_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNMET: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Cloudflare API at {url}")]
    #[diagnostic(
        code(ruledns::connection_failed),
        help(
            "Check network access and the profile's api_url.\n\
             Behind a TLS-intercepting proxy, set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Rate limited by Cloudflare")]
    #[diagnostic(
        code(ruledns::rate_limited),
        help("Wait {retry_after_secs}s and run the command again.")
    )]
    RateLimited { retry_after_secs: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ruledns::auth_failed),
        help(
            "The token needs Zone:Read, DNS:Edit and Page Rules:Edit on this zone.\n\
             Store a new one with: ruledns config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(ruledns::no_credentials),
        help(
            "Configure one with: ruledns config init\n\
             Or set the RULEDNS_API_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(ruledns::not_found),
        help("Check the name and that the API token can see this {resource_type}.")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(ruledns::api_error))]
    ApiError { code: String, message: String },

    // ── Reconciliation ───────────────────────────────────────────────
    #[error("Zone {zone} does not satisfy its Page Rules ({missing} missing, {conflicting} conflicting)")]
    #[diagnostic(
        code(ruledns::unmet),
        help("Preview the fix with: ruledns dns fix --zone {zone} --dry-run")
    )]
    Unmet {
        zone: String,
        missing: usize,
        conflicting: usize,
    },

    #[error("{failed} of {total} operations failed")]
    #[diagnostic(
        code(ruledns::partial_failure),
        help("Completed operations stay applied. Run the same command again to plan from the new state.")
    )]
    PartialFailure { failed: usize, total: usize },

    #[error("Ambiguous requirement: {message}")]
    #[diagnostic(
        code(ruledns::ambiguous),
        help("Align the rules' status, or drop --strict to let the higher-priority rule win.")
    )]
    Ambiguous { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ruledns::validation))]
    Validation { field: String, reason: String },

    #[error("Could not read redirect description {path}")]
    #[diagnostic(
        code(ruledns::description),
        help("Expected a JSON or YAML document with `domain` and `redirects`.")
    )]
    InvalidDescription {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ruledns::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ruledns config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(ruledns::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' needs a decision but stdin is not a terminal")]
    #[diagnostic(
        code(ruledns::confirmation_required),
        help("Pass --strategy and --yes (-y) in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(ruledns::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    Timeout { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::RateLimited { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Unmet { .. } => exit_code::UNMET,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::InvalidDescription { .. }
            | Self::Ambiguous { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::RateLimited { retry_after_secs } => {
                CliError::RateLimited { retry_after_secs }
            }

            CoreError::ZoneNotFound { name } => CliError::NotFound {
                resource_type: "zone".into(),
                identifier: name,
            },

            CoreError::Conversion(e) => CliError::Validation {
                field: "page rule".into(),
                reason: e.to_string(),
            },

            CoreError::Ambiguous(e) => CliError::Ambiguous {
                message: e.to_string(),
            },

            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .map(|c| c.to_string())
                    .or_else(|| status.map(|s| format!("HTTP {s}")))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::MissingRecordId { record } => CliError::ApiError {
                code: "internal".into(),
                message: format!("record without provider id: {record}"),
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}
