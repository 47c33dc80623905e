//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use ruledns_config::ZoneCache;
use ruledns_core::{RedirectDescription, Zone, ZoneProvider};

use crate::config::Session;
use crate::error::CliError;

/// Pick the zone from `--zone` or the profile's `default_zone`.
pub fn zone_name(flag: Option<String>, session: &Session) -> Result<String, CliError> {
    flag.or_else(|| session.default_zone.clone())
        .ok_or_else(|| CliError::Validation {
            field: "zone".into(),
            reason: format!(
                "pass --zone or set default_zone on profile '{}'",
                session.profile_name
            ),
        })
}

/// Resolve a zone name to its id, consulting the local cache first.
///
/// Cache problems are never fatal: a corrupt or unwritable cache only
/// costs an extra lookup.
pub async fn resolve_zone<P: ZoneProvider>(provider: &P, name: &str) -> Result<Zone, CliError> {
    let mut cache = match ZoneCache::open_default() {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(error = %e, "ignoring zone cache");
            None
        }
    };

    if let Some(id) = cache.as_ref().and_then(|c| c.get(name)) {
        debug!(zone = name, id, "zone id from cache");
        return Ok(Zone {
            id: id.to_owned(),
            name: ruledns_core::model::normalize_host(name),
        });
    }

    let zone = provider.find_zone(name).await?;
    if let Some(cache) = cache.as_mut() {
        if cache.insert(&zone.name, &zone.id) {
            if let Err(e) = cache.save() {
                warn!(error = %e, "could not update zone cache");
            }
        }
    }
    Ok(zone)
}

/// Read a redirect description; `.yaml`/`.yml` files are YAML, anything
/// else is JSON.
pub fn read_description(path: &Path) -> Result<RedirectDescription, CliError> {
    let invalid = |source: Box<dyn std::error::Error + Send + Sync>| CliError::InvalidDescription {
        path: path.display().to_string(),
        source,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.into()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| invalid(e.into()))
    } else {
        serde_json::from_str(&contents).map_err(|e| invalid(e.into()))
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Spinner on stderr while a request is in flight; hidden in quiet mode
/// and when stderr is not a terminal.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

// ── Execution reports ───────────────────────────────────────────────

#[derive(tabled::Tabled)]
struct ReportRow {
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// Print an execution report; any failed operation becomes an error so
/// the exit code reflects partial application.
pub fn finish_report(
    report: &ruledns_core::ExecutionReport,
    global: &crate::cli::GlobalOpts,
) -> Result<(), CliError> {
    let color = crate::output::should_color(&global.color);
    let out = crate::output::render_single(
        &global.output,
        report,
        |r| {
            let rows: Vec<ReportRow> = r
                .completed
                .iter()
                .map(|op| ReportRow {
                    result: crate::output::verdict("ok", true, color),
                    operation: op.to_string(),
                    error: String::new(),
                })
                .chain(r.failed.iter().map(|f| ReportRow {
                    result: crate::output::verdict("failed", false, color),
                    operation: f.operation.to_string(),
                    error: f.error.clone(),
                }))
                .collect();
            crate::output::render_table(&rows)
        },
        |r| {
            r.completed
                .iter()
                .map(|op| format!("ok\t{op}"))
                .chain(r.failed.iter().map(|f| format!("failed\t{}", f.operation)))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    crate::output::print_output(&out, global.quiet);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed: report.failed.len(),
            total: report.completed.len() + report.failed.len(),
        })
    }
}
