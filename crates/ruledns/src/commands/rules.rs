//! Page Rule command handlers.

use tabled::Tabled;

use ruledns_core::engine::{self, ExportedRule};
use ruledns_core::model::normalize_host;
use ruledns_core::{
    CloudflareProvider, PageRule, PageRuleAction, Reconciler, RedirectDescription, ZoneProvider,
};

use crate::cli::{GlobalOpts, RulesArgs, RulesCommand};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct RuleRow {
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Actions")]
    actions: String,
}

impl From<&PageRule> for RuleRow {
    fn from(r: &PageRule) -> Self {
        Self {
            priority: r.priority,
            status: r.status.to_string(),
            target: r.target.clone(),
            actions: r
                .actions
                .iter()
                .map(describe_action)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn describe_action(action: &PageRuleAction) -> String {
    match action {
        PageRuleAction::ForwardingUrl { url, status } => format!("{} → {url}", status.code()),
        PageRuleAction::AlwaysUseHttps => "always_use_https".into(),
        PageRuleAction::Unsupported { id, .. } => format!("{id} (unsupported)"),
    }
}

#[derive(Tabled)]
struct RedirectRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Type")]
    redirect_type: String,
}

fn export_detail(description: &RedirectDescription) -> String {
    let rows: Vec<RedirectRow> = description
        .redirects
        .iter()
        .map(|r| RedirectRow {
            from: r.from.clone(),
            to: r.to.clone(),
            redirect_type: r.redirect_type.to_string(),
        })
        .collect();
    format!(
        "domain: {}\n{}",
        description.domain,
        output::render_table(&rows)
    )
}

/// Print rules in the chosen format.
pub(crate) fn print_rules(rules: &[PageRule], global: &GlobalOpts) {
    let out = output::render_list(&global.output, rules, |r| RuleRow::from(r), |r| r.target.clone());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    provider: CloudflareProvider,
    session: &Session,
    args: RulesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reconciler = Reconciler::new(provider);
    let provider = reconciler.provider();

    match args.command {
        RulesCommand::List(zone) => {
            let name = util::zone_name(zone.zone, session)?;
            let zone = util::resolve_zone(provider, &name).await?;
            let mut rules = provider.page_rules(&zone).await?;
            rules.sort_by_key(|r| std::cmp::Reverse(r.priority));
            print_rules(&rules, global);
            Ok(())
        }

        RulesCommand::Export(zone) => {
            let name = util::zone_name(zone.zone, session)?;
            let zone = util::resolve_zone(provider, &name).await?;
            let rules = provider.page_rules(&zone).await?;

            if !global.quiet {
                for exported in engine::page_rules_to_redirects(&rules, &zone.name) {
                    if let ExportedRule::Unsupported { target, actions } = exported {
                        eprintln!(
                            "⚠ skipped {target}: not a plain redirect ({})",
                            actions.join(", ")
                        );
                    }
                }
            }

            let description = engine::redirect_description(&rules, &zone.name);
            let out = output::render_single(&global.output, &description, export_detail, |d| {
                d.redirects
                    .iter()
                    .map(|r| format!("{}\t{}\t{}", r.from, r.to, r.redirect_type))
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Apply {
            zone,
            file,
            dry_run,
        } => {
            let description = util::read_description(&file)?;
            let name = match zone.zone {
                Some(flag) if normalize_host(&flag) != normalize_host(&description.domain) => {
                    return Err(CliError::Validation {
                        field: "zone".into(),
                        reason: format!(
                            "--zone {flag} does not match the file's domain {}",
                            description.domain
                        ),
                    });
                }
                Some(flag) => flag,
                None => description.domain.clone(),
            };

            let converted = engine::page_rules_from_description(&description);
            super::redirects::reject_invalid(&converted, description.redirects.len(), global)?;

            let zone = util::resolve_zone(provider, &name).await?;
            let existing = provider.page_rules(&zone).await?;
            let to_create = engine::rules_to_create(&existing, &converted.rules);

            if to_create.is_empty() {
                if !global.quiet {
                    eprintln!("✓ All {} rules already exist on {}", converted.rules.len(), zone.name);
                }
                return Ok(());
            }

            print_rules(&to_create, global);
            if dry_run {
                if !global.quiet {
                    eprintln!("Dry run: {} rules would be created", to_create.len());
                }
                return Ok(());
            }

            if !util::confirm(
                &format!("Create {} page rules on {}?", to_create.len(), zone.name),
                global.yes,
            )? {
                return Ok(());
            }

            let report = reconciler.create_page_rules(&zone, &to_create).await;
            util::finish_report(&report, global)?;
            if !global.quiet {
                eprintln!("Next: ruledns dns check --zone {}", zone.name);
            }
            Ok(())
        }
    }
}
