//! DNS check / fix handlers.

use std::io::IsTerminal;

use dialoguer::Select;
use tabled::Tabled;

use ruledns_core::engine::RejectedRule;
use ruledns_core::{
    Assessment, Classification, CloudflareProvider, DnsRecord, Operation, Plan, Reconciler,
    Strategy, Zone,
};

use crate::cli::{DnsArgs, DnsCommand, GlobalOpts, StrategyArg};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "Proxied")]
    proxied: String,
    #[tabled(rename = "TTL")]
    ttl: String,
}

impl From<&DnsRecord> for RecordRow {
    fn from(r: &DnsRecord) -> Self {
        Self {
            record_type: r.record_type.to_string(),
            name: r.name.clone(),
            content: r.content.clone(),
            proxied: if r.proxied { "yes" } else { "no" }.into(),
            ttl: r.ttl.to_string(),
        }
    }
}

#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "Proxied")]
    proxied: String,
}

impl From<&Operation> for OperationRow {
    fn from(op: &Operation) -> Self {
        let (action, record) = match op {
            Operation::DeleteRecord(r) => ("delete", r),
            Operation::CreateRecord(r) => ("create", r),
            Operation::CreatePageRule(rule) => {
                return Self {
                    action: "create page rule".into(),
                    record_type: String::new(),
                    name: rule.target.clone(),
                    content: String::new(),
                    proxied: String::new(),
                };
            }
        };
        let row = RecordRow::from(record);
        Self {
            action: action.into(),
            record_type: row.record_type,
            name: row.name,
            content: row.content,
            proxied: row.proxied,
        }
    }
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::RequiredOnly => Self::RequiredOnly,
            StrategyArg::ReplaceAll => Self::ReplaceAll,
            StrategyArg::Skip => Self::Skip,
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn classification_detail(c: &Classification, color: bool) -> String {
    let sections = [
        ("Required", &c.required),
        ("Satisfying", &c.satisfying),
        ("Conflicting", &c.conflicting),
        ("Missing", &c.missing),
        ("Unrelated", &c.unrelated),
    ];

    let mut out = Vec::new();
    for (title, records) in sections {
        if records.is_empty() {
            continue;
        }
        let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
        out.push(format!(
            "{}\n{}",
            output::heading(&format!("{title} ({})", records.len()), color),
            output::render_table(&rows)
        ));
    }

    out.push(if c.fully_met {
        output::verdict("✓ All Page Rule requirements are met", true, color)
    } else {
        output::verdict(
            &format!(
                "✗ {} missing, {} conflicting",
                c.missing.len(),
                c.conflicting.len()
            ),
            false,
            color,
        )
    });
    out.join("\n\n")
}

fn classification_plain(c: &Classification) -> String {
    let buckets = [
        ("satisfying", &c.satisfying),
        ("conflicting", &c.conflicting),
        ("missing", &c.missing),
        ("unrelated", &c.unrelated),
    ];
    buckets
        .iter()
        .flat_map(|(name, records)| {
            records
                .iter()
                .map(move |r| format!("{name}\t{}\t{}\t{}", r.record_type, r.name, r.content))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn warn_rejected(rejected: &[RejectedRule], quiet: bool) {
    if quiet {
        return;
    }
    for r in rejected {
        eprintln!("⚠ ignoring page rule {}: {}", r.rule.target, r.error);
    }
}

fn print_plan(plan: &Plan, global: &GlobalOpts) {
    let ops: Vec<Operation> = plan.operations().collect();
    let out = output::render_list(&global.output, &ops, |o| OperationRow::from(o), ToString::to_string);
    output::print_output(&out, global.quiet);
}

// ── Strategy choice ─────────────────────────────────────────────────

const STRATEGY_CHOICES: [(&str, Strategy); 3] = [
    (
        "required-only: delete conflicting records, create missing ones",
        Strategy::RequiredOnly,
    ),
    (
        "replace-all: also delete every record no Page Rule needs (MX, TXT, ...)",
        Strategy::ReplaceAll,
    ),
    ("skip: change nothing", Strategy::Skip),
];

fn choose_strategy(arg: Option<StrategyArg>, global: &GlobalOpts) -> Result<Strategy, CliError> {
    if let Some(arg) = arg {
        return Ok(arg.into());
    }
    if global.yes {
        return Ok(Strategy::RequiredOnly);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: "dns fix".into(),
        });
    }

    let labels: Vec<&str> = STRATEGY_CHOICES.iter().map(|(label, _)| *label).collect();
    let selection = Select::new()
        .with_prompt("How should the zone be fixed?")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;
    Ok(STRATEGY_CHOICES
        .get(selection)
        .map_or(Strategy::Skip, |(_, strategy)| *strategy))
}

// ── Handler ─────────────────────────────────────────────────────────

async fn assess(
    reconciler: &Reconciler<CloudflareProvider>,
    zone: Zone,
    global: &GlobalOpts,
) -> Result<Assessment, CliError> {
    let spinner = util::spinner(
        &format!("Fetching page rules and DNS records for {}", zone.name),
        global.quiet,
    );
    let snapshot = reconciler.fetch(zone).await;
    spinner.finish_and_clear();

    let assessment = reconciler.assess(snapshot?)?;
    warn_rejected(&assessment.required.rejected, global.quiet);
    Ok(assessment)
}

pub async fn handle(
    provider: CloudflareProvider,
    session: &Session,
    args: DnsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DnsCommand::Check { zone, strict } => {
            let reconciler = Reconciler::new(provider)
                .with_placeholder(session.provider.placeholder_address)
                .strict(strict);
            let name = util::zone_name(zone.zone, session)?;
            let zone = util::resolve_zone(reconciler.provider(), &name).await?;
            let assessment = assess(&reconciler, zone, global).await?;
            let c = &assessment.classification;

            let out = output::render_single(
                &global.output,
                c,
                |c| classification_detail(c, color),
                classification_plain,
            );
            output::print_output(&out, global.quiet);

            if c.fully_met {
                Ok(())
            } else {
                Err(CliError::Unmet {
                    zone: assessment.snapshot.zone.name.clone(),
                    missing: c.missing.len(),
                    conflicting: c.conflicting.len(),
                })
            }
        }

        DnsCommand::Fix {
            zone,
            strategy,
            dry_run,
            strict,
        } => {
            let reconciler = Reconciler::new(provider)
                .with_placeholder(session.provider.placeholder_address)
                .strict(strict);
            let name = util::zone_name(zone.zone, session)?;
            let zone = util::resolve_zone(reconciler.provider(), &name).await?;
            let assessment = assess(&reconciler, zone, global).await?;
            let zone = &assessment.snapshot.zone;

            if !assessment.needs_remediation() {
                if !global.quiet {
                    eprintln!("✓ {} already satisfies its Page Rules", zone.name);
                }
                return Ok(());
            }

            if !global.quiet {
                eprintln!(
                    "{}",
                    classification_detail(&assessment.classification, color)
                );
            }

            let strategy = choose_strategy(strategy, global)?;
            let plan = assessment.plan(strategy);
            if plan.is_empty() {
                if !global.quiet {
                    eprintln!("Nothing to change ({strategy})");
                }
                return Ok(());
            }

            print_plan(&plan, global);
            if dry_run {
                if !global.quiet {
                    eprintln!("Dry run: {} operations planned, none executed", plan.len());
                }
                return Ok(());
            }

            if strategy.is_destructive() {
                let unrelated = assessment.classification.unrelated.len();
                eprintln!(
                    "⚠ replace-all deletes {unrelated} records that no Page Rule requires"
                );
                if !util::confirm(
                    &format!("Really delete {unrelated} unrelated records from {}?", zone.name),
                    global.yes,
                )? {
                    eprintln!("Aborted");
                    return Ok(());
                }
            }
            if !util::confirm(
                &format!("Apply {} changes to {}?", plan.len(), zone.name),
                global.yes,
            )? {
                eprintln!("Aborted");
                return Ok(());
            }

            let spinner = util::spinner("Applying changes", global.quiet);
            let report = reconciler.execute(zone, &plan).await;
            spinner.finish_and_clear();
            util::finish_report(&report, global)
        }
    }
}
