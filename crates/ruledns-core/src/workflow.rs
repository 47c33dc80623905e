// ── Reconciliation workflow ──
//
// The linear sequence around the pure engine:
//
//   fetch → classify → (unmet?) choose strategy → plan → execute
//
// Each stage is a separate method so callers (the CLI's interactive flow,
// tests) can observe and intervene between them. Nothing here retries:
// recovery from a partial failure is simply another full pass.

use std::collections::HashSet;
use std::net::IpAddr;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{
    self, Classification, DEFAULT_PLACEHOLDER_ADDRESS, Operation, Plan, RecordTemplate,
    RequiredRecords, Strategy,
};
use crate::error::CoreError;
use crate::model::{DnsRecord, PageRule, RecordKey, Zone};
use crate::provider::ZoneProvider;

/// Page Rules and live records of one zone, fetched in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSnapshot {
    pub zone: Zone,
    pub page_rules: Vec<PageRule>,
    pub records: Vec<DnsRecord>,
}

/// A snapshot together with what its Page Rules require of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub snapshot: ZoneSnapshot,
    pub required: RequiredRecords,
    pub classification: Classification,
}

impl Assessment {
    pub fn needs_remediation(&self) -> bool {
        !self.classification.fully_met
    }

    pub fn plan(&self, strategy: Strategy) -> Plan {
        engine::plan(strategy, &self.classification, &self.snapshot.records)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedOperation {
    pub operation: Operation,
    pub error: String,
}

/// What happened when a plan was executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub completed: Vec<Operation>,
    pub failed: Vec<FailedOperation>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, operation: Operation, result: Result<(), CoreError>) {
        match result {
            Ok(()) => {
                info!(%operation, "applied");
                self.completed.push(operation);
            }
            Err(e) => {
                warn!(%operation, error = %e, "operation failed");
                self.failed.push(FailedOperation {
                    operation,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Result of a full unattended pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to do.
    AlreadyMet(Assessment),
    /// Remediation was needed but the chooser declined.
    Skipped(Assessment),
    Executed {
        assessment: Assessment,
        plan: Plan,
        report: ExecutionReport,
    },
}

/// Drives the reconciliation stages against a provider.
pub struct Reconciler<P> {
    provider: P,
    placeholder: IpAddr,
    strict: bool,
}

impl<P: ZoneProvider> Reconciler<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            placeholder: DEFAULT_PLACEHOLDER_ADDRESS,
            strict: false,
        }
    }

    /// Address used for synthesized apex records.
    pub fn with_placeholder(mut self, placeholder: IpAddr) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Treat conflicting demands on one record slot as an error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // ── Fetch ───────────────────────────────────────────────────────

    /// Fetch Page Rules, then live records. Records are read second so
    /// classification never runs against records older than the rules.
    pub async fn fetch(&self, zone: Zone) -> Result<ZoneSnapshot, CoreError> {
        let page_rules = self.provider.page_rules(&zone).await?;
        let records = self.provider.dns_records(&zone).await?;
        info!(
            zone = %zone.name,
            page_rules = page_rules.len(),
            records = records.len(),
            "fetched zone snapshot"
        );
        Ok(ZoneSnapshot {
            zone,
            page_rules,
            records,
        })
    }

    // ── Classify ────────────────────────────────────────────────────

    pub fn assess(&self, snapshot: ZoneSnapshot) -> Result<Assessment, CoreError> {
        let template = RecordTemplate::new(&snapshot.zone.name).with_placeholder(self.placeholder);
        let required = if self.strict {
            engine::build_required_records_strict(&snapshot.page_rules, &template)?
        } else {
            engine::build_required_records(&snapshot.page_rules, &template)
        };
        let classification = engine::classify(&required.records, &snapshot.records);
        info!(
            zone = %snapshot.zone.name,
            required = classification.required.len(),
            satisfying = classification.satisfying.len(),
            conflicting = classification.conflicting.len(),
            missing = classification.missing.len(),
            fully_met = classification.fully_met,
            "classified live records"
        );
        Ok(Assessment {
            snapshot,
            required,
            classification,
        })
    }

    // ── Execute ─────────────────────────────────────────────────────

    /// Run every deletion, then every creation.
    ///
    /// A creation whose slot still holds a record that failed to delete is
    /// not attempted; the provider would reject it as a duplicate.
    pub async fn execute(&self, zone: &Zone, plan: &Plan) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        info!(
            zone = %zone.name,
            deletions = plan.deletions.len(),
            creations = plan.creations.len(),
            "executing plan"
        );

        let deletions = join_all(
            plan.deletions
                .iter()
                .map(|record| self.provider.delete_record(zone, record)),
        )
        .await;

        let mut blocked: HashSet<RecordKey> = HashSet::new();
        for (record, result) in plan.deletions.iter().zip(deletions) {
            if result.is_err() {
                blocked.insert(record.key());
            }
            report.record(Operation::DeleteRecord(record.clone()), result);
        }

        let (ready, held): (Vec<&DnsRecord>, Vec<&DnsRecord>) = plan
            .creations
            .iter()
            .partition(|record| !blocked.contains(&record.key()));

        for record in held {
            report.record(
                Operation::CreateRecord(record.clone()),
                Err(CoreError::Internal(format!(
                    "not attempted: a conflicting {} record could not be deleted",
                    record.key()
                ))),
            );
        }

        let creations = join_all(
            ready
                .iter()
                .map(|record| self.provider.create_record(zone, record)),
        )
        .await;
        for (record, result) in ready.into_iter().zip(creations) {
            report.record(Operation::CreateRecord(record.clone()), result.map(|_| ()));
        }

        report
    }

    /// Submit new Page Rules one at a time, in the given order.
    pub async fn create_page_rules(&self, zone: &Zone, rules: &[PageRule]) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for rule in rules {
            let result = self.provider.create_page_rule(zone, rule).await;
            report.record(Operation::CreatePageRule(rule.clone()), result.map(|_| ()));
        }
        report
    }

    // ── Full pass ───────────────────────────────────────────────────

    /// Fetch, classify, and, if the zone is unmet, plan and execute the
    /// strategy returned by `choose`.
    pub async fn run<F>(&self, zone: Zone, choose: F) -> Result<Outcome, CoreError>
    where
        F: FnOnce(&Assessment) -> Strategy + Send,
    {
        let snapshot = self.fetch(zone).await?;
        let assessment = self.assess(snapshot)?;
        if !assessment.needs_remediation() {
            return Ok(Outcome::AlreadyMet(assessment));
        }

        let strategy = choose(&assessment);
        info!(%strategy, "strategy chosen");
        if strategy == Strategy::Skip {
            return Ok(Outcome::Skipped(assessment));
        }

        let plan = assessment.plan(strategy);
        let report = self.execute(&assessment.snapshot.zone, &plan).await;
        Ok(Outcome::Executed {
            assessment,
            plan,
            report,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{PageRuleAction, RecordType, RedirectStatus, RuleStatus};

    /// In-memory provider recording the order of calls.
    #[derive(Default)]
    struct FakeProvider {
        rules: Vec<PageRule>,
        records: Mutex<Vec<DnsRecord>>,
        calls: Mutex<Vec<String>>,
        fail_delete: Option<String>,
        next_id: Mutex<u32>,
    }

    impl FakeProvider {
        fn new(rules: Vec<PageRule>, records: Vec<DnsRecord>) -> Self {
            Self {
                rules,
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ZoneProvider for FakeProvider {
        async fn find_zone(&self, name: &str) -> Result<Zone, CoreError> {
            Ok(Zone {
                id: "z1".into(),
                name: name.into(),
            })
        }

        async fn page_rules(&self, _zone: &Zone) -> Result<Vec<PageRule>, CoreError> {
            self.log("page_rules");
            Ok(self.rules.clone())
        }

        async fn dns_records(&self, _zone: &Zone) -> Result<Vec<DnsRecord>, CoreError> {
            self.log("dns_records");
            Ok(self.records.lock().unwrap().clone())
        }

        async fn create_record(&self, _zone: &Zone, record: &DnsRecord) -> Result<DnsRecord, CoreError> {
            self.log(format!("create {}", record.key()));
            let id = {
                let mut next = self.next_id.lock().unwrap();
                *next += 1;
                format!("new{next}")
            };
            let created = record.clone().with_id(id);
            self.records.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn delete_record(&self, _zone: &Zone, record: &DnsRecord) -> Result<(), CoreError> {
            self.log(format!("delete {}", record.key()));
            if record.id == self.fail_delete {
                return Err(CoreError::Api {
                    message: "locked".into(),
                    code: None,
                    status: Some(400),
                });
            }
            self.records.lock().unwrap().retain(|r| r.id != record.id);
            Ok(())
        }

        async fn create_page_rule(&self, _zone: &Zone, rule: &PageRule) -> Result<PageRule, CoreError> {
            self.log(format!("create rule {}", rule.target));
            let mut created = rule.clone();
            created.id = Some("pr-new".into());
            Ok(created)
        }
    }

    fn zone() -> Zone {
        Zone {
            id: "z1".into(),
            name: "example.com".into(),
        }
    }

    fn redirect_rule(target: &str) -> PageRule {
        PageRule {
            id: Some("pr1".into()),
            target: target.into(),
            actions: vec![PageRuleAction::ForwardingUrl {
                url: "https://example.org/".into(),
                status: RedirectStatus::MovedPermanently,
            }],
            priority: 1,
            status: RuleStatus::Active,
        }
    }

    fn stale_www() -> DnsRecord {
        DnsRecord::new(RecordType::Cname, "www.example.com", "old-target.com")
            .proxied(true)
            .with_id("r1")
    }

    #[test]
    fn page_rules_are_fetched_before_records() {
        let provider = FakeProvider::new(vec![redirect_rule("www.example.com/*")], vec![]);
        let reconciler = Reconciler::new(provider);
        tokio_test::block_on(reconciler.fetch(zone())).unwrap();
        assert_eq!(reconciler.provider().calls(), vec!["page_rules", "dns_records"]);
    }

    #[test]
    fn deletions_run_before_creations() {
        let provider = FakeProvider::new(vec![redirect_rule("www.example.com/*")], vec![stale_www()]);
        let reconciler = Reconciler::new(provider);

        let outcome =
            tokio_test::block_on(reconciler.run(zone(), |_| Strategy::RequiredOnly)).unwrap();
        let Outcome::Executed { plan, report, .. } = outcome else {
            panic!("expected execution");
        };
        assert_eq!(plan.len(), 2);
        assert!(report.is_success());
        let calls = reconciler.provider().calls();
        assert_eq!(
            calls[2..].to_vec(),
            vec!["delete CNAME www.example.com", "create CNAME www.example.com"]
        );
    }

    #[test]
    fn second_pass_finds_zone_met() {
        let provider = FakeProvider::new(
            vec![redirect_rule("www.example.com/*"), redirect_rule("example.com/old")],
            vec![stale_www()],
        );
        let reconciler = Reconciler::new(provider);

        tokio_test::block_on(reconciler.run(zone(), |_| Strategy::RequiredOnly)).unwrap();
        let again = tokio_test::block_on(reconciler.run(zone(), |_| -> Strategy {
            panic!("no strategy should be needed")
        }))
        .unwrap();
        assert!(matches!(again, Outcome::AlreadyMet(_)));
    }

    #[test]
    fn skip_leaves_zone_untouched() {
        let provider = FakeProvider::new(vec![redirect_rule("www.example.com/*")], vec![stale_www()]);
        let reconciler = Reconciler::new(provider);

        let outcome = tokio_test::block_on(reconciler.run(zone(), |a| {
            assert!(a.needs_remediation());
            Strategy::Skip
        }))
        .unwrap();
        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert_eq!(reconciler.provider().calls(), vec!["page_rules", "dns_records"]);
    }

    #[test]
    fn failed_deletion_holds_back_its_creation() {
        let mut provider =
            FakeProvider::new(vec![redirect_rule("www.example.com/*")], vec![stale_www()]);
        provider.fail_delete = Some("r1".into());
        let reconciler = Reconciler::new(provider);

        let snapshot = tokio_test::block_on(reconciler.fetch(zone())).unwrap();
        let assessment = reconciler.assess(snapshot).unwrap();
        let plan = assessment.plan(Strategy::RequiredOnly);
        let report = tokio_test::block_on(reconciler.execute(&zone(), &plan));

        assert!(report.completed.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[1].error.contains("not attempted"));
        assert!(
            !reconciler
                .provider()
                .calls()
                .iter()
                .any(|c| c.starts_with("create"))
        );
    }

    #[test]
    fn strict_mode_surfaces_ambiguity() {
        let mut disabled = redirect_rule("shop.example.com/old");
        disabled.status = RuleStatus::Disabled;
        let provider =
            FakeProvider::new(vec![redirect_rule("shop.example.com/*"), disabled], vec![]);
        let reconciler = Reconciler::new(provider).strict(true);

        let snapshot = tokio_test::block_on(reconciler.fetch(zone())).unwrap();
        assert!(matches!(
            reconciler.assess(snapshot),
            Err(CoreError::Ambiguous(_))
        ));
    }

    #[test]
    fn page_rules_are_created_in_order() {
        let reconciler = Reconciler::new(FakeProvider::default());
        let rules = vec![redirect_rule("example.com/a"), redirect_rule("example.com/b")];
        let report = tokio_test::block_on(reconciler.create_page_rules(&zone(), &rules));
        assert_eq!(report.completed.len(), 2);
        assert_eq!(
            reconciler.provider().calls(),
            vec!["create rule example.com/a", "create rule example.com/b"]
        );
    }
}
