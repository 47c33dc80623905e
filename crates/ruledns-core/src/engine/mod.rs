// ── Reconciliation engine ──
//
// Pure functions only: Page Rules → required records → classification of
// live records → remediation plan. Nothing in here performs I/O.

pub mod classify;
pub mod pattern;
pub mod plan;
pub mod redirect;
pub mod requirement;

pub use classify::{Classification, classify, has_conflicting_record, has_matching_record};
pub use plan::{Operation, Plan, Strategy, plan, plan_replace_all, plan_required};
pub use redirect::{
    ConvertedRules, ExportedRule, RejectedRedirect, page_rule_from_redirect,
    page_rules_from_description, page_rules_to_redirects, redirect_description, rules_to_create,
};
pub use requirement::{
    DEFAULT_PLACEHOLDER_ADDRESS, RecordTemplate, RejectedRule, RequiredRecords,
    build_required_records, build_required_records_strict, required_record_for,
};
