// ruledns-core: Page Rule / DNS reconciliation engine, provider seam, and workflow.

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod model;
pub mod provider;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ProviderConfig, TlsVerification};
pub use error::{AmbiguousRequirementError, ConversionError, CoreError, ValidationError};
pub use provider::{CloudflareProvider, ZoneProvider};
pub use workflow::{
    Assessment, ExecutionReport, FailedOperation, Outcome, Reconciler, ZoneSnapshot,
};

pub use engine::{Classification, ExportedRule, Operation, Plan, RecordTemplate, Strategy};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DnsRecord, PageRule, PageRuleAction, RecordKey, RecordType, Redirect, RedirectDescription,
    RedirectStatus, RedirectType, RuleStatus, Ttl, Zone,
};
