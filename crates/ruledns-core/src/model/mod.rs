// ── Domain model ──
//
// Canonical representations of zones, DNS records, Page Rules, and
// redirect descriptions. Provider wire types live in `ruledns_api::models`
// and are mapped into these by `crate::convert`.

pub mod page_rule;
pub mod record;
pub mod redirect;
pub mod zone;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use ruledns_core::model::*` gives you everything.

pub use page_rule::{PageRule, PageRuleAction, RedirectStatus, RuleStatus};
pub use record::{DnsRecord, RecordKey, RecordType, Ttl, normalize_host};
pub use redirect::{Redirect, RedirectDescription, RedirectType};
pub use zone::Zone;
