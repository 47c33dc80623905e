// ── Remediation planning ──
//
// Plans are pure functions of a classification. Deletions are listed
// before creations and must be executed first: the provider rejects a
// create for a slot that still holds a conflicting record.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::classify::{Classification, has_matching_record};
use crate::model::{DnsRecord, PageRule};

/// How to remediate an unmet classification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    /// Delete conflicting records, create missing ones. Nothing else moves.
    #[default]
    RequiredOnly,
    /// Delete every live record that is not an exact required match.
    ReplaceAll,
    /// Leave the zone alone.
    Skip,
}

impl Strategy {
    /// Whether this strategy can delete records the Page Rules never named.
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::ReplaceAll)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub deletions: Vec<DnsRecord>,
    pub creations: Vec<DnsRecord>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.creations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deletions.len() + self.creations.len()
    }

    /// Operations in execution order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.deletions
            .iter()
            .cloned()
            .map(Operation::DeleteRecord)
            .chain(self.creations.iter().cloned().map(Operation::CreateRecord))
    }
}

/// One provider mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "item", rename_all = "snake_case")]
pub enum Operation {
    DeleteRecord(DnsRecord),
    CreateRecord(DnsRecord),
    CreatePageRule(PageRule),
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeleteRecord(r) => write!(f, "delete {r}"),
            Self::CreateRecord(r) => write!(f, "create {r}"),
            Self::CreatePageRule(rule) => write!(f, "create page rule {}", rule.target),
        }
    }
}

/// Minimal-disruption plan: remove conflicts, add what is missing.
pub fn plan_required(classification: &Classification) -> Plan {
    Plan {
        deletions: classification.conflicting.clone(),
        creations: classification.missing.clone(),
    }
}

/// Full replacement of the zone's record set.
///
/// Every live record is deleted unless it already matches a required
/// record exactly; deleting and recreating an identical record would be a
/// no-op, so satisfied slots produce no operations. Unrelated records
/// (mail, verification TXT, ...) ARE deleted.
pub fn plan_replace_all(classification: &Classification, live: &[DnsRecord]) -> Plan {
    Plan {
        deletions: live
            .iter()
            .filter(|r| !has_matching_record(&classification.required, r))
            .cloned()
            .collect(),
        creations: classification.missing.clone(),
    }
}

/// Dispatch on `strategy`. `Skip` yields an empty plan.
pub fn plan(strategy: Strategy, classification: &Classification, live: &[DnsRecord]) -> Plan {
    match strategy {
        Strategy::RequiredOnly => plan_required(classification),
        Strategy::ReplaceAll => plan_replace_all(classification, live),
        Strategy::Skip => Plan::default(),
    }
}
