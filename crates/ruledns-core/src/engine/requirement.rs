// ── Requirement derivation ──
//
// Every Page Rule needs its target hostname to resolve through a proxied
// record, or the rule never sees traffic. The apex gets an address record
// pointing at a placeholder (the proxy answers, the origin is never
// contacted); every other host gets a CNAME to the apex.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr};

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, warn};

use super::pattern::{TargetPattern, is_within_zone};
use crate::error::{AmbiguousRequirementError, ConversionError};
use crate::model::{DnsRecord, PageRule, RecordKey, RecordType, normalize_host};

/// TEST-NET-1 address used as the apex placeholder.
pub const DEFAULT_PLACEHOLDER_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));

/// Zone-level inputs for synthesizing required records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTemplate {
    /// Zone apex, normalized.
    pub zone: String,
    /// Address the apex record points at. IPv6 yields an `AAAA` record.
    pub placeholder: IpAddr,
}

impl RecordTemplate {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: normalize_host(zone),
            placeholder: DEFAULT_PLACEHOLDER_ADDRESS,
        }
    }

    pub fn with_placeholder(mut self, placeholder: IpAddr) -> Self {
        self.placeholder = placeholder;
        self
    }
}

/// The record `rule`'s target hostname must resolve through.
///
/// Disabled rules still claim their hostname but do not need proxying.
pub fn required_record_for(
    rule: &PageRule,
    template: &RecordTemplate,
) -> Result<DnsRecord, ConversionError> {
    let pattern = TargetPattern::parse(&rule.target)?;
    if !is_within_zone(&pattern.host, &template.zone) {
        return Err(ConversionError::HostOutsideZone {
            host: pattern.host,
            zone: template.zone.clone(),
        });
    }

    let record = if pattern.host == template.zone {
        let record_type = match template.placeholder {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        };
        DnsRecord::new(record_type, &pattern.host, &template.placeholder.to_string())
    } else {
        DnsRecord::new(RecordType::Cname, &pattern.host, &template.zone)
    };

    Ok(record.proxied(rule.is_active()))
}

/// A rule whose target could not be mapped to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRule {
    pub rule: PageRule,
    pub error: ConversionError,
}

/// Deduplicated required records, in provider evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredRecords {
    pub records: Vec<DnsRecord>,
    pub rejected: Vec<RejectedRule>,
}

impl RequiredRecords {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Derive the required record set from `rules`.
///
/// Rules are visited highest priority first (ties keep input order). When
/// two rules imply different records for the same `(type, name)` slot,
/// the first one visited wins.
pub fn build_required_records(rules: &[PageRule], template: &RecordTemplate) -> RequiredRecords {
    let Ok(required) = derive(rules, template, |conflict| -> Result<(), Infallible> {
        debug!(
            key = %conflict.key,
            kept = %conflict.first_rule.target,
            ignored = %conflict.second_rule.target,
            "conflicting requirement resolved by rule order"
        );
        Ok(())
    });
    required
}

/// Like [`build_required_records`], but differing demands on one slot are
/// an error instead of being resolved by rule order.
pub fn build_required_records_strict(
    rules: &[PageRule],
    template: &RecordTemplate,
) -> Result<RequiredRecords, AmbiguousRequirementError> {
    derive(rules, template, |conflict| {
        Err(AmbiguousRequirementError {
            key: conflict.key.clone(),
            first_rule: conflict.first_rule.target.clone(),
            first: conflict.first.clone(),
            second_rule: conflict.second_rule.target.clone(),
            second: conflict.second.clone(),
        })
    })
}

/// Two rules demanding different records for one slot; `first_rule` was
/// visited first and holds the slot.
struct SlotConflict<'a> {
    key: &'a RecordKey,
    first_rule: &'a PageRule,
    first: &'a DnsRecord,
    second_rule: &'a PageRule,
    second: &'a DnsRecord,
}

fn derive<E>(
    rules: &[PageRule],
    template: &RecordTemplate,
    mut on_conflict: impl FnMut(SlotConflict<'_>) -> Result<(), E>,
) -> Result<RequiredRecords, E> {
    let mut ordered: Vec<&PageRule> = rules.iter().collect();
    ordered.sort_by_key(|r| std::cmp::Reverse(r.priority));

    let mut slots: IndexMap<RecordKey, (&PageRule, DnsRecord)> = IndexMap::new();
    let mut rejected = Vec::new();

    for rule in ordered {
        let record = match required_record_for(rule, template) {
            Ok(record) => record,
            Err(error) => {
                warn!(pattern = %rule.target, %error, "page rule does not map to a DNS record");
                rejected.push(RejectedRule {
                    rule: rule.clone(),
                    error,
                });
                continue;
            }
        };

        match slots.entry(record.key()) {
            Entry::Vacant(slot) => {
                slot.insert((rule, record));
            }
            Entry::Occupied(slot) => {
                let (winner, kept) = slot.get();
                if kept.same_content(&record) && kept.proxied == record.proxied {
                    continue;
                }
                on_conflict(SlotConflict {
                    key: slot.key(),
                    first_rule: winner,
                    first: kept,
                    second_rule: rule,
                    second: &record,
                })?;
            }
        }
    }

    Ok(RequiredRecords {
        records: slots.into_values().map(|(_, record)| record).collect(),
        rejected,
    })
}
