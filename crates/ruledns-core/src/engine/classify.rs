// ── Classification of live records ──
//
// Every live record lands in exactly one bucket: satisfying (same slot,
// same value), conflicting (same slot, different content or proxy flag),
// or unrelated (slot not required at all). TTL is never compared: the
// provider treats automatic TTL as compatible with any explicit value on
// proxied records.

use serde::Serialize;

use crate::model::DnsRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub required: Vec<DnsRecord>,
    pub satisfying: Vec<DnsRecord>,
    pub conflicting: Vec<DnsRecord>,
    pub unrelated: Vec<DnsRecord>,
    /// Required records with no satisfying live record.
    pub missing: Vec<DnsRecord>,
    pub fully_met: bool,
}

/// `live` fills the same slot as `required` with the same value.
pub fn record_matches(required: &DnsRecord, live: &DnsRecord) -> bool {
    required.key() == live.key()
        && required.same_content(live)
        && required.proxied == live.proxied
}

/// True iff some required record occupies `live`'s slot with its value.
pub fn has_matching_record(required: &[DnsRecord], live: &DnsRecord) -> bool {
    required.iter().any(|r| record_matches(r, live))
}

/// True iff some required record occupies `live`'s slot with a different
/// content or proxy flag.
pub fn has_conflicting_record(required: &[DnsRecord], live: &DnsRecord) -> bool {
    let key = live.key();
    required
        .iter()
        .any(|r| r.key() == key && !record_matches(r, live))
}

/// Partition `live` against `required`.
///
/// A record matching one required entry is satisfying even if another
/// required entry for the same slot disagrees; deduplicated input never
/// has such pairs.
pub fn classify(required: &[DnsRecord], live: &[DnsRecord]) -> Classification {
    let mut classification = Classification {
        required: required.to_vec(),
        ..Classification::default()
    };

    for record in live {
        let bucket = if has_matching_record(required, record) {
            &mut classification.satisfying
        } else if has_conflicting_record(required, record) {
            &mut classification.conflicting
        } else {
            &mut classification.unrelated
        };
        bucket.push(record.clone());
    }

    classification.missing = required
        .iter()
        .filter(|r| !live.iter().any(|l| record_matches(r, l)))
        .cloned()
        .collect();
    classification.fully_met =
        classification.missing.is_empty() && classification.conflicting.is_empty();

    classification
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{RecordType, Ttl};

    fn www(target: &str, proxied: bool) -> DnsRecord {
        DnsRecord::new(RecordType::Cname, "www.example.com", target).proxied(proxied)
    }

    fn required() -> Vec<DnsRecord> {
        vec![www("example.com", true)]
    }

    #[test]
    fn scenario_a_nothing_live() {
        let c = classify(&required(), &[]);
        assert!(!c.fully_met);
        assert!(c.conflicting.is_empty());
        assert_eq!(c.missing, required());
    }

    #[test]
    fn scenario_b_wrong_target_conflicts() {
        let live = vec![www("old-target.com", true).with_id("r1")];
        let c = classify(&required(), &live);
        assert!(!c.fully_met);
        assert_eq!(c.conflicting, live);
        assert_eq!(c.missing, required());
    }

    #[test]
    fn scenario_c_exact_match_is_met() {
        let live = vec![www("example.com", true).with_id("r1")];
        let c = classify(&required(), &live);
        assert!(c.fully_met);
        assert_eq!(c.satisfying, live);
        assert!(c.missing.is_empty());
    }

    #[test]
    fn ttl_is_ignored() {
        let live = www("example.com", true).with_ttl(Ttl::Seconds(300));
        assert!(has_matching_record(&required(), &live));
        assert!(!has_conflicting_record(&required(), &live));
    }

    #[test]
    fn proxy_flag_mismatch_conflicts() {
        let live = www("example.com", false);
        assert!(!has_matching_record(&required(), &live));
        assert!(has_conflicting_record(&required(), &live));
    }

    #[test]
    fn other_slots_are_unrelated() {
        let live = vec![
            DnsRecord::new(RecordType::Mx, "example.com", "mail.example.com"),
            DnsRecord::new(RecordType::Txt, "www.example.com", "v=spf1 -all"),
        ];
        let c = classify(&required(), &live);
        assert_eq!(c.unrelated, live);
        assert!(c.conflicting.is_empty());
        assert!(!has_conflicting_record(&required(), &live[0]));
    }

    #[test]
    fn hostname_content_compares_normalized() {
        let live = www("Example.COM.", true);
        assert!(has_matching_record(&required(), &live));
    }

    #[test]
    fn every_live_record_lands_in_exactly_one_bucket() {
        let required = vec![
            www("example.com", true),
            DnsRecord::new(RecordType::A, "example.com", "192.0.2.1").proxied(true),
        ];
        let live = vec![
            www("example.com", true),
            www("elsewhere.net", true),
            DnsRecord::new(RecordType::A, "example.com", "203.0.113.7").proxied(true),
            DnsRecord::new(RecordType::A, "example.com", "192.0.2.1").proxied(true),
            DnsRecord::new(RecordType::Aaaa, "example.com", "2001:db8::1"),
            DnsRecord::new(RecordType::Txt, "example.com", "hello"),
        ];
        let c = classify(&required, &live);

        for record in &live {
            let hits = [&c.satisfying, &c.conflicting, &c.unrelated]
                .iter()
                .map(|bucket| bucket.iter().filter(|r| *r == record).count())
                .sum::<usize>();
            assert_eq!(hits, 1, "{record} counted {hits} times");
        }
        assert_eq!(
            c.satisfying.len() + c.conflicting.len() + c.unrelated.len(),
            live.len()
        );
        assert_eq!(c.satisfying.len(), 2);
        assert_eq!(c.conflicting.len(), 2);
        assert!(c.missing.is_empty());
        assert!(!c.fully_met, "conflicts alone break fully_met");
    }

    #[test]
    fn empty_requirements_leave_everything_unrelated() {
        let live = vec![www("example.com", true)];
        let c = classify(&[], &live);
        assert!(c.fully_met);
        assert_eq!(c.unrelated, live);
    }
}
