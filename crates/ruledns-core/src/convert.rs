// ── API-to-domain type conversions ──
//
// Bridges raw `ruledns_api::models` types into `crate::model` and back.
// Action payloads are decoded into the closed `PageRuleAction` enum here;
// anything unrecognized, including a malformed `forwarding_url`, is kept
// verbatim as `Unsupported`.

use ruledns_api::models::{
    ApiDnsRecord, ApiPageRule, ApiPageRuleAction, ApiPageRuleTarget, ApiZone, DnsRecordRequest,
    ForwardingUrlValue, PageRuleRequest,
};

use crate::model::{
    DnsRecord, PageRule, PageRuleAction, RecordType, RedirectStatus, RuleStatus, Ttl, Zone,
    normalize_host,
};

// ── Zone ───────────────────────────────────────────────────────────

impl From<ApiZone> for Zone {
    fn from(z: ApiZone) -> Self {
        Zone {
            id: z.id,
            name: normalize_host(&z.name),
        }
    }
}

// ── DNS record ─────────────────────────────────────────────────────

impl From<ApiDnsRecord> for DnsRecord {
    fn from(r: ApiDnsRecord) -> Self {
        let record_type: RecordType = r.record_type.into();
        DnsRecord::new(record_type, &r.name, &r.content)
            .proxied(r.proxied)
            .with_ttl(Ttl::from(r.ttl))
            .with_id(r.id)
    }
}

impl From<&DnsRecord> for DnsRecordRequest {
    fn from(r: &DnsRecord) -> Self {
        DnsRecordRequest {
            record_type: r.record_type.to_string(),
            name: r.name.clone(),
            content: r.content.clone(),
            ttl: r.ttl.into(),
            proxied: r.proxied,
        }
    }
}

// ── Page Rule ──────────────────────────────────────────────────────

impl From<ApiPageRule> for PageRule {
    fn from(r: ApiPageRule) -> Self {
        let target = r
            .targets
            .into_iter()
            .find(|t| t.target == "url")
            .map(|t| t.constraint.value)
            .unwrap_or_default();

        PageRule {
            id: Some(r.id),
            target,
            actions: r.actions.into_iter().map(PageRuleAction::from).collect(),
            priority: r.priority,
            status: r.status.parse().unwrap_or(RuleStatus::Disabled),
        }
    }
}

impl From<&PageRule> for PageRuleRequest {
    fn from(r: &PageRule) -> Self {
        PageRuleRequest {
            targets: vec![ApiPageRuleTarget::url_matches(r.target.clone())],
            actions: r.actions.iter().map(ApiPageRuleAction::from).collect(),
            priority: r.priority,
            status: r.status.to_string(),
        }
    }
}

impl From<ApiPageRuleAction> for PageRuleAction {
    fn from(a: ApiPageRuleAction) -> Self {
        match a.id.as_str() {
            "forwarding_url" => {
                let decoded = a
                    .value
                    .clone()
                    .and_then(|v| serde_json::from_value::<ForwardingUrlValue>(v).ok())
                    .and_then(|v| {
                        RedirectStatus::from_code(v.status_code).map(|status| (v.url, status))
                    });
                match decoded {
                    Some((url, status)) => PageRuleAction::ForwardingUrl { url, status },
                    None => PageRuleAction::Unsupported {
                        id: a.id,
                        value: a.value,
                    },
                }
            }
            "always_use_https" => PageRuleAction::AlwaysUseHttps,
            _ => PageRuleAction::Unsupported {
                id: a.id,
                value: a.value,
            },
        }
    }
}

impl From<&PageRuleAction> for ApiPageRuleAction {
    fn from(a: &PageRuleAction) -> Self {
        let value = match a {
            PageRuleAction::ForwardingUrl { url, status } => Some(serde_json::json!({
                "url": url,
                "status_code": status.code(),
            })),
            PageRuleAction::AlwaysUseHttps => None,
            PageRuleAction::Unsupported { value, .. } => value.clone(),
        };
        ApiPageRuleAction {
            id: a.id().to_owned(),
            value,
        }
    }
}
