// Cloudflare v4 response and request types
//
// Every response is wrapped in the `ApiResponse<T>` envelope. Fields the
// tool never inspects are left out; optional ones use `#[serde(default)]`
// because list and detail endpoints disagree about which are present.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard Cloudflare v4 response envelope.
///
/// ```json
/// { "success": true, "errors": [], "messages": [], "result": ..., "result_info": {...} }
/// ```
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

/// One entry of the envelope's `errors` (or `messages`) array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

/// Pagination block returned by list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: u32,
}

// ── Zone ─────────────────────────────────────────────────────────────

/// Zone object from `GET /zones`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

// ── DNS record ───────────────────────────────────────────────────────

/// DNS record from `GET /zones/{zone_id}/dns_records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    /// `1` means "automatic".
    #[serde(default = "automatic_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub proxiable: Option<bool>,
    #[serde(default)]
    pub priority: Option<u16>,
}

fn automatic_ttl() -> u32 {
    1
}

/// Body for `POST /zones/{zone_id}/dns_records`.
#[derive(Debug, Clone, Serialize)]
pub struct DnsRecordRequest {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

/// Body of a successful delete: `{ "id": "..." }`.
#[derive(Debug, Deserialize)]
pub struct DeletedId {
    pub id: String,
}

// ── Page Rule ────────────────────────────────────────────────────────

/// Page Rule from `GET /zones/{zone_id}/pagerules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPageRule {
    pub id: String,
    pub targets: Vec<ApiPageRuleTarget>,
    pub actions: Vec<ApiPageRuleAction>,
    #[serde(default)]
    pub priority: i32,
    /// `"active"` or `"disabled"`.
    pub status: String,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub modified_on: Option<String>,
}

/// Body for `POST /zones/{zone_id}/pagerules`.
#[derive(Debug, Clone, Serialize)]
pub struct PageRuleRequest {
    pub targets: Vec<ApiPageRuleTarget>,
    pub actions: Vec<ApiPageRuleAction>,
    pub priority: i32,
    pub status: String,
}

/// A Page Rule target. The API only knows `target: "url"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPageRuleTarget {
    pub target: String,
    pub constraint: ApiConstraint,
}

impl ApiPageRuleTarget {
    /// A `url matches <pattern>` target.
    pub fn url_matches(pattern: impl Into<String>) -> Self {
        Self {
            target: "url".into(),
            constraint: ApiConstraint {
                operator: "matches".into(),
                value: pattern.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConstraint {
    pub operator: String,
    pub value: String,
}

/// A Page Rule action. `value` is action-specific and absent for
/// switch-style actions like `always_use_https`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPageRuleAction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Value of a `forwarding_url` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingUrlValue {
    pub url: String,
    pub status_code: u16,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dns_record_defaults_to_automatic_ttl() {
        let record: ApiDnsRecord = serde_json::from_value(serde_json::json!({
            "id": "rec1",
            "type": "CNAME",
            "name": "www.example.com",
            "content": "example.com"
        }))
        .unwrap();
        assert_eq!(record.ttl, 1);
        assert!(!record.proxied);
    }

    #[test]
    fn switch_actions_serialize_without_value() {
        let action = ApiPageRuleAction {
            id: "always_use_https".into(),
            value: None,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "always_use_https" }));
    }

    #[test]
    fn envelope_without_result_decodes_for_any_payload() {
        let envelope: ApiResponse<ApiZone> = serde_json::from_value(serde_json::json!({
            "success": false,
            "errors": [{ "code": 1003, "message": "Invalid zone" }]
        }))
        .unwrap();
        assert!(envelope.result.is_none());
        assert_eq!(envelope.errors[0].code, Some(1003));
    }
}
