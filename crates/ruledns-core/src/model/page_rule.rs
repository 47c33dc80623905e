// ── Page Rule domain types ──
//
// The provider's action vocabulary is modelled as a closed enum. Actions
// this tool does not understand are kept as `Unsupported` so callers must
// handle them explicitly instead of falling through a string match.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RuleStatus {
    #[default]
    Active,
    Disabled,
}

/// HTTP status a `forwarding_url` action answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectStatus {
    /// 301
    MovedPermanently,
    /// 302
    Found,
}

impl RedirectStatus {
    pub fn code(self) -> u16 {
        match self {
            Self::MovedPermanently => 301,
            Self::Found => 302,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            301 => Some(Self::MovedPermanently),
            302 => Some(Self::Found),
            _ => None,
        }
    }
}

impl TryFrom<u16> for RedirectStatus {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unsupported redirect status {code}"))
    }
}

impl From<RedirectStatus> for u16 {
    fn from(status: RedirectStatus) -> Self {
        status.code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRuleAction {
    /// `forwarding_url`: redirect matching requests to `url`.
    ForwardingUrl { url: String, status: RedirectStatus },
    /// `always_use_https`: switch-style action without a value.
    AlwaysUseHttps,
    /// Any other action id, carried verbatim.
    Unsupported {
        id: String,
        value: Option<serde_json::Value>,
    },
}

impl PageRuleAction {
    /// Provider action id.
    pub fn id(&self) -> &str {
        match self {
            Self::ForwardingUrl { .. } => "forwarding_url",
            Self::AlwaysUseHttps => "always_use_https",
            Self::Unsupported { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRule {
    /// Provider id; `None` for rules built locally and not yet submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// URL match pattern, e.g. `www.example.com/blog/*`.
    pub target: String,
    pub actions: Vec<PageRuleAction>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub status: RuleStatus,
}

fn default_priority() -> i32 {
    1
}

impl PageRule {
    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }

    /// The forwarding action, if this rule is a plain redirect.
    pub fn forwarding(&self) -> Option<(&str, RedirectStatus)> {
        match self.actions.as_slice() {
            [PageRuleAction::ForwardingUrl { url, status }] => Some((url.as_str(), *status)),
            _ => None,
        }
    }
}
