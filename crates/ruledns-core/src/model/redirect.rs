// ── Redirect description types ──
//
// The human-authored source of truth, loaded from a JSON or YAML file by
// the CLI. New Page Rules are synthesized from these entries.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::page_rule::RedirectStatus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RedirectType {
    /// Permanent redirect (301).
    #[default]
    #[serde(alias = "forwarding")]
    #[strum(to_string = "permanent", serialize = "forwarding")]
    Permanent,
    /// Temporary redirect (302).
    #[serde(alias = "rewrite")]
    #[strum(to_string = "temporary", serialize = "rewrite")]
    Temporary,
}

impl RedirectType {
    pub fn status(self) -> RedirectStatus {
        match self {
            Self::Permanent => RedirectStatus::MovedPermanently,
            Self::Temporary => RedirectStatus::Found,
        }
    }

    pub fn from_status(status: RedirectStatus) -> Self {
        match status {
            RedirectStatus::MovedPermanently => Self::Permanent,
            RedirectStatus::Found => Self::Temporary,
        }
    }
}

/// One intended redirect.
///
/// `from` is either a path pattern (`/blog/*`), applied to the bare domain,
/// or a host-qualified pattern (`www.example.com/*`) under the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default)]
    pub redirect_type: RedirectType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectDescription {
    pub domain: String,
    #[serde(default)]
    pub redirects: Vec<Redirect>,
}
