// ── Redirect ⇄ Page Rule conversion ──
//
// A redirect's `from` is either path-form (`/blog/*`, applied to the bare
// domain) or host-form (`www.example.com/*`, which must sit under the
// domain). Export reverses the mapping: targets on the bare domain with no
// scheme or port come back as paths, everything else keeps its host. A
// host-form source naming the bare domain (`example.com/blog/*`) therefore
// exports as its path-form equivalent (`/blog/*`).

use serde::Serialize;
use tracing::debug;
use url::Url;

use super::pattern::{TargetPattern, is_within_zone, validate_domain};
use crate::error::{ConversionError, ValidationError};
use crate::model::{
    PageRule, PageRuleAction, Redirect, RedirectDescription, RedirectType, RuleStatus,
    normalize_host,
};

/// Build the Page Rule that implements one redirect on `domain`.
///
/// The rule is active with priority 1; use [`page_rules_from_description`]
/// to convert an ordered list with matching priorities.
pub fn page_rule_from_redirect(
    redirect: &Redirect,
    domain: &str,
) -> Result<PageRule, ConversionError> {
    let domain = validate_domain(domain)?;
    let target = resolve_source(&redirect.from, &domain)?;
    let url = validate_destination(&redirect.to)?;

    Ok(PageRule {
        id: None,
        target,
        actions: vec![PageRuleAction::ForwardingUrl {
            url,
            status: redirect.redirect_type.status(),
        }],
        priority: 1,
        status: RuleStatus::Active,
    })
}

/// A redirect that could not be converted, with its position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRedirect {
    pub index: usize,
    pub redirect: Redirect,
    pub error: ConversionError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedRules {
    pub rules: Vec<PageRule>,
    pub rejected: Vec<RejectedRedirect>,
}

/// Convert every redirect of a description, collecting per-entry failures.
///
/// Earlier entries get higher priority, so the provider evaluates them in
/// file order.
pub fn page_rules_from_description(description: &RedirectDescription) -> ConvertedRules {
    let total = description.redirects.len();
    let mut converted = ConvertedRules::default();

    for (index, redirect) in description.redirects.iter().enumerate() {
        match page_rule_from_redirect(redirect, &description.domain) {
            Ok(mut rule) => {
                rule.priority = i32::try_from(total - index).unwrap_or(i32::MAX);
                converted.rules.push(rule);
            }
            Err(error) => {
                debug!(index, from = %redirect.from, %error, "redirect rejected");
                converted.rejected.push(RejectedRedirect {
                    index,
                    redirect: redirect.clone(),
                    error,
                });
            }
        }
    }

    converted
}

/// One Page Rule as seen by export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportedRule {
    Redirect(Redirect),
    /// A rule whose actions are not a single forwarding redirect.
    Unsupported { target: String, actions: Vec<String> },
}

impl ExportedRule {
    pub fn as_redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirect(r) => Some(r),
            Self::Unsupported { .. } => None,
        }
    }
}

/// Map Page Rules back to redirect entries, in provider evaluation order.
///
/// Rules that are not plain forwarding redirects are reported as
/// [`ExportedRule::Unsupported`] rather than dropped.
pub fn page_rules_to_redirects(rules: &[PageRule], domain: &str) -> Vec<ExportedRule> {
    let mut ordered: Vec<&PageRule> = rules.iter().collect();
    ordered.sort_by_key(|r| std::cmp::Reverse(r.priority));

    ordered
        .into_iter()
        .map(|rule| match rule.forwarding() {
            Some((url, status)) => ExportedRule::Redirect(Redirect {
                from: source_for_target(&rule.target, domain),
                to: url.to_owned(),
                redirect_type: RedirectType::from_status(status),
            }),
            None => ExportedRule::Unsupported {
                target: rule.target.clone(),
                actions: rule.actions.iter().map(|a| a.id().to_owned()).collect(),
            },
        })
        .collect()
}

/// Collect the exported redirects into a description for `domain`.
pub fn redirect_description(rules: &[PageRule], domain: &str) -> RedirectDescription {
    RedirectDescription {
        domain: domain.to_owned(),
        redirects: page_rules_to_redirects(rules, domain)
            .into_iter()
            .filter_map(|exported| match exported {
                ExportedRule::Redirect(r) => Some(r),
                ExportedRule::Unsupported { .. } => None,
            })
            .collect(),
    }
}

/// Page Rules from `desired` that `existing` does not already contain.
///
/// Two rules are the same when their canonical targets and actions agree;
/// priority and status are not compared.
pub fn rules_to_create(existing: &[PageRule], desired: &[PageRule]) -> Vec<PageRule> {
    desired
        .iter()
        .filter(|want| {
            !existing.iter().any(|have| {
                canonical_target(&have.target) == canonical_target(&want.target)
                    && have.actions == want.actions
            })
        })
        .cloned()
        .collect()
}

// ── Helpers ─────────────────────────────────────────────────────────

fn resolve_source(from: &str, domain: &str) -> Result<String, ConversionError> {
    let from = from.trim();
    if from.is_empty() {
        return Err(ConversionError::InvalidSource {
            from: from.to_owned(),
            reason: "source is empty".into(),
        });
    }

    if from.starts_with('/') {
        if from.chars().any(char::is_whitespace) {
            return Err(ConversionError::InvalidSource {
                from: from.to_owned(),
                reason: "path contains whitespace".into(),
            });
        }
        return Ok(format!("{domain}{from}"));
    }

    let pattern = TargetPattern::parse(from).map_err(|e| ConversionError::InvalidSource {
        from: from.to_owned(),
        reason: e.to_string(),
    })?;
    if !is_within_zone(&pattern.host, domain) {
        return Err(ValidationError {
            from: from.to_owned(),
            domain: domain.to_owned(),
        }
        .into());
    }
    Ok(pattern.canonical())
}

fn validate_destination(to: &str) -> Result<String, ConversionError> {
    let to = to.trim();
    let url = Url::parse(to).map_err(|e| ConversionError::InvalidDestination {
        to: to.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConversionError::InvalidDestination {
            to: to.to_owned(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.host_str().is_none() {
        return Err(ConversionError::InvalidDestination {
            to: to.to_owned(),
            reason: "missing host".into(),
        });
    }
    // Keep the author's spelling: `$1` placeholders must survive untouched.
    Ok(to.to_owned())
}

/// Turn a target back into a redirect source: plain bare-domain targets
/// become path-form, all others keep their scheme, host and port.
fn source_for_target(target: &str, domain: &str) -> String {
    let Ok(pattern) = TargetPattern::parse(target) else {
        return target.trim().to_owned();
    };
    let domain = normalize_host(domain);
    if pattern.is_plain() && pattern.host == domain && !pattern.path.is_empty() {
        pattern.path
    } else {
        pattern.canonical()
    }
}

fn canonical_target(target: &str) -> String {
    TargetPattern::parse(target).map_or_else(|_| target.trim().to_owned(), |p| p.canonical())
}
