// ── Page Rule target patterns ──
//
// A target looks like `[scheme://]host[:port][/path]`, where the host may
// start with a `*` label and the path may contain `*` anywhere. Only the
// hostname matters for DNS; the path is carried for redirect export.

use crate::error::ConversionError;
use crate::model::normalize_host;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPattern {
    /// Lowercased scheme when the target names one (`http`, `https`).
    pub scheme: Option<String>,
    /// Normalized hostname, possibly with a leading `*.` label.
    pub host: String,
    pub port: Option<u16>,
    /// Path pattern including its leading `/`, or empty.
    pub path: String,
}

impl TargetPattern {
    pub fn parse(raw: &str) -> Result<Self, ConversionError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| ConversionError::InvalidTarget {
            target: raw.to_owned(),
            reason: reason.to_owned(),
        };

        let (scheme, rest) = split_scheme(trimmed);
        if scheme
            .as_deref()
            .is_some_and(|s| !matches!(s, "http" | "https"))
        {
            return Err(invalid("scheme must be http or https"));
        }
        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        let (host_part, port) = match authority.split_once(':') {
            Some((host, port)) => {
                let port: u16 = port.parse().map_err(|_| invalid("invalid port"))?;
                if port == 0 {
                    return Err(invalid("invalid port"));
                }
                (host, Some(port))
            }
            None => (authority, None),
        };
        let host = normalize_host(host_part);

        validate_host(&host).map_err(|reason| match reason {
            HostProblem::Wildcard => ConversionError::UnsupportedWildcard {
                target: raw.to_owned(),
            },
            HostProblem::Invalid(reason) => invalid(reason),
        })?;

        if path.chars().any(char::is_whitespace) {
            return Err(invalid("path contains whitespace"));
        }

        Ok(Self {
            scheme,
            host,
            port,
            path: path.to_owned(),
        })
    }

    pub fn is_wildcard(&self) -> bool {
        self.host.starts_with("*.")
    }

    /// Whether the pattern is just a host plus path, with no scheme or port.
    pub fn is_plain(&self) -> bool {
        self.scheme.is_none() && self.port.is_none()
    }

    /// `[scheme://]host[:port]path`: the canonical target string.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        if let Some(ref scheme) = self.scheme {
            out.push_str(scheme);
            out.push_str("://");
        }
        out.push_str(&self.host);
        if let Some(port) = self.port {
            out.push(':');
            out.push_str(&port.to_string());
        }
        out.push_str(&self.path);
        out
    }
}

/// True when `host` is `zone` itself or any name below it.
pub fn is_within_zone(host: &str, zone: &str) -> bool {
    let host = normalize_host(host);
    let zone = normalize_host(zone);
    host == zone
        || host
            .strip_suffix(zone.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Check that `domain` is a plain hostname usable as a zone apex.
pub fn validate_domain(domain: &str) -> Result<String, ConversionError> {
    let normalized = normalize_host(domain);
    match validate_host(&normalized) {
        Ok(()) if !normalized.contains('*') => Ok(normalized),
        Ok(()) | Err(HostProblem::Wildcard) => Err(ConversionError::InvalidDomain {
            domain: domain.to_owned(),
            reason: "wildcards are not allowed in a domain".into(),
        }),
        Err(HostProblem::Invalid(reason)) => Err(ConversionError::InvalidDomain {
            domain: domain.to_owned(),
            reason: reason.to_owned(),
        }),
    }
}

fn split_scheme(target: &str) -> (Option<String>, &str) {
    match target.split_once("://") {
        Some((scheme, rest)) if !scheme.contains('/') => (Some(scheme.to_ascii_lowercase()), rest),
        _ => (None, target),
    }
}

enum HostProblem {
    Wildcard,
    Invalid(&'static str),
}

fn validate_host(host: &str) -> Result<(), HostProblem> {
    if host.is_empty() {
        return Err(HostProblem::Invalid("missing hostname"));
    }
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return Err(HostProblem::Invalid("hostname needs at least two labels"));
    }
    for (i, label) in labels.iter().enumerate() {
        if label.is_empty() {
            return Err(HostProblem::Invalid("empty label"));
        }
        if *label == "*" && i == 0 {
            continue;
        }
        if label.contains('*') {
            return Err(HostProblem::Wildcard);
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(HostProblem::Invalid("invalid character in hostname"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(HostProblem::Invalid("label starts or ends with '-'"));
        }
    }
    if labels.len() == 2 && labels.first() == Some(&"*") {
        return Err(HostProblem::Invalid("wildcard needs a parent domain"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheme_port_and_path() {
        let p = TargetPattern::parse("HTTPS://WWW.Example.com:8443/blog/*").unwrap();
        assert_eq!(p.scheme.as_deref(), Some("https"));
        assert_eq!(p.host, "www.example.com");
        assert_eq!(p.port, Some(8443));
        assert_eq!(p.path, "/blog/*");
        assert!(!p.is_plain());
        assert_eq!(p.canonical(), "https://www.example.com:8443/blog/*");
    }

    #[test]
    fn scheme_and_port_distinguish_targets() {
        let plain = TargetPattern::parse("www.example.com/*").unwrap();
        let http = TargetPattern::parse("http://www.example.com/*").unwrap();
        let port = TargetPattern::parse("www.example.com:8443/*").unwrap();
        assert!(plain.is_plain());
        assert_eq!(http.canonical(), "http://www.example.com/*");
        assert_eq!(port.canonical(), "www.example.com:8443/*");
        assert_ne!(plain.canonical(), http.canonical());
        assert_ne!(plain.canonical(), port.canonical());
    }

    #[test]
    fn bad_scheme_or_port_is_rejected() {
        for bad in ["ftp://example.com/*", "example.com:http/*", "example.com:0/", "example.com:70000"] {
            assert!(
                matches!(
                    TargetPattern::parse(bad),
                    Err(ConversionError::InvalidTarget { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn bare_host_has_empty_path() {
        let p = TargetPattern::parse("example.com").unwrap();
        assert_eq!(p.host, "example.com");
        assert_eq!(p.path, "");
    }

    #[test]
    fn scheme_inside_path_is_not_stripped() {
        let p = TargetPattern::parse("example.com/go?u=http://x").unwrap();
        assert_eq!(p.host, "example.com");
        assert_eq!(p.path, "/go?u=http://x");
    }

    #[test]
    fn leading_wildcard_label_is_accepted() {
        let p = TargetPattern::parse("*.example.com/*").unwrap();
        assert!(p.is_wildcard());
        assert_eq!(p.host, "*.example.com");
    }

    #[test]
    fn partial_wildcards_are_rejected() {
        assert!(matches!(
            TargetPattern::parse("*example.com/*"),
            Err(ConversionError::UnsupportedWildcard { .. })
        ));
        assert!(matches!(
            TargetPattern::parse("shop.*.example.com"),
            Err(ConversionError::UnsupportedWildcard { .. })
        ));
    }

    #[test]
    fn malformed_hosts_are_rejected() {
        for bad in ["", "/only/a/path", "localhost", "exa mple.com", "a..example.com", "*.com"] {
            assert!(
                matches!(
                    TargetPattern::parse(bad),
                    Err(ConversionError::InvalidTarget { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn zone_membership_respects_label_boundaries() {
        assert!(is_within_zone("example.com", "example.com"));
        assert!(is_within_zone("shop.example.com", "Example.com."));
        assert!(is_within_zone("*.example.com", "example.com"));
        assert!(!is_within_zone("badexample.com", "example.com"));
        assert!(!is_within_zone("example.org", "example.com"));
    }

    #[test]
    fn domains_must_be_plain_hosts() {
        assert_eq!(validate_domain("Example.COM.").unwrap(), "example.com");
        assert!(validate_domain("*.example.com").is_err());
        assert!(validate_domain("not a domain").is_err());
    }
}
