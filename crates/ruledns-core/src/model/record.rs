// ── DNS record domain types ──
//
// A `DnsRecord` is either synthesized from a Page Rule (no id) or taken
// verbatim from the provider (carries the provider's id). Comparison
// identity is the `(type, name)` slot; content, proxied, and TTL are
// attributes compared by policy in `engine::classify`.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── RecordType ──────────────────────────────────────────────────────

/// DNS record type. Types the tool never reasons about are kept verbatim
/// in `Other` so live records round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Txt,
    Mx,
    Ns,
    Srv,
    Caa,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Txt => "TXT",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Other(s) => s,
        }
    }

    /// Types whose content is a hostname and compares case-insensitively.
    fn has_host_content(&self) -> bool {
        matches!(self, Self::Cname | Self::Ns | Self::Mx)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "TXT" => Self::Txt,
            "MX" => Self::Mx,
            "NS" => Self::Ns,
            "SRV" => Self::Srv,
            "CAA" => Self::Caa,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_owned()
    }
}

// ── Ttl ─────────────────────────────────────────────────────────────

/// Record TTL. The provider encodes "automatic" as `1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Ttl {
    #[default]
    Automatic,
    Seconds(u32),
}

impl From<u32> for Ttl {
    fn from(raw: u32) -> Self {
        match raw {
            0 | 1 => Self::Automatic,
            secs => Self::Seconds(secs),
        }
    }
}

impl From<Ttl> for u32 {
    fn from(ttl: Ttl) -> Self {
        match ttl {
            Ttl::Automatic => 1,
            Ttl::Seconds(secs) => secs,
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => f.write_str("auto"),
            Self::Seconds(secs) => write!(f, "{secs}"),
        }
    }
}

// ── RecordKey ───────────────────────────────────────────────────────

/// The `(type, name)` slot a record occupies. Names are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub record_type: RecordType,
    pub name: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.record_type, self.name)
    }
}

// ── DnsRecord ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider id; `None` for records synthesized from Page Rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Ttl,
    #[serde(default)]
    pub proxied: bool,
}

impl DnsRecord {
    /// Build a record with normalized name (and hostname content),
    /// automatic TTL, and no proxying.
    pub fn new(record_type: RecordType, name: &str, content: &str) -> Self {
        let content = if record_type.has_host_content() {
            normalize_host(content)
        } else {
            content.trim().to_owned()
        };
        Self {
            id: None,
            record_type,
            name: normalize_host(name),
            content,
            ttl: Ttl::Automatic,
            proxied: false,
        }
    }

    pub fn proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            record_type: self.record_type.clone(),
            name: normalize_host(&self.name),
        }
    }

    /// Content equality under the type's comparison rules: hostnames are
    /// case- and trailing-dot-insensitive, addresses compare parsed.
    pub fn same_content(&self, other: &Self) -> bool {
        if self.record_type.has_host_content() {
            return normalize_host(&self.content) == normalize_host(&other.content);
        }
        match (
            self.content.trim().parse::<IpAddr>(),
            other.content.trim().parse::<IpAddr>(),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.content.trim() == other.content.trim(),
        }
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}{}",
            self.record_type,
            self.name,
            self.content,
            if self.proxied { " (proxied)" } else { "" }
        )
    }
}

/// Lowercase, trim whitespace and the trailing root dot.
pub fn normalize_host(raw: &str) -> String {
    raw.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_parses_case_insensitively() {
        assert_eq!("cname".parse::<RecordType>(), Ok(RecordType::Cname));
        assert_eq!("AAAA".parse::<RecordType>(), Ok(RecordType::Aaaa));
        assert_eq!(
            "https".parse::<RecordType>(),
            Ok(RecordType::Other("HTTPS".into()))
        );
        assert_eq!(RecordType::Other("HTTPS".into()).to_string(), "HTTPS");
    }

    #[test]
    fn ttl_one_is_automatic() {
        assert_eq!(Ttl::from(1), Ttl::Automatic);
        assert_eq!(Ttl::from(300), Ttl::Seconds(300));
        assert_eq!(u32::from(Ttl::Automatic), 1);
    }

    #[test]
    fn names_and_host_content_are_normalized() {
        let r = DnsRecord::new(RecordType::Cname, "WWW.Example.com.", "Example.COM.");
        assert_eq!(r.name, "www.example.com");
        assert_eq!(r.content, "example.com");
    }

    #[test]
    fn txt_content_keeps_case() {
        let r = DnsRecord::new(RecordType::Txt, "example.com", "v=spf1 Include:x ~all");
        assert_eq!(r.content, "v=spf1 Include:x ~all");
    }

    #[test]
    fn ipv6_content_compares_parsed() {
        let a = DnsRecord::new(RecordType::Aaaa, "example.com", "2001:db8::1");
        let b = DnsRecord::new(RecordType::Aaaa, "example.com", "2001:0db8:0:0::1");
        assert!(a.same_content(&b));
    }

    #[test]
    fn key_ignores_name_case() {
        let mut a = DnsRecord::new(RecordType::A, "example.com", "192.0.2.1");
        a.name = "EXAMPLE.com.".into();
        let b = DnsRecord::new(RecordType::A, "example.com", "192.0.2.1");
        assert_eq!(a.key(), b.key());
    }
}
