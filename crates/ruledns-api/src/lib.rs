// ruledns-api: Async Rust client for the Cloudflare v4 REST API (zones, DNS records, Page Rules)

pub mod client;
pub mod dns_records;
pub mod error;
pub mod models;
pub mod page_rules;
pub mod transport;
pub mod zones;

pub use client::CloudflareClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
