// ── Provider seam ──
//
// The workflow talks to the DNS/CDN provider only through `ZoneProvider`.
// `CloudflareProvider` is the production implementation; tests drive the
// workflow with an in-memory fake.

use std::future::Future;

use tracing::debug;

use ruledns_api::CloudflareClient;
use ruledns_api::models::{DnsRecordRequest, PageRuleRequest};

use crate::config::ProviderConfig;
use crate::error::CoreError;
use crate::model::{DnsRecord, PageRule, Zone, normalize_host};

/// Read and mutate one provider account's zones.
pub trait ZoneProvider: Send + Sync {
    /// Resolve a zone by its apex name.
    fn find_zone(&self, name: &str) -> impl Future<Output = Result<Zone, CoreError>> + Send;

    fn page_rules(&self, zone: &Zone)
    -> impl Future<Output = Result<Vec<PageRule>, CoreError>> + Send;

    fn dns_records(
        &self,
        zone: &Zone,
    ) -> impl Future<Output = Result<Vec<DnsRecord>, CoreError>> + Send;

    /// Create `record`, returning it with the provider-assigned id.
    fn create_record(
        &self,
        zone: &Zone,
        record: &DnsRecord,
    ) -> impl Future<Output = Result<DnsRecord, CoreError>> + Send;

    /// Delete a live record. Fails with `MissingRecordId` for records
    /// that were never fetched from the provider.
    fn delete_record(
        &self,
        zone: &Zone,
        record: &DnsRecord,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn create_page_rule(
        &self,
        zone: &Zone,
        rule: &PageRule,
    ) -> impl Future<Output = Result<PageRule, CoreError>> + Send;
}

/// `ZoneProvider` backed by the Cloudflare v4 API.
pub struct CloudflareProvider {
    client: CloudflareClient,
}

impl CloudflareProvider {
    pub fn connect(config: &ProviderConfig) -> Result<Self, CoreError> {
        let client = CloudflareClient::from_token(
            config.api_url.as_str(),
            &config.api_token,
            &config.transport(),
        )?;
        Ok(Self { client })
    }

    pub fn from_client(client: CloudflareClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CloudflareClient {
        &self.client
    }
}

impl ZoneProvider for CloudflareProvider {
    async fn find_zone(&self, name: &str) -> Result<Zone, CoreError> {
        let wanted = normalize_host(name);
        let zones = self.client.list_zones(Some(&wanted)).await?;
        debug!(name = %wanted, matches = zones.len(), "zone lookup");
        zones
            .into_iter()
            .map(Zone::from)
            .find(|z| z.name == wanted)
            .ok_or(CoreError::ZoneNotFound { name: wanted })
    }

    async fn page_rules(&self, zone: &Zone) -> Result<Vec<PageRule>, CoreError> {
        let rules = self.client.list_page_rules(&zone.id).await?;
        Ok(rules.into_iter().map(PageRule::from).collect())
    }

    async fn dns_records(&self, zone: &Zone) -> Result<Vec<DnsRecord>, CoreError> {
        let records = self.client.list_dns_records(&zone.id).await?;
        Ok(records.into_iter().map(DnsRecord::from).collect())
    }

    async fn create_record(&self, zone: &Zone, record: &DnsRecord) -> Result<DnsRecord, CoreError> {
        let created = self
            .client
            .create_dns_record(&zone.id, &DnsRecordRequest::from(record))
            .await?;
        Ok(created.into())
    }

    async fn delete_record(&self, zone: &Zone, record: &DnsRecord) -> Result<(), CoreError> {
        let Some(id) = record.id.as_deref() else {
            return Err(CoreError::MissingRecordId {
                record: record.clone(),
            });
        };
        self.client.delete_dns_record(&zone.id, id).await?;
        Ok(())
    }

    async fn create_page_rule(&self, zone: &Zone, rule: &PageRule) -> Result<PageRule, CoreError> {
        let created = self
            .client
            .create_page_rule(&zone.id, &PageRuleRequest::from(rule))
            .await?;
        Ok(created.into())
    }
}
