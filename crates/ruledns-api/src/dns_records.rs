// DNS record endpoints
//
// Listing is paginated (`page` / `per_page` with a `result_info` block);
// `list_dns_records` walks every page so callers always see the full zone.

use tracing::debug;

use crate::client::CloudflareClient;
use crate::error::Error;
use crate::models::{ApiDnsRecord, DeletedId, DnsRecordRequest};

/// Page size used when walking `dns_records`.
const PER_PAGE: u32 = 100;

impl CloudflareClient {
    /// List every DNS record of a zone, following pagination.
    ///
    /// `GET /zones/{zone_id}/dns_records?page={n}&per_page=100`
    pub async fn list_dns_records(&self, zone_id: &str) -> Result<Vec<ApiDnsRecord>, Error> {
        let path = format!("zones/{zone_id}/dns_records");
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let params = [("page", page.to_string()), ("per_page", PER_PAGE.to_string())];
            let (records, info): (Vec<ApiDnsRecord>, _) = self.get_page(&path, &params).await?;
            let received = records.len();
            all.extend(records);

            let total_pages = info.map_or(1, |i| i.total_pages);
            if received == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        debug!(zone_id, count = all.len(), "fetched DNS records");
        Ok(all)
    }

    /// Create one DNS record.
    ///
    /// `POST /zones/{zone_id}/dns_records`
    pub async fn create_dns_record(
        &self,
        zone_id: &str,
        record: &DnsRecordRequest,
    ) -> Result<ApiDnsRecord, Error> {
        debug!(zone_id, name = %record.name, record_type = %record.record_type, "creating DNS record");
        self.post(&format!("zones/{zone_id}/dns_records"), record)
            .await
    }

    /// Delete one DNS record by id.
    ///
    /// `DELETE /zones/{zone_id}/dns_records/{record_id}`
    pub async fn delete_dns_record(&self, zone_id: &str, record_id: &str) -> Result<(), Error> {
        debug!(zone_id, record_id, "deleting DNS record");
        let _: DeletedId = self
            .delete(&format!("zones/{zone_id}/dns_records/{record_id}"))
            .await?;
        Ok(())
    }
}
