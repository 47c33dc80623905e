// Page Rule endpoints
//
// `GET /zones/{zone_id}/pagerules` is not paginated; the API returns
// rules ordered by priority, highest first.

use tracing::debug;

use crate::client::CloudflareClient;
use crate::error::Error;
use crate::models::{ApiPageRule, PageRuleRequest};

impl CloudflareClient {
    /// List every Page Rule of a zone.
    ///
    /// `GET /zones/{zone_id}/pagerules?order=priority&direction=desc`
    pub async fn list_page_rules(&self, zone_id: &str) -> Result<Vec<ApiPageRule>, Error> {
        let params = [
            ("order", "priority".to_owned()),
            ("direction", "desc".to_owned()),
        ];
        let rules: Vec<ApiPageRule> = self
            .get(&format!("zones/{zone_id}/pagerules"), &params)
            .await?;
        debug!(zone_id, count = rules.len(), "fetched page rules");
        Ok(rules)
    }

    /// Create one Page Rule.
    ///
    /// `POST /zones/{zone_id}/pagerules`
    pub async fn create_page_rule(
        &self,
        zone_id: &str,
        rule: &PageRuleRequest,
    ) -> Result<ApiPageRule, Error> {
        debug!(zone_id, priority = rule.priority, "creating page rule");
        self.post(&format!("zones/{zone_id}/pagerules"), rule).await
    }
}
