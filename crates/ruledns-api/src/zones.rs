// Zone endpoints
//
// Zone lookup is account-scoped: `GET /zones?name=<zone>`. The caller
// caches the resulting id; nothing here is memoized.

use tracing::debug;

use crate::client::CloudflareClient;
use crate::error::Error;
use crate::models::ApiZone;

impl CloudflareClient {
    /// List zones visible to the token, optionally filtered by exact name.
    ///
    /// `GET /zones?name={name}`
    pub async fn list_zones(&self, name: Option<&str>) -> Result<Vec<ApiZone>, Error> {
        let mut params = vec![("per_page", "50".to_owned())];
        if let Some(name) = name {
            params.push(("name", name.to_owned()));
        }
        debug!(?name, "listing zones");
        self.get("zones", &params).await
    }
}
