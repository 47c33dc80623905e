// Cloudflare v4 HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token auth, and
// envelope unwrapping. Endpoint groups (zones, DNS records, Page Rules)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ApiResponse, ResultInfo};
use crate::transport::TransportConfig;

/// Public Cloudflare v4 endpoint.
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4/";

/// Async client for the Cloudflare v4 REST API.
///
/// Every instance owns its base URL and credentials; there is no shared
/// global configuration, so clients for different accounts never interfere.
/// All methods return the unwrapped `result` payload -- the envelope is
/// stripped before the caller sees it.
pub struct CloudflareClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CloudflareClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// Injects `Authorization: Bearer <token>` as a sensitive default header.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API token header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/` so relative joins keep its path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// GET returning the payload together with the pagination block.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(T, Option<ResultInfo>), Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        let envelope = self.parse_envelope::<T>(resp).await?;
        let info = envelope.result_info;
        Ok((Self::take_result(envelope)?, info))
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.get_page(path, params).await.map(|(result, _)| result)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        let envelope = self.parse_envelope(resp).await?;
        Self::take_result(envelope)
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        let envelope = self.parse_envelope(resp).await?;
        Self::take_result(envelope)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Parse the `{ success, errors, result }` envelope, mapping HTTP and
    /// envelope-level failures into `Error`.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<ApiResponse<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited { retry_after_secs });
        }

        let body = resp.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(Self::status_error(status, &body, None));
            }
            Err(e) => {
                let preview: String = body.chars().take(200).collect();
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                });
            }
        };

        if status.is_success() && envelope.success {
            return Ok(envelope);
        }

        let message = envelope
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let code = envelope.errors.first().and_then(|e| e.code);
        Err(Self::status_error(status, &message, code))
    }

    fn status_error(status: reqwest::StatusCode, message: &str, code: Option<i64>) -> Error {
        let message = if message.is_empty() {
            status.to_string()
        } else {
            message.to_owned()
        };

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Error::Authentication { message };
        }

        Error::Api {
            message,
            code,
            status: status.as_u16(),
        }
    }

    fn take_result<T>(envelope: ApiResponse<T>) -> Result<T, Error> {
        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "envelope reported success without a result".into(),
            body: String::new(),
        })
    }
}
