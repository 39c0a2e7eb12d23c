// Site-availability backend HTTP client
//
// Wraps `reqwest::Client` with URL construction and response decoding for
// the three backend endpoints. Callers see decoded payload vectors — the
// `{ sites }` / `{ results }` / `{ records }` envelopes are stripped here.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    CheckRequest, CheckResponse, CheckResult, HistoryRecord, HistoryResponse, Site, SitesResponse,
};

/// HTTP client for the site-availability backend.
///
/// All three endpoints live under `/api/site-availability/`. Any non-2xx
/// response is an [`Error::Http`]; transport failures surface as
/// [`Error::Transport`]. Cheap to clone — the underlying connection
/// pool is shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the backend at `base_url` with the given
    /// request timeout.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the site roster. An omitted `sites` list decodes as empty.
    pub async fn list_sites(&self) -> Result<Vec<Site>, Error> {
        let url = self.api_url("sites")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let body: SitesResponse = decode(resp).await?;
        Ok(body.sites)
    }

    /// Trigger one batch availability check for `sites`.
    ///
    /// `timeout_secs` and `max_concurrent` are the backend's probe policy
    /// parameters — they travel in the request body, not as client-side
    /// limits.
    pub async fn check_sites(
        &self,
        sites: &[Site],
        timeout_secs: u64,
        max_concurrent: usize,
    ) -> Result<Vec<CheckResult>, Error> {
        let url = self.api_url("check")?;
        debug!(sites = sites.len(), "POST {url}");

        let request = CheckRequest {
            sites,
            timeout: timeout_secs,
            max_concurrent,
        };
        let resp = self.http.post(url).json(&request).send().await?;
        let body: CheckResponse = decode(resp).await?;
        Ok(body.results)
    }

    /// Fetch the historical check records for one site identity.
    pub async fn history(&self, service: &str, name: &str) -> Result<Vec<HistoryRecord>, Error> {
        let mut url = self.api_url("history")?;
        url.query_pairs_mut()
            .append_pair("service", service)
            .append_pair("name", name);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let body: HistoryResponse = decode(resp).await?;
        Ok(body.records)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/api/site-availability/{path}`.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/site-availability/{path}"))?)
    }
}

/// Check the status and decode the JSON body, keeping a body preview in
/// the error for debugging malformed payloads.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            body: preview(&body).to_owned(),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

/// First 200 characters of a body, for error messages.
fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}
