use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tracing::{debug, info, warn};

use super::cache::{cache_key, ResponseCache};
use super::domain::FoodTruck;
use super::params::clamp_limit;
use crate::config::UpstreamConfig;

const APP_TOKEN_HEADER: &str = "x-app-token";
const USER_AGENT_VALUE: &str = concat!("truck-finder/", env!("CARGO_PKG_VERSION"));
/// Longest slice of an upstream error body carried into `UpstreamError::Status`.
pub const ERROR_BODY_EXCERPT_CHARS: usize = 200;

/// Failures talking to the open-data endpoint. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to create HTTP client: {message}")]
    Client { message: String },
    #[error("upstream request timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream returned malformed records: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Query sent to the Socrata resource. `limit` is clamped when the request is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SodaQuery {
    pub select: Option<String>,
    pub where_clause: Option<String>,
    pub order: Option<String>,
    pub limit: f64,
}

impl SodaQuery {
    pub fn filtered(where_clause: String, limit: f64) -> Self {
        Self {
            where_clause: Some(where_clause),
            limit,
            ..Self::default()
        }
    }

    pub fn ordered_by(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    /// SoQL parameters; `$limit` is always present.
    pub fn to_params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        if let Some(select) = self.select.as_ref().filter(|value| !value.is_empty()) {
            params.insert("$select", select.clone());
        }
        if let Some(clause) = self.where_clause.as_ref().filter(|value| !value.is_empty()) {
            params.insert("$where", clause.clone());
        }
        if let Some(order) = self.order.as_ref().filter(|value| !value.is_empty()) {
            params.insert("$order", order.clone());
        }
        params.insert("$limit", clamp_limit(self.limit).to_string());
        params
    }
}

/// Issues SoQL queries against the permit dataset, fronted by the response cache.
#[derive(Debug, Clone)]
pub struct UpstreamFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cache: Arc<ResponseCache>,
}

impl UpstreamFetcher {
    pub fn new(config: &UpstreamConfig, cache: Arc<ResponseCache>) -> Result<Self, UpstreamError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = &config.app_token {
            let value = HeaderValue::from_str(token).map_err(|_| UpstreamError::Client {
                message: "SFGOV_APP_TOKEN is not a valid header value".to_string(),
            })?;
            default_headers.insert(HeaderName::from_static(APP_TOKEN_HEADER), value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| UpstreamError::Client {
                message: err.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            cache,
        })
    }

    pub async fn fetch(&self, query: &SodaQuery) -> Result<Vec<FoodTruck>, UpstreamError> {
        let params = query.to_params();
        let key = cache_key(&self.base_url, &params);

        if let Some(trucks) = self.cache.get(&key) {
            debug!(%key, count = trucks.len(), "serving permits from cache");
            return Ok(trucks);
        }
        debug!(%key, "cache miss");

        let trucks = self.request(&params).await?;
        self.cache.put(key, trucks.clone());
        Ok(trucks)
    }

    async fn request(
        &self,
        params: &BTreeMap<&'static str, String>,
    ) -> Result<Vec<FoodTruck>, UpstreamError> {
        info!(url = %self.base_url, where_clause = ?params.get("$where"), "querying permit dataset");

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "permit dataset rejected query");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let bytes = response.bytes().await.map_err(|err| self.classify(err))?;
        let trucks: Vec<FoodTruck> = serde_json::from_slice(&bytes)?;
        info!(count = trucks.len(), "permit dataset responded");
        Ok(trucks)
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            warn!(timeout = ?self.timeout, "permit dataset timed out");
            UpstreamError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            warn!(error = %err, "permit dataset unreachable");
            UpstreamError::Transport(err)
        }
    }
}

/// Trims an error body to [`ERROR_BODY_EXCERPT_CHARS`] characters, marking the cut.
fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(ERROR_BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
