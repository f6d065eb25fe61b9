//! HTTP client for the nearby-places REST service.
//!
//! Every attempt is bounded by the configured timeout; the future is dropped
//! when it elapses, which cancels the in-flight request. 429 responses are
//! retried a bounded number of times, honoring `Retry-After` when the server
//! sends one.

use std::time::Duration;

use async_trait::async_trait;
use nearby_api_types::{
    HEALTH_PATH, HealthResponse, NEARBY_PATH, NearbyPlacesResponse, PLACES_PATH,
    PlaceDetailsResponse,
};
use reqwest::header::{ACCEPT, HeaderMap, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::model::{HealthStatus, Place, PlaceId};
use crate::places::convert::{health_from_api, place_from_api};
use crate::places::{NearbyQuery, PlacesApi, PlacesError, Result};

/// Backoff for rate-limited requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`.
    ///
    /// A server-supplied `Retry-After` wins over the exponential schedule; both
    /// are clamped to `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after
            .unwrap_or_else(|| self.base_delay.saturating_mul(1u32 << attempt.min(16)));
        delay.min(self.max_delay)
    }
}

impl From<&ApiConfig> for RetryPolicy {
    fn from(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_rate_limit_retries,
            base_delay: config.rate_limit_delay(),
            max_delay: config.max_backoff(),
        }
    }
}

enum Reply<T> {
    /// `None` when the body was empty
    Done(Option<T>),
    RateLimited(Option<Duration>),
}

#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    result_limit: u32,
    retry: RetryPolicy,
}

impl PlacesClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| PlacesError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PlacesError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
            result_limit: config.result_limit,
            retry: RetryPolicy::from(config),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{path}", self.base_url);
        Url::parse(&raw).map_err(|e| PlacesError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let mut attempt = 0;

        loop {
            debug!(%url, attempt, "sending request");

            match tokio::time::timeout(self.timeout, self.send_once::<T>(url.clone())).await {
                Err(_) => {
                    warn!(%url, timeout_ms = self.timeout.as_millis() as u64, "request timed out");
                    return Err(PlacesError::Timeout);
                }
                Ok(Err(e)) => return Err(e),
                Ok(Ok(Reply::Done(body))) => return Ok(body),
                Ok(Ok(Reply::RateLimited(retry_after))) => {
                    if attempt >= self.retry.max_retries {
                        warn!(%url, attempts = attempt + 1, "rate limited, giving up");
                        return Err(PlacesError::Status {
                            status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                        });
                    }

                    let delay = self.retry.delay_for(attempt, retry_after);
                    warn!(%url, attempt, delay_ms = delay.as_millis() as u64, "rate limited, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, url: Url) -> Result<Reply<T>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Reply::RateLimited(retry_after(response.headers())));
        }
        if !status.is_success() {
            return Err(PlacesError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(network_error)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Reply::Done(None));
        }

        serde_json::from_slice(&body)
            .map(|value| Reply::Done(Some(value)))
            .map_err(|e| PlacesError::Decode(e.to_string()))
    }
}

fn network_error(e: reqwest::Error) -> PlacesError {
    if e.is_timeout() {
        PlacesError::Timeout
    } else {
        PlacesError::Network(e.to_string())
    }
}

/// Only the delta-seconds form is understood; HTTP dates fall back to the
/// policy's own schedule.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl PlacesApi for PlacesClient {
    async fn nearby_places(&self, query: &NearbyQuery) -> Result<Vec<Place>> {
        let mut url = self.endpoint(NEARBY_PATH)?;
        url.query_pairs_mut()
            .append_pair("lat", &query.origin.latitude.to_string())
            .append_pair("lng", &query.origin.longitude.to_string())
            .append_pair("type", query.category.as_ref())
            .append_pair("radius", &query.radius_m.to_string())
            .append_pair("limit", &self.result_limit.to_string());

        let response: Option<NearbyPlacesResponse> = self.get_json(url).await?;
        let places: Vec<Place> = response
            .and_then(|r| r.places)
            .unwrap_or_default()
            .into_iter()
            .map(|p| place_from_api(p, Some(&query.origin)))
            .collect();

        debug!(category = %query.category, count = places.len(), "nearby places loaded");
        Ok(places)
    }

    async fn place_details(&self, id: &PlaceId) -> Result<Option<Place>> {
        let mut url = self.endpoint(PLACES_PATH)?;
        url.path_segments_mut()
            .map_err(|_| PlacesError::InvalidUrl(self.base_url.clone()))?
            .push(id.as_str());

        match self.get_json::<PlaceDetailsResponse>(url).await {
            Ok(response) => Ok(response
                .and_then(|r| r.place)
                .map(|p| place_from_api(p, None))),
            Err(PlacesError::Status { status: 404 }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(HEALTH_PATH)?;
        let response: Option<HealthResponse> = self.get_json(url).await?;
        response
            .map(health_from_api)
            .ok_or_else(|| PlacesError::Decode("empty health response".into()))
    }
}
