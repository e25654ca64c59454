//! HTTP fetcher implementation
//!
//! This module handles every outbound request of a scrape session:
//! - Building the shared HTTP client (cookie store, timeouts, compression)
//! - Browser-like request headers with a rotating user agent
//! - Retry with exponential backoff for transient failures
//! - Classification of the final result into a [`FetchOutcome`]

use crate::config::{Config, RetryConfig};
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Status codes that are retried with backoff
pub const RETRYABLE_STATUSES: [u16; 6] = [403, 429, 500, 502, 503, 504];

/// Final result of a fetch after all retries
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// HTTP 2xx with the decoded body
    Success { status: u16, body: String },

    /// Retries exhausted while the server kept answering 429
    RateLimited,

    /// Non-retryable status, or retries exhausted on another failure
    HardFailure {
        /// Last HTTP status seen, `None` for network errors
        status: Option<u16>,
        reason: String,
    },
}

/// A fetch outcome plus what it took to get there
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub outcome: FetchOutcome,

    /// Number of requests sent, including the first
    pub attempts: u32,

    /// Number of HTTP 429 responses received along the way
    pub throttled: u32,
}

impl FetchReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success { .. })
    }

    /// Consumes the report, returning the body of a successful fetch
    pub fn into_body(self) -> Option<String> {
        match self.outcome {
            FetchOutcome::Success { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Exponential backoff schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_secs(config.max_backoff_secs),
            jitter: Duration::from_millis(config.backoff_jitter_ms),
        }
    }

    /// Backoff before retry number `retry` (0-based), with random jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            let max = self.jitter.as_millis() as u64;
            Duration::from_millis(rand::rng().random_range(0..=max))
        };
        self.backoff_with_jitter(retry, jitter)
    }

    /// `min(base * 2^retry + jitter, max_backoff)`
    pub fn backoff_with_jitter(&self, retry: u32, jitter: Duration) -> Duration {
        let factor = 1u32 << retry.min(20);
        self.base_backoff
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Returns true when a response with this status should be retried
pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}

/// Builds the shared HTTP client
///
/// The client keeps cookies across requests so the session looks like a
/// single browser visit.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.scraper.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Headers for an HTML document request
pub fn document_headers(referer: Option<&Url>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static(if referer.is_some() { "same-origin" } else { "none" }),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    insert_referer(&mut headers, referer);
    headers
}

/// Headers for a JSON API request issued from a product page
pub fn api_headers(referer: &Url) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    insert_referer(&mut headers, Some(referer));
    headers
}

fn insert_referer(headers: &mut HeaderMap, referer: Option<&Url>) {
    if let Some(value) = referer.and_then(|url| HeaderValue::from_str(url.as_str()).ok()) {
        headers.insert(REFERER, value);
    }
}

/// Issues GET requests with retry, backoff and user-agent rotation
///
/// Cloning is cheap; clones share the underlying connection pool and cookies.
#[derive(Debug, Clone)]
pub struct ResilientFetcher {
    client: Client,
    policy: RetryPolicy,
    user_agents: Arc<Vec<String>>,
}

impl ResilientFetcher {
    pub fn new(client: Client, policy: RetryPolicy, user_agents: Vec<String>) -> Self {
        Self {
            client,
            policy,
            user_agents: Arc::new(user_agents),
        }
    }

    /// Builds a fetcher from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            RetryPolicy::from_config(&config.retry),
            config.user_agent.pool.clone(),
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url`, retrying transient failures
    ///
    /// A fresh user agent is picked for every attempt. Statuses in
    /// [`RETRYABLE_STATUSES`], timeouts and connection errors are retried up
    /// to the policy's attempt count; anything else ends the fetch at once.
    pub async fn fetch(&self, url: &Url, headers: &HeaderMap) -> FetchReport {
        let mut attempts = 0;
        let mut throttled = 0;

        loop {
            attempts += 1;

            let mut request_headers = headers.clone();
            if let Some(agent) = self.pick_user_agent() {
                request_headers.insert(USER_AGENT, agent);
            }

            let last = match self
                .client
                .get(url.clone())
                .headers(request_headers)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                return FetchReport {
                                    outcome: FetchOutcome::Success {
                                        status: status.as_u16(),
                                        body,
                                    },
                                    attempts,
                                    throttled,
                                };
                            }
                            Err(e) => FetchOutcome::HardFailure {
                                status: Some(status.as_u16()),
                                reason: format!("failed to read body: {}", e),
                            },
                        }
                    } else {
                        if status == StatusCode::TOO_MANY_REQUESTS {
                            throttled += 1;
                        }

                        if !is_retryable_status(status) {
                            tracing::debug!(url = %url, status = status.as_u16(), "non-retryable status");
                            return FetchReport {
                                outcome: FetchOutcome::HardFailure {
                                    status: Some(status.as_u16()),
                                    reason: format!("HTTP {}", status.as_u16()),
                                },
                                attempts,
                                throttled,
                            };
                        }

                        if status == StatusCode::TOO_MANY_REQUESTS {
                            FetchOutcome::RateLimited
                        } else {
                            FetchOutcome::HardFailure {
                                status: Some(status.as_u16()),
                                reason: format!("HTTP {}", status.as_u16()),
                            }
                        }
                    }
                }
                Err(e) => {
                    if !(e.is_timeout() || e.is_connect() || e.is_request()) {
                        return FetchReport {
                            outcome: FetchOutcome::HardFailure {
                                status: None,
                                reason: e.to_string(),
                            },
                            attempts,
                            throttled,
                        };
                    }
                    FetchOutcome::HardFailure {
                        status: None,
                        reason: e.to_string(),
                    }
                }
            };

            if attempts >= self.policy.attempts {
                tracing::warn!(url = %url, attempts, outcome = ?last, "retries exhausted");
                return FetchReport {
                    outcome: last,
                    attempts,
                    throttled,
                };
            }

            let delay = self.policy.backoff(attempts - 1);
            tracing::warn!(
                url = %url,
                attempt = attempts,
                max_attempts = self.policy.attempts,
                delay_ms = delay.as_millis() as u64,
                "transient fetch failure, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn pick_user_agent(&self) -> Option<HeaderValue> {
        if self.user_agents.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..self.user_agents.len());
        HeaderValue::from_str(&self.user_agents[index]).ok()
    }
}
