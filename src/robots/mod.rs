//! Robots.txt handling module
//!
//! This module fetches, parses and caches the target site's robots.txt.
//! The file is fetched at most once per session, even when many tasks ask
//! for it at the same moment. A fetch failure never blocks scraping: the
//! policy falls back to allow-all and records a warning.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::ParsedRobots;

use crate::scraper::{document_headers, FetchOutcome, ResilientFetcher};
use tokio::sync::OnceCell;
use url::Url;

/// Session-wide robots.txt gate
#[derive(Debug)]
pub struct RobotsPolicy {
    fetcher: ResilientFetcher,
    robots_url: Url,
    cache: OnceCell<CachedRobots>,
}

impl RobotsPolicy {
    /// Creates a policy that will fetch `robots_url` on first use
    pub fn new(fetcher: ResilientFetcher, robots_url: Url) -> Self {
        Self {
            fetcher,
            robots_url,
            cache: OnceCell::new(),
        }
    }

    /// Creates a policy with rules already in place; nothing is fetched
    pub fn with_rules(fetcher: ResilientFetcher, robots_url: Url, rules: CachedRobots) -> Self {
        Self {
            fetcher,
            robots_url,
            cache: OnceCell::new_with(Some(rules)),
        }
    }

    pub fn robots_url(&self) -> &Url {
        &self.robots_url
    }

    /// Returns the cached rules, fetching them first if needed
    ///
    /// Concurrent callers share a single in-flight fetch.
    pub async fn rules(&self) -> &CachedRobots {
        self.cache.get_or_init(|| self.fetch_rules()).await
    }

    /// Rules fetched so far, without triggering a fetch
    pub fn cached(&self) -> Option<&CachedRobots> {
        self.cache.get()
    }

    /// Checks whether every path in `paths` is allowed
    ///
    /// Stops at the first disallowed path.
    ///
    /// # Returns
    ///
    /// * `true` - All paths are allowed, or robots.txt could not be fetched
    /// * `false` - At least one path falls under a `Disallow` prefix
    pub async fn is_allowed<S: AsRef<str>>(&self, paths: &[S]) -> bool {
        let rules = self.rules().await;

        for path in paths {
            let path = path.as_ref();
            if let Some(prefix) = rules.content.disallowing_prefix(path) {
                tracing::info!(path, prefix, "path disallowed by robots.txt");
                return false;
            }
        }

        true
    }

    async fn fetch_rules(&self) -> CachedRobots {
        tracing::debug!(url = %self.robots_url, "fetching robots.txt");

        let report = self
            .fetcher
            .fetch(&self.robots_url, &document_headers(None))
            .await;

        match report.outcome {
            FetchOutcome::Success { body, .. } => {
                let parsed = ParsedRobots::from_content(&body);
                tracing::debug!(
                    disallowed = parsed.disallowed_prefixes().len(),
                    "robots.txt loaded"
                );
                CachedRobots::new(parsed)
            }
            FetchOutcome::RateLimited => {
                tracing::warn!(url = %self.robots_url, "robots.txt rate limited, allowing all paths");
                CachedRobots::fail_open("robots.txt fetch was rate limited")
            }
            FetchOutcome::HardFailure { status, reason } => {
                tracing::warn!(
                    url = %self.robots_url,
                    status = ?status,
                    reason = %reason,
                    "robots.txt unavailable, allowing all paths"
                );
                CachedRobots::fail_open(format!("robots.txt fetch failed: {}", reason))
            }
        }
    }
}
