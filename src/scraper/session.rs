//! Scrape session
//!
//! A `ScraperSession` owns everything one search shares across its tasks:
//! the HTTP client, the rate controller, the robots.txt cache and the
//! concurrency bound.

use crate::config::{validate, Config};
use crate::model::Collection;
use crate::robots::RobotsPolicy;
use crate::scraper::assemble::assemble;
use crate::scraper::fetcher::{FetchReport, ResilientFetcher};
use crate::scraper::harvest::{HarvestOutcome, ProductHarvester};
use crate::scraper::rate::AdaptiveRateController;
use crate::scraper::search::SearchPaginator;
use crate::scraper::site::SiteUrls;
use crate::state::{FailureKind, HarvestState};
use crate::url::parse_http_url;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::time::{Duration, Instant};
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};
use url::Url;

/// Shared state of one scrape session
#[derive(Debug)]
pub struct ScraperSession {
    config: Config,
    site: SiteUrls,
    fetcher: ResilientFetcher,
    rate: AdaptiveRateController,
    robots: RobotsPolicy,
    permits: Semaphore,
}

impl ScraperSession {
    /// Builds a session from a configuration
    ///
    /// The configuration is validated again here so sessions built in code
    /// get the same checks as those loaded from a file.
    pub fn new(config: Config) -> crate::Result<Self> {
        validate(&config)?;
        let fetcher = ResilientFetcher::from_config(&config)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Builds a session around an existing fetcher
    pub fn with_fetcher(config: Config, fetcher: ResilientFetcher) -> crate::Result<Self> {
        let site = SiteUrls::new(parse_http_url(&config.site.base_url)?);
        let robots = RobotsPolicy::new(fetcher.clone(), site.robots_url());

        Ok(Self {
            rate: AdaptiveRateController::from_config(&config.rate_limit),
            permits: Semaphore::new(config.scraper.max_concurrent_requests),
            site,
            fetcher,
            robots,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn site(&self) -> &SiteUrls {
        &self.site
    }

    pub fn robots(&self) -> &RobotsPolicy {
        &self.robots
    }

    pub fn rate(&self) -> &AdaptiveRateController {
        &self.rate
    }

    pub fn fetcher(&self) -> &ResilientFetcher {
        &self.fetcher
    }

    /// Waits for a slot under the concurrency bound
    pub(crate) async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.permits.acquire().await
    }

    /// Paced fetch: waits on the rate controller, fetches, then feeds the
    /// outcome back into the rate
    pub async fn fetch_paced(&self, url: &Url, headers: &HeaderMap) -> FetchReport {
        self.rate.wait().await;
        let report = self.fetcher.fetch(url, headers).await;

        for _ in 0..report.throttled {
            self.rate.decrease_rate();
        }
        if report.is_success() {
            self.rate.increase_rate();
        }

        report
    }

    /// Runs a full search and reports what happened to every candidate
    pub async fn search(&self, term: &str) -> SearchReport {
        let started = Instant::now();
        let term = term.trim();
        let mut report = SearchReport::new(term);

        if term.is_empty() {
            tracing::warn!("empty search term; nothing to do");
            return report.finish(self, started);
        }

        tracing::info!(term, "search started");

        let Some(candidates) = SearchPaginator::new(self).collect_search_results(term).await else {
            return report.finish(self, started);
        };

        report.search_completed = true;
        report.candidates = candidates.len();

        let outcomes = ProductHarvester::new(self).harvest_all(candidates).await;
        report.record(&outcomes);

        let products = outcomes
            .into_iter()
            .filter_map(|outcome| outcome.product)
            .collect();
        report.collection = assemble(term, products);

        report.finish(self, started)
    }

    /// Searches for `term` and returns the harvested collection, if any
    ///
    /// # Returns
    ///
    /// * `Some(collection)` - at least one product was harvested
    /// * `None` - robots.txt disallowed the search, page 1 failed, or no
    ///   candidate produced a valid product
    pub async fn search_for_products(&self, term: &str) -> Option<Collection> {
        self.search(term).await.collection
    }
}

/// Convenience entry point: builds a session and runs one search
///
/// # Example
///
/// ```no_run
/// use shelf_harvest::{search_for_products, Config};
///
/// # async fn run() -> shelf_harvest::Result<()> {
/// if let Some(collection) = search_for_products(Config::default(), "phone case").await? {
///     println!("{}", collection);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_for_products(config: Config, term: &str) -> crate::Result<Option<Collection>> {
    let session = ScraperSession::new(config)?;
    Ok(session.search_for_products(term).await)
}

/// Summary of one search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub term: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// False when the search stopped before any product was harvested
    pub search_completed: bool,

    pub candidates: usize,
    pub validated: usize,
    pub skipped_robots: usize,
    pub failed_fetch: usize,
    pub failed_extraction: usize,
    pub failed_validation: usize,

    /// Set when robots.txt could not be fetched and all paths were allowed
    pub robots_warning: Option<String>,

    /// Request rate when the search ended
    pub final_rate: f64,

    pub collection: Option<Collection>,
}

impl SearchReport {
    fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            search_completed: false,
            candidates: 0,
            validated: 0,
            skipped_robots: 0,
            failed_fetch: 0,
            failed_extraction: 0,
            failed_validation: 0,
            robots_warning: None,
            final_rate: 0.0,
            collection: None,
        }
    }

    fn record(&mut self, outcomes: &[HarvestOutcome]) {
        for outcome in outcomes {
            match outcome.state {
                HarvestState::Validated => self.validated += 1,
                HarvestState::Skipped(_) => self.skipped_robots += 1,
                HarvestState::Failed(FailureKind::Fetch) => self.failed_fetch += 1,
                HarvestState::Failed(FailureKind::Extraction) => self.failed_extraction += 1,
                HarvestState::Failed(FailureKind::Validation) => self.failed_validation += 1,
                HarvestState::Pending | HarvestState::Fetching => {}
            }
        }
    }

    fn finish(mut self, session: &ScraperSession, started: Instant) -> Self {
        self.elapsed = started.elapsed();
        self.final_rate = session.rate().current_rate();
        self.robots_warning = session
            .robots()
            .cached()
            .and_then(|rules| rules.warning.clone());

        tracing::info!(
            term = %self.term,
            candidates = self.candidates,
            validated = self.validated,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "search finished"
        );
        self
    }

    /// Candidates that did not produce a product
    pub fn failed(&self) -> usize {
        self.failed_fetch + self.failed_extraction + self.failed_validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_rejects_invalid_config() {
        let mut config = Config::default();
        config.scraper.max_concurrent_requests = 0;
        assert!(ScraperSession::new(config).is_err());
    }

    #[test]
    fn test_record_counts_states() {
        let mut report = SearchReport::new("case");
        let outcome = |state| HarvestOutcome {
            candidate_id: "1".to_string(),
            rank: 0,
            state,
            product: None,
        };

        report.record(&[
            outcome(HarvestState::Validated),
            outcome(HarvestState::Failed(FailureKind::Fetch)),
            outcome(HarvestState::Failed(FailureKind::Validation)),
            outcome(HarvestState::Skipped(crate::state::SkipReason::Robots)),
        ]);

        assert_eq!(report.validated, 1);
        assert_eq!(report.skipped_robots, 1);
        assert_eq!(report.failed(), 2);
    }

    #[tokio::test]
    async fn test_blank_term_returns_none_without_requests() {
        let mut config = Config::default();
        config.site.base_url = "http://127.0.0.1:9".to_string();
        let session = ScraperSession::new(config).unwrap();

        let report = session.search("   ").await;
        assert!(!report.search_completed);
        assert!(report.collection.is_none());
        assert!(session.robots().cached().is_none());
    }
}
