//! Search result pagination
//!
//! Page 1 tells us how many result pages exist. The remaining pages, up to
//! the configured page cap, are fetched concurrently under the session's
//! concurrency bound and merged back in page order.

use crate::model::SearchCandidate;
use crate::scraper::extract::{decode_search_page, extract_embedded_json, SearchPage};
use crate::scraper::fetcher::document_headers;
use crate::scraper::session::ScraperSession;
use crate::scraper::site::{REQUIRED_PATHS, SEARCH_MARKER};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

/// Collects search candidates for one term
pub struct SearchPaginator<'a> {
    session: &'a ScraperSession,
}

impl<'a> SearchPaginator<'a> {
    pub fn new(session: &'a ScraperSession) -> Self {
        Self { session }
    }

    /// Collects the ordered, de-duplicated candidates for `term`
    ///
    /// # Returns
    ///
    /// * `None` - robots.txt disallows a required path, or page 1 could not
    ///   be fetched or decoded
    /// * `Some(candidates)` - at most `max-products` candidates in
    ///   (page, position) order; may be empty when the search has no hits
    ///
    /// Failures on pages after the first are logged and skipped.
    pub async fn collect_search_results(&self, term: &str) -> Option<Vec<SearchCandidate>> {
        if !self.session.robots().is_allowed(&REQUIRED_PATHS).await {
            tracing::warn!(term, "robots.txt disallows scraping; aborting search");
            return None;
        }

        let Some(first) = self.fetch_page(term, 1).await else {
            tracing::warn!(term, "first search page unavailable; aborting search");
            return None;
        };

        let scraper = &self.session.config().scraper;
        let last_page = first.total_pages.min(scraper.page_cap);
        let total_results = first.number_of_results;
        tracing::info!(term, total_pages = first.total_pages, fetching = last_page, "search page 1 loaded");

        let rest: Vec<Option<SearchPage>> = stream::iter(2..=last_page)
            .map(|page| self.fetch_page(term, page))
            .buffered(scraper.max_concurrent_requests)
            .collect()
            .await;

        let pages = std::iter::once(first).chain(rest.into_iter().flatten());
        Some(self.merge(term, pages, total_results))
    }

    fn merge(
        &self,
        term: &str,
        pages: impl Iterator<Item = SearchPage>,
        total_results: Option<u64>,
    ) -> Vec<SearchCandidate> {
        let max_products = self.session.config().scraper.max_products;
        let mut seen = HashSet::new();
        let mut unique = Vec::new();

        for product in pages.flat_map(|page| page.products) {
            let Some(id) = product.id.clone() else {
                tracing::debug!(term, "search hit without an id skipped");
                continue;
            };
            if !seen.insert(id.clone()) {
                continue;
            }
            unique.push((id, product));
        }

        unique.truncate(max_products);

        let total = total_results.unwrap_or(unique.len() as u64);
        let site = self.session.site();

        unique
            .into_iter()
            .enumerate()
            .map(|(rank, (id, product))| SearchCandidate {
                detail_url: site.detail_url(&id, term, rank + 1, total).to_string(),
                expected_review_count: product
                    .attributes
                    .reviews_count
                    .map(|count| count.min(u32::MAX as u64) as u32)
                    .unwrap_or(0),
                name: product.attributes.name,
                price: product.attributes.price,
                rating: product.attributes.avg_rating,
                rank,
                id,
            })
            .collect()
    }

    async fn fetch_page(&self, term: &str, page: u32) -> Option<SearchPage> {
        let _permit = self.session.acquire().await;

        let url = self.session.site().search_page_url(term, page);
        let report = self
            .session
            .fetch_paced(&url, &document_headers(Some(self.session.site().base())))
            .await;

        let Some(body) = report.into_body() else {
            tracing::warn!(term, page, "search page fetch failed");
            return None;
        };

        match extract_embedded_json(&body, SEARCH_MARKER).and_then(decode_search_page) {
            Ok(decoded) => {
                tracing::debug!(term, page, hits = decoded.products.len(), "search page decoded");
                Some(decoded)
            }
            Err(e) => {
                tracing::warn!(term, page, error = %e, "search page could not be decoded");
                None
            }
        }
    }
}
