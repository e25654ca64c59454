//! Product harvesting
//!
//! Every candidate becomes one task. Tasks run concurrently under the
//! session's concurrency bound; each one checks robots.txt, fetches the
//! product page, pages through the reviews API and validates the result.
//! A failing candidate only ever removes itself from the output.

use crate::model::{Product, SearchCandidate};
use crate::scraper::extract::{
    decode_product_page, decode_reviews, extract_description_text, extract_embedded_json,
    strip_html, ProductPage,
};
use crate::scraper::fetcher::{api_headers, document_headers};
use crate::scraper::session::ScraperSession;
use crate::scraper::site::{DESCRIPTION_SELECTOR, PRODUCT_MARKER};
use crate::state::{FailureKind, HarvestState, SkipReason};
use crate::url::{parse_http_url, request_path};
use futures::future::join_all;
use url::Url;

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestOutcome {
    pub candidate_id: String,
    pub rank: usize,
    pub state: HarvestState,
    pub product: Option<Product>,
}

impl HarvestOutcome {
    fn new(candidate: &SearchCandidate, state: HarvestState, product: Option<Product>) -> Self {
        Self {
            candidate_id: candidate.id.clone(),
            rank: candidate.rank,
            state,
            product,
        }
    }
}

/// Turns search candidates into validated products
pub struct ProductHarvester<'a> {
    session: &'a ScraperSession,
}

impl<'a> ProductHarvester<'a> {
    pub fn new(session: &'a ScraperSession) -> Self {
        Self { session }
    }

    /// Harvests every candidate, returning the valid products in rank order
    pub async fn harvest(&self, candidates: Vec<SearchCandidate>) -> Vec<Product> {
        self.harvest_all(candidates)
            .await
            .into_iter()
            .filter_map(|outcome| outcome.product)
            .collect()
    }

    /// Harvests every candidate, returning one outcome per candidate in
    /// rank order
    pub async fn harvest_all(&self, mut candidates: Vec<SearchCandidate>) -> Vec<HarvestOutcome> {
        candidates.sort_by_key(|candidate| candidate.rank);

        let outcomes = join_all(
            candidates
                .iter()
                .map(|candidate| self.harvest_one(candidate)),
        )
        .await;

        let validated = outcomes.iter().filter(|o| o.state.is_success()).count();
        tracing::info!(
            candidates = outcomes.len(),
            validated,
            "harvest finished"
        );

        outcomes
    }

    async fn harvest_one(&self, candidate: &SearchCandidate) -> HarvestOutcome {
        let _permit = self.session.acquire().await;
        let state = HarvestState::Pending;

        let Ok(detail_url) = parse_http_url(&candidate.detail_url) else {
            tracing::warn!(id = %candidate.id, url = %candidate.detail_url, "candidate has a malformed URL");
            let fetching = self.advance(state, HarvestState::Fetching);
            return HarvestOutcome::new(
                candidate,
                self.advance(fetching, HarvestState::Failed(FailureKind::Validation)),
                None,
            );
        };

        let reviews_url = self.session.site().reviews_url(&candidate.id, 1, 0);
        let paths = [request_path(&detail_url), request_path(&reviews_url)];
        if !self.session.robots().is_allowed(&paths).await {
            return HarvestOutcome::new(
                candidate,
                self.advance(state, HarvestState::Skipped(SkipReason::Robots)),
                None,
            );
        }

        let state = self.advance(state, HarvestState::Fetching);
        match self.build_product(candidate, &detail_url).await {
            Ok(product) => {
                tracing::debug!(id = %candidate.id, reviews = product.reviews().len(), "product validated");
                HarvestOutcome::new(
                    candidate,
                    self.advance(state, HarvestState::Validated),
                    Some(product),
                )
            }
            Err(kind) => HarvestOutcome::new(
                candidate,
                self.advance(state, HarvestState::Failed(kind)),
                None,
            ),
        }
    }

    async fn build_product(
        &self,
        candidate: &SearchCandidate,
        detail_url: &Url,
    ) -> Result<Product, FailureKind> {
        let referer = self.session.site().base().clone();
        let report = self
            .session
            .fetch_paced(detail_url, &document_headers(Some(&referer)))
            .await;

        let Some(body) = report.into_body() else {
            tracing::warn!(id = %candidate.id, "product page fetch failed");
            return Err(FailureKind::Fetch);
        };

        let page = extract_embedded_json(&body, PRODUCT_MARKER)
            .and_then(decode_product_page)
            .map_err(|e| {
                tracing::warn!(id = %candidate.id, error = %e, "product page could not be decoded");
                FailureKind::Extraction
            })?;

        let description = describe(&page, &body);
        let fields = resolve_fields(candidate, page).ok_or_else(|| {
            tracing::warn!(id = %candidate.id, "product page lacks name, price or rating");
            FailureKind::Extraction
        })?;

        let wanted = self
            .session
            .config()
            .scraper
            .max_reviews
            .min(candidate.expected_review_count);
        let reviews = self.fetch_reviews(&fields.id, detail_url, wanted).await;

        Product::new(
            fields.id,
            fields.name,
            fields.price,
            detail_url.as_str(),
            fields.rating,
            description,
            reviews,
        )
        .map_err(|e| {
            tracing::warn!(id = %candidate.id, error = %e, "product failed validation");
            FailureKind::Validation
        })
    }

    /// Pages through the reviews API until `wanted` reviews are collected,
    /// a short page arrives, or a request fails
    ///
    /// Reviews without text are dropped. Collected reviews survive a later
    /// failing page.
    async fn fetch_reviews(&self, product_id: &str, referer: &Url, wanted: u32) -> Vec<String> {
        let mut reviews = Vec::new();
        let page_size = self.session.config().scraper.review_page_size;
        let headers = api_headers(referer);
        let mut offset = 0u32;

        while offset < wanted {
            let limit = page_size.min(wanted - offset);
            let url = self.session.site().reviews_url(product_id, limit, offset);
            let report = self.session.fetch_paced(&url, &headers).await;

            let Some(body) = report.into_body() else {
                tracing::debug!(id = product_id, offset, "review page fetch failed; keeping collected reviews");
                break;
            };

            let page = match decode_reviews(&body) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(id = product_id, offset, error = %e, "review page could not be decoded");
                    break;
                }
            };

            let received = page.len() as u32;
            reviews.extend(page.into_iter().filter(|text| !text.trim().is_empty()));
            offset += received;

            if received < limit {
                break;
            }
        }

        reviews.truncate(wanted as usize);
        reviews
    }

    fn advance(&self, from: HarvestState, to: HarvestState) -> HarvestState {
        from.transition(to).unwrap_or_else(|e| {
            tracing::error!(error = %e, "harvest state machine violated");
            to
        })
    }
}

struct ProductFields {
    id: String,
    name: String,
    price: f64,
    rating: f64,
}

/// Product page values, falling back to what the search listing reported
fn resolve_fields(candidate: &SearchCandidate, page: ProductPage) -> Option<ProductFields> {
    Some(ProductFields {
        id: page.id.unwrap_or_else(|| candidate.id.clone()),
        name: page.name.or_else(|| candidate.name.clone())?,
        price: page.price.or(candidate.price)?,
        rating: page.rating.or(candidate.rating)?,
    })
}

/// Description from the payload, then from page markup
fn describe(page: &ProductPage, body: &str) -> String {
    page.description_html
        .as_deref()
        .map(strip_html)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| extract_description_text(body, DESCRIPTION_SELECTOR))
}
