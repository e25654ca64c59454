//! Scraping engine
//!
//! This module implements the search-and-harvest pipeline, including:
//! - Adaptive request pacing shared by every task
//! - HTTP fetching with retry and user-agent rotation
//! - Extraction of the JSON payloads embedded in site pages
//! - Concurrent search pagination and product harvesting
//! - Background search tasks with status and cancellation

mod assemble;
mod extract;
mod fetcher;
mod harvest;
mod payload;
mod rate;
mod search;
mod session;
mod site;
mod task;

pub use assemble::assemble;
pub use extract::{
    decode_product_page, decode_reviews, decode_search_page, extract_description_text,
    extract_embedded_json, normalize_undefined, strip_html, ExtractError, ProductPage, SearchPage,
    DESCRIPTION_NOT_FOUND,
};
pub use fetcher::{
    api_headers, build_http_client, document_headers, is_retryable_status, FetchOutcome,
    FetchReport, ResilientFetcher, RetryPolicy, RETRYABLE_STATUSES,
};
pub use harvest::{HarvestOutcome, ProductHarvester};
pub use payload::{SearchAttributes, SearchProduct};
pub use rate::{AdaptiveRateController, RateState, MIN_RATE};
pub use search::SearchPaginator;
pub use session::{search_for_products, ScraperSession, SearchReport};
pub use site::{
    SiteUrls, DESCRIPTION_SELECTOR, PRODUCT_MARKER, PRODUCT_PATH, REQUIRED_PATHS, REVIEWS_PATH,
    SEARCH_MARKER, SEARCH_PATH,
};
pub use task::{spawn_search, SearchHandle, SearchStatus};
