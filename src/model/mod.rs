//! Domain model for harvested data
//!
//! - `Product`: an immutable-after-validation product listing
//! - `Collection`: the named result of one search
//! - `SearchCandidate`: a provisional product reference awaiting harvest

mod collection;
mod product;

pub use collection::Collection;
pub use product::Product;

/// A product reference taken from a search result page
///
/// Candidates are produced by the search paginator and consumed exactly once
/// by the harvester. The search-page attributes fill in any identity field the
/// product page itself does not provide.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    /// Site-assigned product id
    pub id: String,

    /// Product page URL, including click-tracking query
    pub detail_url: String,

    /// Number of reviews the search result advertises
    pub expected_review_count: u32,

    /// Position of this candidate in the merged search results
    pub rank: usize,

    pub name: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
}
