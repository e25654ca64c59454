//! Site layout: page markers, robots paths and URL builders

use url::Url;

/// Script marker preceding the search page payload
pub const SEARCH_MARKER: &str = "window.App=";

/// Script marker preceding the product page payload
pub const PRODUCT_MARKER: &str = "window.__data=";

/// Fallback location of the product description in page markup
pub const DESCRIPTION_SELECTOR: &str = "div.product-description-content-text";

pub const SEARCH_PATH: &str = "/search/";
pub const PRODUCT_PATH: &str = "/product/";
pub const REVIEWS_PATH: &str = "/product-api/bazaar-voice-reviews/partNumber/";

/// Paths robots.txt must allow before a search starts
pub const REQUIRED_PATHS: [&str; 3] = [SEARCH_PATH, PRODUCT_PATH, REVIEWS_PATH];

/// Builds every URL the scraper requests from one base URL
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn robots_url(&self) -> Url {
        self.with_segments(&["robots.txt"])
    }

    /// `{base}/search/{term}/opt/page:{page}/`
    ///
    /// Page 1 carries the search-bar click-origin parameter.
    pub fn search_page_url(&self, term: &str, page: u32) -> Url {
        let page_segment = format!("page:{}", page);
        let mut url = self.with_segments(&["search", term, "opt", &page_segment, ""]);
        if page == 1 {
            url.query_pairs_mut()
                .append_pair("clickOrigin", &format!("searchbar:search:term:{}", term));
        }
        url
    }

    /// Canonical product page, `{base}/product/{id}`
    pub fn product_url(&self, id: &str) -> Url {
        self.with_segments(&["product", id])
    }

    /// Product page as reached from a search results listing
    ///
    /// `position` is 1-based; `total` is the result count the site reported.
    pub fn detail_url(&self, id: &str, term: &str, position: usize, total: u64) -> Url {
        let mut url = self.product_url(id);
        url.query_pairs_mut().append_pair(
            "clickSR",
            &format!("slp:term:{}:{}:{}:1", term, position, total),
        );
        url
    }

    /// One page of the reviews API for `id`
    pub fn reviews_url(&self, id: &str, limit: u32, offset: u32) -> Url {
        let mut url = self.with_segments(&[
            "product-api",
            "bazaar-voice-reviews",
            "partNumber",
            id,
        ]);
        url.query_pairs_mut()
            .append_pair("Limit", &limit.to_string())
            .append_pair("Offset", &offset.to_string())
            .append_pair("Sort", "SubmissionTime:Desc")
            .append_pair("returnMeta", "true");
        url
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments);
        }
        url
    }
}
