//! Embedded-payload extraction
//!
//! Site pages carry their data as a JavaScript assignment inside a
//! `<script>` element, e.g. `window.__data={...};`. This module finds that
//! script, isolates the object literal, turns it into JSON and decodes the
//! parts the harvester needs.

use crate::scraper::payload::{
    ProductPayload, ReviewsResponse, SearchPayload, SearchProduct,
};
use ::scraper::{Html, Selector};
use serde_json::Value;
use thiserror::Error;

/// Placeholder stored when a product page has no description
pub const DESCRIPTION_NOT_FOUND: &str = "Description not found";

/// Errors that can occur while extracting embedded data
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response body is empty")]
    EmptyBody,

    #[error("no script contains marker {0:?}")]
    MarkerNotFound(String),

    #[error("no closing brace after marker {0:?}")]
    Unterminated(String),

    #[error("embedded payload is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("{context} payload has unexpected shape: {source}")]
    Schema {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decoded search result page
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub products: Vec<SearchProduct>,

    /// Total number of result pages the site reports
    pub total_pages: u32,

    /// Total number of hits across all pages
    pub number_of_results: Option<u64>,
}

/// Decoded product page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,

    /// Raw description, usually an HTML fragment
    pub description_html: Option<String>,
}

/// Extracts the JSON object assigned after `marker` in the page's scripts
///
/// The first `<script>` whose text contains `marker` is used. The payload
/// runs from just after the marker to the last `}` in that script, which
/// drops trailing statements such as `;` or follow-up assignments. Bare
/// `undefined` values outside string literals become `null`.
///
/// # Example
///
/// ```
/// use shelf_harvest::scraper::extract_embedded_json;
///
/// let html = r#"<script>window.__data={"a":undefined,"b":"undefined"};</script>"#;
/// let value = extract_embedded_json(html, "window.__data=").unwrap();
/// assert!(value["a"].is_null());
/// assert_eq!(value["b"], "undefined");
/// ```
pub fn extract_embedded_json(html: &str, marker: &str) -> Result<Value, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::EmptyBody);
    }

    let script = find_marked_script(html, marker)
        .ok_or_else(|| ExtractError::MarkerNotFound(marker.to_string()))?;

    let start = script
        .find(marker)
        .map(|pos| pos + marker.len())
        .ok_or_else(|| ExtractError::MarkerNotFound(marker.to_string()))?;
    let rest = &script[start..];
    let end = rest
        .rfind('}')
        .ok_or_else(|| ExtractError::Unterminated(marker.to_string()))?;

    let normalized = normalize_undefined(&rest[..=end]);
    serde_json::from_str(&normalized).map_err(ExtractError::MalformedJson)
}

fn find_marked_script(html: &str, marker: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|text| text.contains(marker))
}

/// Replaces the bare identifier `undefined` with `null` outside string literals
pub fn normalize_undefined(source: &str) -> String {
    const UNDEFINED: &str = "undefined";

    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == b'u' && source[i..].starts_with(UNDEFINED) {
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + UNDEFINED.len()).copied();
            if !before.is_some_and(is_identifier_byte) && !after.is_some_and(is_identifier_byte) {
                out.push_str(&source[copied..i]);
                out.push_str("null");
                i += UNDEFINED.len();
                copied = i;
                continue;
            }
        }

        i += 1;
    }

    out.push_str(&source[copied..]);
    out
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Returns the whitespace-normalized text of the first element matching
/// `selector`, or [`DESCRIPTION_NOT_FOUND`]
pub fn extract_description_text(html: &str, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return DESCRIPTION_NOT_FOUND.to_string();
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .next()
        .map(|element| collapse_whitespace(element.text()))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DESCRIPTION_NOT_FOUND.to_string())
}

/// Reduces an HTML fragment to its visible text
pub fn strip_html(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    collapse_whitespace(document.root_element().text())
}

fn collapse_whitespace<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes the `window.App` payload of a search page
pub fn decode_search_page(value: Value) -> Result<SearchPage, ExtractError> {
    let payload: SearchPayload =
        serde_json::from_value(value).map_err(|source| ExtractError::Schema {
            context: "search",
            source,
        })?;

    let state = payload.redux.product;
    Ok(SearchPage {
        total_pages: state
            .meta
            .total_pages
            .map(|pages| pages.min(u32::MAX as u64) as u32)
            .unwrap_or(1),
        number_of_results: state.number_of_results,
        products: state.products,
    })
}

/// Decodes the `window.__data` payload of a product page
pub fn decode_product_page(value: Value) -> Result<ProductPage, ExtractError> {
    let payload: ProductPayload =
        serde_json::from_value(value).map_err(|source| ExtractError::Schema {
            context: "product",
            source,
        })?;

    let data = payload.product_store.data;
    Ok(ProductPage {
        id: data.attributes.part_number,
        name: data
            .attributes
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        price: data.prices.and_then(|p| p.attributes.now),
        rating: data.rating_summary.and_then(|r| r.attributes.avg_rating),
        description_html: data.attributes.description,
    })
}

/// Decodes one page of the reviews API
///
/// Entries without text come back as empty strings so the caller can tell
/// how many entries the page held.
pub fn decode_reviews(body: &str) -> Result<Vec<String>, ExtractError> {
    if body.trim().is_empty() {
        return Err(ExtractError::EmptyBody);
    }

    let response: ReviewsResponse =
        serde_json::from_str(body).map_err(|source| ExtractError::Schema {
            context: "reviews",
            source,
        })?;

    Ok(response
        .data
        .results
        .into_iter()
        .map(|entry| entry.review_text.unwrap_or_default())
        .collect())
}
