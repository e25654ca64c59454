//! Typed views of the JSON payloads embedded in site pages
//!
//! Only the fields the harvester reads are modelled. Numbers on this site
//! show up both as JSON numbers and as numeric strings, so numeric fields go
//! through lenient deserializers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `window.App` payload of a search result page
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPayload {
    pub redux: SearchRedux,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchRedux {
    pub product: SearchProductState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchProductState {
    #[serde(default)]
    pub products: Vec<SearchProduct>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub number_of_results: Option<u64>,

    #[serde(default)]
    pub meta: SearchMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchMeta {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_pages: Option<u64>,
}

/// One search hit
#[derive(Debug, Clone, Deserialize)]
pub struct SearchProduct {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub attributes: SearchAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAttributes {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_rating: Option<f64>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub reviews_count: Option<u64>,
}

/// `window.__data` payload of a product page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductPayload {
    pub product_store: ProductStore,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductStore {
    pub data: ProductData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductData {
    #[serde(default)]
    pub attributes: ProductAttributes,

    #[serde(default)]
    pub prices: Option<Prices>,

    #[serde(default)]
    pub rating_summary: Option<RatingSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductAttributes {
    #[serde(default, deserialize_with = "lenient_id")]
    pub part_number: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Prices {
    pub attributes: PriceAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceAttributes {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub now: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatingSummary {
    pub attributes: RatingAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RatingAttributes {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_rating: Option<f64>,
}

/// Reviews API response
#[derive(Debug, Deserialize)]
pub(crate) struct ReviewsResponse {
    pub data: ReviewsData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewsData {
    #[serde(rename = "Results", default)]
    pub results: Vec<ReviewEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewEntry {
    #[serde(rename = "ReviewText", default)]
    pub review_text: Option<String>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("not a number: {:?}", s))),
        other => Err(serde::de::Error::custom(format!(
            "expected number, got {}",
            other
        ))),
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
