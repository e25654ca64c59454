//! Shared fixtures: a fast configuration and page builders for the mock site

use serde_json::{json, Value};
use shelf_harvest::config::Config;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Configuration pointed at the mock server with pacing and backoff disabled
pub fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.base_url = server.uri();
    config.scraper.request_timeout_secs = 5;
    config.rate_limit.initial_rate = 1000.0;
    config.rate_limit.max_rate = 1000.0;
    config.rate_limit.min_jitter_ms = 0;
    config.rate_limit.max_jitter_ms = 0;
    config.retry.attempts = 3;
    config.retry.base_backoff_ms = 0;
    config.retry.max_backoff_secs = 0;
    config.retry.backoff_jitter_ms = 0;
    config
}

/// A search hit as it appears in the `window.App` payload
pub fn hit(id: u32, reviews: u32) -> Value {
    json!({
        "id": id.to_string(),
        "attributes": {
            "name": format!("Listing {}", id),
            "price": 10.0 + id as f64,
            "avgRating": 4.0,
            "reviewsCount": reviews
        }
    })
}

/// A search result page embedding `hits`
pub fn search_page(hits: Vec<Value>, total_pages: u32, total_results: u64) -> String {
    let payload = json!({
        "redux": { "product": {
            "products": hits,
            "numberOfResults": total_results,
            "meta": { "totalPages": total_pages }
        } }
    });
    format!(
        "<html><head><script>window.App={};</script></head><body><h1>Results</h1></body></html>",
        payload
    )
}

/// A product page embedding the `window.__data` payload
pub fn product_page(id: &str, rating: f64) -> String {
    format!(
        r#"<html><head><script>window.__data={{"productStore":{{"data":{{
            "attributes":{{"partNumber":"{id}","name":"Product {id}","description":"<p>About {id}</p>","extra":undefined}},
            "prices":{{"attributes":{{"now":"{price}"}}}},
            "ratingSummary":{{"attributes":{{"avgRating":{rating}}}}}
        }}}}}};</script></head><body></body></html>"#,
        id = id,
        price = "19.99",
        rating = rating
    )
}

/// Serves a product page for any `/product/{id}` path
pub struct ProductPages;

impl Respond for ProductPages {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = request.url.path().trim_start_matches("/product/");
        ResponseTemplate::new(200).set_body_string(product_page(id, 4.0))
    }
}

/// Serves `Limit` numbered reviews per request, up to `total` overall
pub struct ReviewPages {
    pub total: u32,
}

impl Respond for ReviewPages {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse::<u32>().ok())
                .unwrap_or(0)
        };
        let limit = param("Limit");
        let offset = param("Offset");
        let end = (offset + limit).min(self.total);

        let results: Vec<Value> = (offset..end)
            .map(|n| json!({ "ReviewText": format!("Review {}", n) }))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "data": { "Results": results } }))
    }
}

pub async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_search_page(server: &MockServer, term: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/search/{}/opt/page:{}/", term, page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Product pages and a review API with `reviews` reviews for every product
pub async fn mount_catalogue(server: &MockServer, reviews: u32) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/product/\d+$"))
        .respond_with(ProductPages)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/product-api/bazaar-voice-reviews/partNumber/\d+$"))
        .respond_with(ReviewPages { total: reviews })
        .mount(server)
        .await;
}

/// Product ids of a collection, in order
pub fn ids(collection: &shelf_harvest::Collection) -> Vec<String> {
    collection
        .products()
        .iter()
        .map(|p| p.product_id().to_string())
        .collect()
}
