use crate::common::*;
use shelf_harvest::scraper::{ProductHarvester, ScraperSession};
use shelf_harvest::state::{FailureKind, HarvestState, SkipReason};
use shelf_harvest::SearchCandidate;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn candidate(server: &MockServer, id: &str, rank: usize, reviews: u32) -> SearchCandidate {
    SearchCandidate {
        id: id.to_string(),
        detail_url: format!("{}/product/{}", server.uri(), id),
        expected_review_count: reviews,
        rank,
        name: None,
        price: None,
        rating: None,
    }
}

#[tokio::test]
async fn test_invalid_candidates_only_remove_themselves() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_catalogue(&server, 0).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();

    let mut candidates: Vec<SearchCandidate> = (0..5)
        .map(|i| candidate(&server, &(i + 1).to_string(), i, 0))
        .collect();
    candidates[1].detail_url = "not a url".to_string();
    candidates[3].detail_url = "ftp://shop.example.com/product/4".to_string();

    let products = ProductHarvester::new(&session).harvest(candidates).await;
    let found: Vec<&str> = products.iter().map(|p| p.product_id()).collect();
    assert_eq!(found, vec!["1", "3", "5"]);
}

#[tokio::test]
async fn test_forbidden_product_page_is_dropped() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/product/2"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&server)
        .await;
    mount_catalogue(&server, 0).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let candidates = vec![
        candidate(&server, "1", 0, 0),
        candidate(&server, "2", 1, 0),
        candidate(&server, "3", 2, 0),
    ];

    let outcomes = ProductHarvester::new(&session).harvest_all(candidates).await;
    let states: Vec<HarvestState> = outcomes.iter().map(|o| o.state).collect();
    assert_eq!(
        states,
        vec![
            HarvestState::Validated,
            HarvestState::Failed(FailureKind::Fetch),
            HarvestState::Validated,
        ]
    );
    assert!(outcomes[1].product.is_none());
}

#[tokio::test]
async fn test_out_of_range_rating_fails_validation() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/product/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("9", 7.5)))
        .mount(&server)
        .await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let outcomes = ProductHarvester::new(&session)
        .harvest_all(vec![candidate(&server, "9", 0, 0)])
        .await;

    assert_eq!(outcomes[0].state, HarvestState::Failed(FailureKind::Validation));
}

#[tokio::test]
async fn test_listing_fields_fill_missing_attributes() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/product/6"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><script>window.__data={"productStore":{"data":{"prices":{"attributes":{"now":"5"}}}}};</script></head></html>"#,
        ))
        .mount(&server)
        .await;

    let mut listed = candidate(&server, "6", 0, 0);
    listed.name = Some("Listing".to_string());
    listed.price = Some(3.0);
    listed.rating = Some(4.0);

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let outcomes = ProductHarvester::new(&session).harvest_all(vec![listed]).await;

    assert_eq!(outcomes[0].state, HarvestState::Validated);
    let product = outcomes[0].product.as_ref().unwrap();
    assert_eq!(product.product_id(), "6");
    assert_eq!(product.name(), "Listing");
    assert_eq!(product.price(), 5.0);
    assert_eq!(product.rating(), 4.0);
}

#[tokio::test]
async fn test_page_without_payload_fails_extraction() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/product/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Sorry</body></html>"))
        .mount(&server)
        .await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let outcomes = ProductHarvester::new(&session)
        .harvest_all(vec![candidate(&server, "5", 0, 0)])
        .await;

    assert_eq!(outcomes[0].state, HarvestState::Failed(FailureKind::Extraction));
}

#[tokio::test]
async fn test_robots_disallowed_reviews_skip_product() {
    let server = MockServer::start().await;
    mount_robots(&server, "Disallow: /product-api/\n").await;
    Mock::given(method("GET"))
        .and(path("/product/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let outcomes = ProductHarvester::new(&session)
        .harvest_all(vec![candidate(&server, "1", 0, 0)])
        .await;

    assert_eq!(outcomes[0].state, HarvestState::Skipped(SkipReason::Robots));
}

#[tokio::test]
async fn test_reviews_are_paged_up_to_expected_count() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_catalogue(&server, 1000).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let products = ProductHarvester::new(&session)
        .harvest(vec![candidate(&server, "1", 0, 250)])
        .await;

    let reviews = products[0].reviews();
    assert_eq!(reviews.len(), 250);
    assert_eq!(reviews[0], "Review 0");
    assert_eq!(reviews[249], "Review 249");
}

#[tokio::test]
async fn test_review_cap_applies() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_catalogue(&server, 1000).await;

    let mut config = create_test_config(&server);
    config.scraper.max_reviews = 150;
    let session = ScraperSession::new(config).unwrap();

    let products = ProductHarvester::new(&session)
        .harvest(vec![candidate(&server, "1", 0, 900)])
        .await;
    assert_eq!(products[0].reviews().len(), 150);
}

#[tokio::test]
async fn test_short_review_page_stops_paging() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/product-api/bazaar-voice-reviews/partNumber/1"))
        .and(query_param("Offset", "100"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_catalogue(&server, 30).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let products = ProductHarvester::new(&session)
        .harvest(vec![candidate(&server, "1", 0, 400)])
        .await;

    assert_eq!(products[0].reviews().len(), 30);
}

#[tokio::test]
async fn test_review_failure_keeps_collected_reviews() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/product-api/bazaar-voice-reviews/partNumber/1"))
        .and(query_param("Offset", "100"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_catalogue(&server, 1000).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let products = ProductHarvester::new(&session)
        .harvest(vec![candidate(&server, "1", 0, 300)])
        .await;

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].reviews().len(), 100);
}

#[tokio::test]
async fn test_blank_reviews_are_dropped() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/product-api/bazaar-voice-reviews/partNumber/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":{"Results":[{"ReviewText":"Solid"},{"ReviewText":"  "},{}]}}"#,
        ))
        .mount(&server)
        .await;
    mount_catalogue(&server, 0).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let products = ProductHarvester::new(&session)
        .harvest(vec![candidate(&server, "1", 0, 3)])
        .await;

    assert_eq!(products[0].reviews(), &["Solid"]);
}

/// Product pages that answer slowly and record when each request arrived
struct TimedProductPages {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for TimedProductPages {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        let id = request.url.path().trim_start_matches("/product/");
        ResponseTemplate::new(200)
            .set_body_string(product_page(id, 4.0))
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_concurrency_bound_limits_in_flight_fetches() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    let delay = Duration::from_millis(100);
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    Mock::given(method("GET"))
        .and(path_regex(r"^/product/\d+$"))
        .respond_with(TimedProductPages {
            delay,
            arrivals: Arc::clone(&arrivals),
        })
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.scraper.max_concurrent_requests = 2;
    let session = ScraperSession::new(config).unwrap();

    let candidates = (0..8)
        .map(|i| candidate(&server, &(i + 1).to_string(), i, 0))
        .collect();
    let started = Instant::now();
    let products = ProductHarvester::new(&session).harvest(candidates).await;
    let elapsed = started.elapsed();

    assert_eq!(products.len(), 8);
    // Eight 100ms fetches, two at a time, need at least four rounds
    assert!(elapsed >= Duration::from_millis(350), "took {:?}", elapsed);

    // With two slots, a third request can only start once an earlier one
    // has been answered
    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 8);
    for window in arrivals.windows(3) {
        let gap = window[2].duration_since(window[0]);
        assert!(gap >= Duration::from_millis(80), "three requests in flight within {:?}", gap);
    }
}
