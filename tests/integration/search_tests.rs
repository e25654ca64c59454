use crate::common::*;
use shelf_harvest::scraper::{ScraperSession, SearchPaginator};
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_harvests_products_in_rank_order() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /basket\n").await;
    mount_search_page(
        &server,
        "case",
        1,
        search_page(vec![hit(30, 0), hit(10, 2), hit(20, 0)], 1, 3),
    )
    .await;
    mount_catalogue(&server, 2).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let collection = session.search_for_products("case").await.unwrap();

    assert_eq!(collection.name(), "case");
    assert_eq!(ids(&collection), vec!["30", "10", "20"]);

    let product = &collection.products()[1];
    assert_eq!(product.name(), "Product 10");
    assert_eq!(product.price(), 19.99);
    assert_eq!(product.rating(), 4.0);
    assert_eq!(product.description(), "About 10");
    assert_eq!(product.reviews(), &["Review 0", "Review 1"]);
    assert!(product.url().contains("/product/10"));

    assert!(collection.products()[0].reviews().is_empty());
}

#[tokio::test]
async fn test_robots_disallow_aborts_before_search() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /search/\n").await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/search/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    assert!(session.search_for_products("case").await.is_none());
}

#[tokio::test]
async fn test_unreachable_robots_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_search_page(&server, "lamp", 1, search_page(vec![hit(1, 0)], 1, 1)).await;
    mount_catalogue(&server, 0).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let report = session.search("lamp").await;

    assert!(report.robots_warning.is_some());
    assert_eq!(ids(&report.collection.unwrap()), vec!["1"]);
}

#[tokio::test]
async fn test_first_page_failure_returns_none() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/search/case/opt/page:1/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let paginator = SearchPaginator::new(&session);
    assert!(paginator.collect_search_results("case").await.is_none());
}

#[tokio::test]
async fn test_zero_results_returns_no_collection() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_search_page(&server, "nothing", 1, search_page(vec![], 0, 0)).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let candidates = SearchPaginator::new(&session)
        .collect_search_results("nothing")
        .await
        .unwrap();
    assert!(candidates.is_empty());

    assert!(session.search_for_products("nothing").await.is_none());
}

#[tokio::test]
async fn test_failed_middle_page_is_skipped() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    for page in [1, 2, 4, 5] {
        let first = page * 10;
        mount_search_page(
            &server,
            "tv",
            page,
            search_page(vec![hit(first, 0), hit(first + 1, 0)], 5, 10),
        )
        .await;
    }
    Mock::given(method("GET"))
        .and(path("/search/tv/opt/page:3/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let candidates = SearchPaginator::new(&session)
        .collect_search_results("tv")
        .await
        .unwrap();

    let found: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(found, vec!["10", "11", "20", "21", "40", "41", "50", "51"]);

    let ranks: Vec<usize> = candidates.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, (0..8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_transient_page_failure_recovers() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    let page_hits = |page: u32| (0..20).map(|i| hit(page * 100 + i, 0)).collect::<Vec<_>>();

    mount_search_page(&server, "case", 1, search_page(page_hits(1), 3, 60)).await;
    Mock::given(method("GET"))
        .and(path("/search/case/opt/page:2/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_search_page(&server, "case", 2, search_page(page_hits(2), 3, 60)).await;
    mount_search_page(&server, "case", 3, search_page(page_hits(3), 3, 60)).await;
    mount_catalogue(&server, 0).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let collection = session.search_for_products("case").await.unwrap();

    assert_eq!(collection.len(), 60);
    let got = ids(&collection);
    assert_eq!(got[0], "100");
    assert_eq!(got[20], "200");
    assert_eq!(got[59], "319");
}

#[tokio::test]
async fn test_page_cap_limits_pages_fetched() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_search_page(&server, "desk", 1, search_page(vec![hit(1, 0)], 9, 9)).await;
    mount_search_page(&server, "desk", 2, search_page(vec![hit(2, 0)], 9, 9)).await;
    Mock::given(method("GET"))
        .and(path("/search/desk/opt/page:3/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.scraper.page_cap = 2;
    let session = ScraperSession::new(config).unwrap();

    let candidates = SearchPaginator::new(&session)
        .collect_search_results("desk")
        .await
        .unwrap();
    assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn test_duplicates_merged_and_truncated() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_search_page(
        &server,
        "chair",
        1,
        search_page(vec![hit(1, 0), hit(2, 0), hit(3, 0)], 2, 6),
    )
    .await;
    mount_search_page(
        &server,
        "chair",
        2,
        search_page(vec![hit(2, 0), hit(4, 0), hit(5, 0)], 2, 6),
    )
    .await;

    let mut config = create_test_config(&server);
    config.scraper.max_products = 4;
    let session = ScraperSession::new(config).unwrap();

    let candidates = SearchPaginator::new(&session)
        .collect_search_results("chair")
        .await
        .unwrap();
    let found: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(found, vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_throttling_lowers_rate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let url = url::Url::parse(&format!("{}/busy", server.uri())).unwrap();
    let report = session
        .fetch_paced(&url, &reqwest::header::HeaderMap::new())
        .await;

    assert_eq!(report.throttled, 3);
    let expected = 1000.0 * 0.9f64.powi(3);
    assert!((session.rate().current_rate() - expected).abs() < 1e-6);
}

#[tokio::test]
async fn test_success_raises_rate_up_to_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.rate_limit.initial_rate = 900.0;
    let session = ScraperSession::new(config).unwrap();
    let url = url::Url::parse(&format!("{}/ok", server.uri())).unwrap();

    session
        .fetch_paced(&url, &reqwest::header::HeaderMap::new())
        .await;
    assert!((session.rate().current_rate() - 990.0).abs() < 1e-6);

    session
        .fetch_paced(&url, &reqwest::header::HeaderMap::new())
        .await;
    assert_eq!(session.rate().current_rate(), 1000.0);
}

#[tokio::test]
async fn test_background_search_reports_like_foreground() {
    use shelf_harvest::output::format_markdown_report;
    use shelf_harvest::scraper::{spawn_search, SearchStatus};
    use std::sync::Arc;

    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_search_page(&server, "rug", 1, search_page(vec![hit(7, 0), hit(8, 0)], 1, 2)).await;
    Mock::given(method("GET"))
        .and(path("/product/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_catalogue(&server, 0).await;

    let session = Arc::new(ScraperSession::new(create_test_config(&server)).unwrap());
    let handle = spawn_search(session, "rug");

    let report = match handle.wait_timeout(Duration::from_secs(10)).await {
        SearchStatus::Completed(report) => *report,
        other => panic!("unexpected status: {:?}", other),
    };

    assert!(report.search_completed);
    assert_eq!(report.candidates, 2);
    assert_eq!(report.validated, 1);
    assert_eq!(report.failed_fetch, 1);
    assert_eq!(ids(report.collection.as_ref().unwrap()), vec!["7"]);

    let markdown = format_markdown_report(&report);
    assert!(markdown.contains("# Search Report: rug"));
    assert!(markdown.contains("| Failed (fetch) | 1 |"));
}

#[tokio::test]
async fn test_background_search_without_products_keeps_report() {
    use shelf_harvest::scraper::{spawn_search, SearchStatus};
    use std::sync::Arc;

    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_search_page(&server, "void", 1, search_page(vec![], 0, 0)).await;

    let session = Arc::new(ScraperSession::new(create_test_config(&server)).unwrap());
    let status = spawn_search(session, "void")
        .wait_timeout(Duration::from_secs(10))
        .await;

    assert!(matches!(status, SearchStatus::NoResults(_)));
    let report = status.report().unwrap();
    assert!(report.search_completed);
    assert_eq!(report.candidates, 0);
    assert!(status.collection().is_none());
}
