//! Integration tests for `CatalogIndexer` against a local HTTP server.
//!
//! Uses `wiremock` to stand up a server per test so no real network
//! traffic is made. Covers the happy paths (multi-variant expansion,
//! pagination until an empty page), per-entry failure isolation, and
//! every whole-run error the indexer can propagate.

use rust_decimal::Decimal;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skudex_core::Platform;
use skudex_scraper::{CatalogIndexer, ExtractError, FetchError, HttpFetcher};

/// Builds a fetcher suitable for tests: 5-second timeout, no retries.
fn test_fetcher() -> HttpFetcher {
    HttpFetcher::new(5, "skudex-test/0.1", 0, 0).expect("failed to build test fetcher")
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// Two-variant product fixture mirroring the public feed shape.
fn trail_pack() -> serde_json::Value {
    json!({
        "id": 8650123,
        "title": "Trail Pack",
        "handle": "trail-pack",
        "body_html": "<p>A pack.</p>",
        "product_type": "Packs",
        "image": {"src": "https://cdn.example.com/pack-main.jpg"},
        "images": [{"src": "https://cdn.example.com/pack-1.jpg"}],
        "variants": [
            {"id": 44001, "title": "38L", "sku": "TW-38", "price": "129.95", "compare_at_price": "159.95"},
            {"id": 44002, "title": "45L", "sku": "TW-45", "price": "149.95", "compare_at_price": null}
        ]
    })
}

fn feed_body(products: &[serde_json::Value]) -> serde_json::Value {
    json!({ "products": products })
}

fn empty_feed() -> serde_json::Value {
    json!({ "products": [] })
}

/// Single-variant product fixture for a second feed page.
fn camp_stove() -> serde_json::Value {
    json!({
        "id": 8650200,
        "title": "Camp Stove",
        "handle": "camp-stove",
        "product_type": "Cooking",
        "variants": [
            {"id": 45001, "title": "Default Title", "sku": "CS-1", "price": "89.00", "compare_at_price": null}
        ]
    })
}

// ---------------------------------------------------------------------------
// Test 1 – multi-variant expansion across a full walk
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_all_unions_pages_and_stops_at_an_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("limit", "250"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[trail_pack()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[camp_stove()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_feed()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let outcome = indexer
        .collect_all(&CancellationToken::new())
        .await
        .expect("catalog walk succeeds");

    assert!(outcome.failures.is_empty(), "expected no failures");
    assert_eq!(
        outcome.records.len(),
        3,
        "expected the union of both non-empty pages"
    );
    assert_eq!(outcome.records[2].sku, "CS-1");
    assert_eq!(outcome.records[2].name, "Camp Stove");

    let first = &outcome.records[0];
    assert_eq!(first.sku, "TW-38");
    assert_eq!(first.group_id.as_deref(), Some("8650123"));
    assert_eq!(first.variant_id.as_deref(), Some("44001"));
    assert_eq!(first.name, "Trail Pack - 38L");
    assert_eq!(first.price, Some(dec("129.95")));
    assert_eq!(first.rrp, Some(dec("159.95")));
    assert_eq!(first.discount_pct, Some(dec("0.1876")));
    assert_eq!(first.category.as_deref(), Some("Packs"));
    assert_eq!(first.images, vec!["https://cdn.example.com/pack-1.jpg"]);
    assert_eq!(
        first.source_url,
        format!("{}/products/trail-pack?variant=44001", server.uri())
    );
    assert_eq!(first.platform, Platform::Shopify);

    let second = &outcome.records[1];
    assert_eq!(second.sku, "TW-45");
    assert_eq!(second.rrp, None, "null compare_at_price stays absent");
    assert_eq!(second.discount_pct, None);
}

// ---------------------------------------------------------------------------
// Test 2 – incremental paging and the exhaustion latch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn next_page_yields_batches_then_stays_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[trail_pack()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_feed()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);

    let batch = indexer
        .next_page()
        .await
        .expect("first page fetches")
        .expect("first page has records");
    assert_eq!(batch.page, 1);
    assert_eq!(batch.records.len(), 2);

    let end = indexer.next_page().await.expect("second page fetches");
    assert!(end.is_none(), "empty page ends the walk");

    // The latch holds without another request; the page-2 mock is
    // limited to a single expected hit.
    let after = indexer.next_page().await.expect("no request is made");
    assert!(after.is_none(), "exhausted indexer keeps returning None");
}

#[tokio::test]
async fn reset_allows_a_second_walk() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[trail_pack()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_feed()))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let first_walk = indexer
        .collect_all(&CancellationToken::new())
        .await
        .expect("first walk succeeds");
    assert_eq!(first_walk.records.len(), 2);

    indexer.reset();
    let second_walk = indexer
        .collect_all(&CancellationToken::new())
        .await
        .expect("second walk succeeds");
    assert_eq!(second_walk.records.len(), 2);
}

// ---------------------------------------------------------------------------
// Test 3 – per-entry failure isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn feed_entries_without_skus_become_failures_not_errors() {
    let server = MockServer::start().await;

    let product = json!({
        "id": 90001,
        "title": "Gift Card",
        "handle": "gift-card",
        "product_type": null,
        "variants": [
            {"id": 1, "title": "Default Title", "sku": null, "price": "25.00", "compare_at_price": null},
            {"id": 2, "title": "Default Title", "sku": "", "price": "50.00", "compare_at_price": null},
            {"id": 3, "title": "100", "sku": "GC-100", "price": "100.00", "compare_at_price": null}
        ]
    });
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[product])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_feed()))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let outcome = indexer
        .collect_all(&CancellationToken::new())
        .await
        .expect("walk succeeds despite bad entries");

    assert_eq!(outcome.records.len(), 1, "only the SKU-bearing variant lands");
    assert_eq!(outcome.records[0].sku, "GC-100");
    assert_eq!(outcome.failures.len(), 2, "sku-less variants are recorded");
    assert!(
        matches!(outcome.failures[0].error, ExtractError::MissingSku { .. }),
        "expected MissingSku, got: {:?}",
        outcome.failures[0].error
    );
    assert_eq!(
        outcome.failures[0].url,
        format!("{}/products/gift-card?variant=1", server.uri())
    );
}

// ---------------------------------------------------------------------------
// Test 4 – whole-run error propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn a_non_feed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let result = indexer.next_page().await;

    assert!(
        matches!(result, Err(ExtractError::Deserialize { .. })),
        "expected Deserialize error, got: {result:?}"
    );
}

#[tokio::test]
async fn http_failures_surface_as_fetch_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let result = indexer.next_page().await;

    match result {
        Err(ExtractError::Fetch(FetchError::Status { status, .. })) => {
            assert_eq!(status, 503);
        }
        other => panic!("expected Fetch(Status), got: {other:?}"),
    }
}

#[tokio::test]
async fn a_missing_catalog_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let result = indexer.next_page().await;

    assert!(
        matches!(result, Err(ExtractError::Fetch(FetchError::NotFound { .. }))),
        "expected Fetch(NotFound), got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Test 5 – cancellation and the pagination guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancellation_stops_before_the_first_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[trail_pack()])))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let outcome = indexer
        .collect_all(&cancel)
        .await
        .expect("cancelled walk still returns Ok");

    assert!(outcome.records.is_empty());
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn the_page_limit_guards_against_endless_catalogs() {
    let server = MockServer::start().await;

    // Every page responds with the same non-empty body.
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[trail_pack()])))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let mut indexer = CatalogIndexer::new(&fetcher, &server.uri(), 0);
    let result = indexer.collect_all(&CancellationToken::new()).await;

    match result {
        Err(ExtractError::PageLimit { max_pages, .. }) => {
            assert_eq!(max_pages, 200);
        }
        other => panic!("expected PageLimit, got: {other:?}"),
    }
}
