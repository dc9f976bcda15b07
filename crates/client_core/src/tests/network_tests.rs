use super::*;

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use shared::{
    domain::Item,
    error::{ApiError, ErrorCode},
};
use tokio::net::TcpListener;

async fn spawn_items_server(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn http_source_decodes_items() {
    let app = Router::new().route(
        ITEMS_ROUTE,
        get(|| async { Json(ItemsResponse::now(vec![Item::new(7, "seven")])) }),
    );
    let server_url = spawn_items_server(app).await.expect("spawn server");

    let source = HttpItemsSource::new(&format!("{server_url}/")).expect("source");
    let response = source.fetch_items().await.expect("items");

    assert_eq!(source.endpoint().path(), "/items");
    assert_eq!(response.items, vec![Item::new(7, "seven")]);
}

#[tokio::test]
async fn http_source_maps_api_error_bodies() {
    let app = Router::new().route(
        ITEMS_ROUTE,
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, "items unavailable")),
            )
        }),
    );
    let server_url = spawn_items_server(app).await.expect("spawn server");

    let err = HttpItemsSource::new(&server_url)
        .expect("source")
        .fetch_items()
        .await
        .expect_err("server error");

    match err {
        FetchError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal: items unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn http_source_rejects_malformed_payloads() {
    let app = Router::new().route(ITEMS_ROUTE, get(|| async { "not json" }));
    let server_url = spawn_items_server(app).await.expect("spawn server");

    let err = HttpItemsSource::new(&server_url)
        .expect("source")
        .fetch_items()
        .await
        .expect_err("decode error");

    assert!(matches!(err, FetchError::Decode(_)), "{err}");
}

#[test]
fn http_source_rejects_invalid_server_url() {
    let err = HttpItemsSource::new("not a url").err().expect("invalid url");
    assert!(matches!(err, FetchError::InvalidUrl { .. }), "{err}");
}

#[test]
fn http_source_keeps_server_path_prefix() {
    let source = HttpItemsSource::new("http://localhost:8080/api/").expect("source");
    assert_eq!(source.endpoint().as_str(), "http://localhost:8080/api/items");
}

#[tokio::test(start_paused = true)]
async fn mock_source_waits_for_latency_and_counts_requests() {
    let source = MockItemsSource::new(
        MockSettings::default()
            .with_latency(Duration::from_millis(250))
            .with_items(vec![Item::new(1, "only")]),
    );
    let started = tokio::time::Instant::now();

    let response = source.fetch_items().await.expect("items");

    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(response.items, vec![Item::new(1, "only")]);
    assert_eq!(source.requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_mock_source_reports_mocked_error() {
    let source = MockItemsSource::new(MockSettings::default().failing());

    let err = source.fetch_items().await.expect_err("mocked failure");

    assert!(matches!(err, FetchError::Mocked(_)), "{err}");
    assert_eq!(source.requests(), 1);
}
