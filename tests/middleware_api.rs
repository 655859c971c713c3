mod common;

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use common::{ann_lee_order, spawn_app_with};
use order_intake::infra::config::{AllowedOrigins, AppConfig, RateLimitConfig};
use serde_json::Value;

fn forwarded_for(ip: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(ip),
    )
}

fn limited_config(max_requests: u32) -> AppConfig {
    AppConfig {
        rate_limit: RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        },
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn requests_over_the_limit_are_rejected() {
    let app = spawn_app_with(limited_config(2)).await;
    let (name, value) = forwarded_for("10.0.0.1");

    for _ in 0..2 {
        app.server
            .get("/health")
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::OK);
    }

    let response = app
        .server
        .post("/orders")
        .add_header(name.clone(), value.clone())
        .json(&ann_lee_order())
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.json::<Value>()["error"],
        "Too many requests, please try again later."
    );
    let retry_after: u64 = response
        .header(header::RETRY_AFTER)
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    // Rejected requests are never processed.
    assert_eq!(app.order_count().await, 0);
}

#[tokio::test]
async fn each_source_has_its_own_window() {
    let app = spawn_app_with(limited_config(1)).await;
    let (name, first) = forwarded_for("10.0.0.1");
    let (_, second) = forwarded_for("10.0.0.2");

    app.server
        .get("/health")
        .add_header(name.clone(), first.clone())
        .await
        .assert_status(StatusCode::OK);
    app.server
        .get("/health")
        .add_header(name.clone(), first)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    app.server
        .get("/health")
        .add_header(name, second)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn allow_listed_origins_get_cors_headers() {
    let app = spawn_app_with(AppConfig {
        cors: AllowedOrigins::List(vec!["https://shop.test".into()]),
        ..AppConfig::default()
    })
    .await;

    let allowed = app
        .server
        .get("/health")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://shop.test"))
        .await;
    assert_eq!(
        allowed.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "https://shop.test"
    );

    let denied = app
        .server
        .get("/health")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://evil.test"))
        .await;
    assert!(
        denied
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn any_origin_is_allowed_by_default() {
    let app = spawn_app_with(AppConfig::default()).await;

    let response = app
        .server
        .get("/health")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://any.test"))
        .await;

    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
}

#[tokio::test]
async fn static_frontend_is_served_when_configured() {
    let public = tempfile::tempdir().unwrap();
    std::fs::write(public.path().join("index.html"), "<h1>Shop</h1>").unwrap();

    let app = spawn_app_with(AppConfig {
        static_dir: Some(public.path().to_path_buf()),
        ..AppConfig::default()
    })
    .await;

    let response = app.server.get("/index.html").await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "<h1>Shop</h1>");
    // API routes still win over the static fallback.
    app.server.get("/health").await.assert_status(StatusCode::OK);
}
