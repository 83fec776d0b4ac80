use actix_cors::Cors;
use actix_web::http::{header, Method, StatusCode};
use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;

use memorial_api::api::{self, AppState};
use memorial_api::metrics::MetricsCollector;
use memorial_api::store::Store;
use memorial_api::tribute::TributeComposer;

/// Helper to create AppState backed by a fresh in-memory store
fn create_app_state() -> AppState {
    AppState {
        store: Arc::new(Store::in_memory().unwrap()),
        composer: Arc::new(TributeComposer::new(
            "http://127.0.0.1:9".to_string(),
            None,
            "test-model".to_string(),
        )),
    }
}

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(create_app_state()))
                .configure(api::configure_routes),
        )
        .await
    };
}

// ==================== Health ====================

#[actix_web::test]
async fn test_health_check() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["status"], "ok");
    assert!(!resp["timestamp"].as_str().unwrap().is_empty());
}

// ==================== OPTIONS / preflight ====================

#[actix_web::test]
async fn test_options_returns_no_content_without_a_body() {
    let app = init_app!();

    for uri in ["/api/candles", "/api/guestbook", "/api/tribute"] {
        let req = test::TestRequest::with_uri(uri)
            .method(Method::OPTIONS)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT, "{}", uri);
        let body = test::read_body(resp).await;
        assert!(body.is_empty(), "{} body should be empty", uri);
    }
}

#[actix_web::test]
async fn test_browser_preflight_carries_cors_headers() {
    // The CORS layer is attached in main; mirror it here
    let app = test::init_service(
        App::new()
            .wrap(Cors::permissive())
            .app_data(web::Data::new(create_app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let req = test::TestRequest::with_uri("/api/candles")
        .method(Method::OPTIONS)
        .insert_header((header::ORIGIN, "https://example.com"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PUT"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success() || resp.status() == StatusCode::NO_CONTENT);
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[actix_web::test]
async fn test_simple_cross_origin_get_is_allowed() {
    let app = test::init_service(
        App::new()
            .wrap(Cors::permissive())
            .app_data(web::Data::new(create_app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/lanterns")
        .insert_header((header::ORIGIN, "https://example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

// ==================== Method dispatch ====================

#[actix_web::test]
async fn test_unsupported_methods_are_405_with_json_error() {
    let app = init_app!();

    for (method, uri) in [
        (Method::DELETE, "/api/candles"),
        (Method::PATCH, "/api/guestbook"),
        (Method::DELETE, "/api/tribute"),
    ] {
        let req = test::TestRequest::with_uri(uri)
            .method(method.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(
            resp.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{} {}",
            method,
            uri
        );
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Method not allowed");
    }
}

// ==================== Metrics ====================

#[actix_web::test]
async fn test_metrics_counts_api_traffic() {
    let metrics = MetricsCollector::new();
    let app = test::init_service(
        App::new()
            .wrap(metrics.clone())
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(create_app_state()))
            .configure(api::configure_routes),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/api/candles").to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::post()
        .uri("/api/guestbook")
        .set_json(json!({ "name": "Ada", "message": "hello" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["total_calls"], 3);
    let endpoints = resp["endpoints"].as_array().unwrap();
    assert!(endpoints
        .iter()
        .any(|e| e["path"] == "/api/candles" && e["method"] == "GET" && e["count"] == 2));
    assert!(endpoints
        .iter()
        .any(|e| e["path"] == "/api/guestbook" && e["method"] == "POST" && e["count"] == 1));
}
