mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{get, post_json, seeded_app, send};

#[tokio::test]
async fn initialize_resets_data() {
    let app = seeded_app().await;
    let (status, body) = send(&app, post_json("/initialize", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "rust");

    let (_, body) = send(&app, get("/api/chair/low_priced")).await;
    assert_eq!(body["chairs"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn bots_are_turned_away() {
    let app = common::app();
    for ua in ["ISUCONbot/1.0", "Mozilla/5.0 (compatible; Googlebot/2.1)", "isubot"] {
        let request = Request::builder()
            .uri("/api/chair/low_priced")
            .header(header::USER_AGENT, ua)
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{ua}");
    }
}

#[tokio::test]
async fn request_id_is_echoed() {
    use tower::ServiceExt;

    let app = common::app();
    let request = Request::builder()
        .uri("/api/estate/low_priced")
        .header("x-request-id", "req-from-client")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("infallible");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").map(|v| v.as_bytes()),
        Some(&b"req-from-client"[..])
    );
}
