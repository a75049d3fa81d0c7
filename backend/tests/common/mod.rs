//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use isuumo_backend::{build_router, AppConfig, AppState};
use serde_json::Value;
use tower::ServiceExt;

pub const BOUNDARY: &str = "isuumo-test-boundary";

pub const CHAIRS_CSV: &str = "\
1,ふわふわチェア,やわらかい,/images/chair/1.png,2800,79,110,150,黒,\"肘掛け,キャスター\",座椅子,100,3
2,がっしりチェア,頑丈,/images/chair/2.png,5000,100,60,50,白,肘掛け,ゲーミングチェア,200,1
3,売り切れチェア,品切れ,/images/chair/3.png,1000,100,60,50,黒,,座椅子,300,0
";

pub const ESTATES_CSV: &str = "\
10,駅前ハイツ,便利,/images/estate/10.png,東京都千代田区,35.0,139.0,40000,120,70,\"ペット相談可,角部屋\",5
11,川沿いレジデンス,静か,/images/estate/11.png,東京都江東区,35.5,139.5,80000,200,200,角部屋,50
12,山の上コーポ,眺望,/images/estate/12.png,東京都八王子市,36.5,140.5,30000,60,60,,1
";

pub fn app() -> Router {
    let state = AppState::new(&AppConfig::in_memory()).expect("state");
    build_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::USER_AGENT, "Mozilla/5.0 (test)")
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn post_upload(uri: &str, field: &str, csv: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{field}.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

/// Router with the sample chairs and estates imported.
pub async fn seeded_app() -> Router {
    let app = app();
    let (status, _) = send(&app, post_upload("/api/chair", "chairs", CHAIRS_CSV)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, post_upload("/api/estate", "estates", ESTATES_CSV)).await;
    assert_eq!(status, StatusCode::CREATED);
    app
}

pub fn ids(body: &Value, key: &str) -> Vec<i64> {
    body[key]
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}
