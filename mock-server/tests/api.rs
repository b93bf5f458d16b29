use axum::http::{self, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Db, FeedbackEntry, TokenRecord, APPLICATION_KEY, APPLICATION_MASTER_SECRET};
use tower::ServiceExt;

const APPLE: &str = "1234567890ABCDEF1234567890ABCDEF1234567890ABCDEF1234567890ABCDEF";

fn auth() -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{APPLICATION_KEY}:{APPLICATION_MASTER_SECRET}"))
    )
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, auth())
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, auth())
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/push/")
                .method("POST")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_credentials_return_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("/api/device_tokens/{APPLE}"))
                .header(http::header::AUTHORIZATION, "Basic d3Jvbmc6d3Jvbmc=")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- device tokens ---

#[tokio::test]
async fn register_new_token_returns_201_then_200() {
    let db = Db::default();
    let uri = format!("/api/device_tokens/{APPLE}");

    let resp = app_with(db.clone()).oneshot(request("PUT", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app_with(db.clone()).oneshot(request("PUT", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(db.read().await.tokens.len(), 1);
}

#[tokio::test]
async fn register_with_metadata_is_returned_on_get() {
    let db = Db::default();
    let uri = format!("/api/device_tokens/{APPLE}");

    let resp = app_with(db.clone())
        .oneshot(json_request("PUT", &uri, r#"{"alias":"CapnKernul"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app_with(db).oneshot(request("GET", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let record: TokenRecord = body_json(resp).await;
    assert_eq!(record.device_token, APPLE);
    assert_eq!(record.metadata["alias"], "CapnKernul");
}

#[tokio::test]
async fn register_with_non_object_body_returns_400() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/apids/SOMEAPID", "[1]"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_token_returns_404() {
    let resp = app()
        .oneshot(request("GET", "/api/apids/UNKNOWN"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_token_returns_204_then_404() {
    let db = Db::default();
    let uri = "/api/apids/SOMEAPID";
    app_with(db.clone()).oneshot(request("PUT", uri)).await.unwrap();

    let resp = app_with(db.clone()).oneshot(request("DELETE", uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app_with(db).oneshot(request("DELETE", uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- push ---

#[tokio::test]
async fn push_records_message() {
    let db = Db::default();
    let resp = app_with(db.clone())
        .oneshot(json_request("POST", "/api/push/", r#"{"aps":{"alert":"hi"}}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(db.read().await.pushes.len(), 1);
}

#[tokio::test]
async fn push_empty_message_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/push/", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_push_records_in_order() {
    let db = Db::default();
    let resp = app_with(db.clone())
        .oneshot(json_request(
            "POST",
            "/api/push/batch/",
            r#"[{"aps":{"alert":"one"}},{"aps":{"alert":"two"}}]"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let registry = db.read().await;
    assert_eq!(registry.pushes[0]["aps"]["alert"], "one");
    assert_eq!(registry.pushes[1]["aps"]["alert"], "two");
}

#[tokio::test]
async fn batch_push_with_empty_messages_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/push/batch/", "[{},{}]"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn broadcast_empty_message_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/push/broadcast/", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- feedback ---

#[tokio::test]
async fn feedback_filters_by_since() {
    let db = Db::default();
    db.write().await.feedback = vec![
        FeedbackEntry {
            device_token: "OLD".to_string(),
            marked_inactive_on: "2009-06-22T10:05:00Z".to_string(),
        },
        FeedbackEntry {
            device_token: "NEW".to_string(),
            marked_inactive_on: "2011-01-01T00:00:00Z".to_string(),
        },
    ];

    let resp = app_with(db)
        .oneshot(request(
            "GET",
            "/api/device_tokens/feedback/?since=2010-01-01T00%3A00%3A00Z",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let entries: Vec<FeedbackEntry> = body_json(resp).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].device_token, "NEW");
}

#[tokio::test]
async fn feedback_without_since_returns_400() {
    let resp = app()
        .oneshot(request("GET", "/api/device_tokens/feedback/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feedback_with_malformed_since_returns_400() {
    let resp = app()
        .oneshot(request("GET", "/api/device_tokens/feedback/?since=yesterday"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
