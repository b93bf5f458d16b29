//! In-memory fake of the push notification API.
//!
//! Models enough of the service for client integration tests: a device token
//! registry keyed by normalized token, push endpoints that reject empty
//! messages, and a feedback endpoint that requires a `since` timestamp.
//! Every route demands the Basic credentials the server was built with.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const APPLICATION_KEY: &str = "app key";
pub const APPLICATION_MASTER_SECRET: &str = "app master secret";

/// A registered token as the fake stores it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenRecord {
    pub device_token: String,
    pub active: bool,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// One entry of the feedback list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEntry {
    pub device_token: String,
    pub marked_inactive_on: String,
}

#[derive(Default)]
pub struct Registry {
    pub tokens: HashMap<String, TokenRecord>,
    pub pushes: Vec<Value>,
    pub feedback: Vec<FeedbackEntry>,
}

pub type Db = Arc<RwLock<Registry>>;

#[derive(Deserialize)]
pub struct FeedbackQuery {
    pub since: Option<String>,
}

pub fn app() -> Router {
    app_with(Db::default())
}

/// Router over a caller-owned registry so tests can seed or inspect it.
pub fn app_with(db: Db) -> Router {
    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{APPLICATION_KEY}:{APPLICATION_MASTER_SECRET}"))
    );
    Router::new()
        .route("/api/device_tokens/feedback/", get(feedback))
        .route(
            "/api/device_tokens/{token}",
            get(get_token).put(register_token).delete(delete_token),
        )
        .route(
            "/api/apids/{token}",
            get(get_token).put(register_token).delete(delete_token),
        )
        .route("/api/push/", post(push))
        .route("/api/push/batch/", post(batch_push))
        .route("/api/push/broadcast/", post(broadcast))
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            let expected = expected.clone();
            async move { require_basic_auth(&expected, req, next).await }
        }))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Db::default()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

async fn require_basic_auth(expected: &str, req: Request, next: Next) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if provided != Some(expected) {
        tracing::debug!(path = %req.uri().path(), "rejecting request without valid credentials");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

/// 201 for a new token, 200 when it was already registered. A non-empty body
/// must be a JSON object and replaces the stored metadata.
async fn register_token(
    State(db): State<Db>,
    Path(token): Path<String>,
    body: String,
) -> Result<StatusCode, StatusCode> {
    let metadata = if body.is_empty() {
        Map::new()
    } else {
        serde_json::from_str::<Map<String, Value>>(&body).map_err(|_| StatusCode::BAD_REQUEST)?
    };

    let mut registry = db.write().await;
    let created = !registry.tokens.contains_key(&token);
    registry.tokens.insert(
        token.clone(),
        TokenRecord {
            device_token: token,
            active: true,
            metadata,
        },
    );
    Ok(if created { StatusCode::CREATED } else { StatusCode::OK })
}

async fn get_token(
    State(db): State<Db>,
    Path(token): Path<String>,
) -> Result<Json<TokenRecord>, StatusCode> {
    let registry = db.read().await;
    registry.tokens.get(&token).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_token(
    State(db): State<Db>,
    Path(token): Path<String>,
) -> StatusCode {
    let mut registry = db.write().await;
    match registry.tokens.remove(&token) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

fn non_empty_message(value: &Value) -> bool {
    value.as_object().is_some_and(|m| !m.is_empty())
}

async fn push(State(db): State<Db>, Json(message): Json<Value>) -> StatusCode {
    if !non_empty_message(&message) {
        return StatusCode::BAD_REQUEST;
    }
    db.write().await.pushes.push(message);
    StatusCode::OK
}

async fn batch_push(State(db): State<Db>, Json(messages): Json<Vec<Value>>) -> StatusCode {
    if messages.is_empty() || !messages.iter().all(non_empty_message) {
        return StatusCode::BAD_REQUEST;
    }
    db.write().await.pushes.extend(messages);
    StatusCode::OK
}

async fn broadcast(State(db): State<Db>, Json(message): Json<Value>) -> StatusCode {
    if !non_empty_message(&message) {
        return StatusCode::BAD_REQUEST;
    }
    db.write().await.pushes.push(message);
    StatusCode::OK
}

/// Entries marked inactive at or after `since`. Timestamps are compared as
/// `YYYY-MM-DDTHH:MM:SSZ` strings, which order chronologically.
async fn feedback(
    State(db): State<Db>,
    Query(query): Query<FeedbackQuery>,
) -> Result<Json<Vec<FeedbackEntry>>, StatusCode> {
    let since = query.since.ok_or(StatusCode::BAD_REQUEST)?;
    if !looks_like_utc_timestamp(&since) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let registry = db.read().await;
    let entries = registry
        .feedback
        .iter()
        .filter(|entry| entry.marked_inactive_on.as_str() >= since.as_str())
        .cloned()
        .collect();
    Ok(Json(entries))
}

fn looks_like_utc_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 20
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            19 => *b == b'Z',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_record_flattens_metadata() {
        let mut metadata = Map::new();
        metadata.insert("alias".to_string(), Value::from("CapnKernul"));
        let record = TokenRecord {
            device_token: "ABC".to_string(),
            active: true,
            metadata,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["device_token"], "ABC");
        assert_eq!(json["active"], true);
        assert_eq!(json["alias"], "CapnKernul");
    }

    #[test]
    fn utc_timestamp_shape() {
        assert!(looks_like_utc_timestamp("1970-01-01T00:00:00Z"));
        assert!(!looks_like_utc_timestamp("1970-01-01 00:00:00"));
        assert!(!looks_like_utc_timestamp("1970-01-01T00:00:00+00:00"));
        assert!(!looks_like_utc_timestamp(""));
    }

    #[test]
    fn empty_object_is_not_a_message() {
        assert!(!non_empty_message(&serde_json::json!({})));
        assert!(!non_empty_message(&serde_json::json!([])));
        assert!(non_empty_message(&serde_json::json!({"aps": {}})));
    }
}
