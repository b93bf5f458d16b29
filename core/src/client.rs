//! Push API client: request construction, round-trip, and status mapping.
//!
//! # Design
//! Every operation is split the same way the I/O boundary runs: a `build_*`
//! method produces an `HttpRequest`, the `Transport` executes it, and a
//! parse helper maps the `HttpResponse` to the caller-facing value. The
//! build and parse halves are public so hosts that do their own I/O can use
//! them directly.
//!
//! Non-2xx responses are answers, not failures: write operations return
//! `false` and reads return `None`. Errors are reserved for transport faults
//! and for a 2xx body that is not valid JSON.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{PushError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::logger::Logger;
use crate::token::device_token_path;
use crate::types::{Payload, BATCH_PUSH_PATH, BROADCAST_PATH, FEEDBACK_PATH, PUSH_PATH};

/// Client for the push notification API.
///
/// Holds one connection and an optional logger, both fixed at construction.
pub struct PushClient<T: Transport = Connection> {
    connection: T,
    logger: Option<Arc<dyn Logger>>,
}

impl PushClient<Connection> {
    /// Client for the production host authenticated as
    /// `application_key:application_master_secret`.
    pub fn new(application_key: &str, application_master_secret: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(application_key, application_master_secret))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(Connection::new(config)?))
    }
}

impl<T: Transport> PushClient<T> {
    pub fn with_transport(connection: T) -> Self {
        Self {
            connection,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn connection(&self) -> &T {
        &self.connection
    }

    pub fn logger(&self) -> Option<&Arc<dyn Logger>> {
        self.logger.as_ref()
    }

    /// Register `device_token`, optionally with metadata such as an alias or
    /// tags. Returns true for 201 (new) and 200 (already registered).
    pub fn register_device_token(&self, device_token: &str, payload: &Payload) -> Result<bool> {
        let request = self.build_register_device_token(device_token, payload)?;
        let response = self.connection.execute(request)?;
        self.log_response("register_device_token", &response);
        Ok(response.is_success())
    }

    /// Fetch the registration record, or `None` if the service does not know
    /// the token.
    pub fn device_token(&self, device_token: &str) -> Result<Option<Payload>> {
        let response = self.connection.execute(self.build_device_token(device_token))?;
        parse_json(&response)
    }

    pub fn delete_device_token(&self, device_token: &str) -> Result<bool> {
        let response = self
            .connection
            .execute(self.build_delete_device_token(device_token))?;
        Ok(response.is_success())
    }

    pub fn push(&self, payload: &Payload) -> Result<bool> {
        let response = self.connection.execute(self.build_push(payload)?)?;
        self.log_response("push", &response);
        Ok(response.is_success())
    }

    /// Send several messages in one request, in slice order.
    pub fn batch_push(&self, payloads: &[Payload]) -> Result<bool> {
        let response = self.connection.execute(self.build_batch_push(payloads)?)?;
        Ok(response.is_success())
    }

    pub fn broadcast(&self, payload: &Payload) -> Result<bool> {
        let response = self.connection.execute(self.build_broadcast(payload)?)?;
        Ok(response.is_success())
    }

    /// Tokens the service has marked inactive since `since`.
    pub fn feedback(&self, since: impl Into<OffsetDateTime>) -> Result<Option<Value>> {
        let response = self.connection.execute(self.build_feedback(since)?)?;
        parse_json(&response)
    }

    /// An empty payload produces a PUT with no body and no content type.
    pub fn build_register_device_token(&self, device_token: &str, payload: &Payload) -> Result<HttpRequest> {
        let path = device_token_path(device_token);
        if payload.is_empty() {
            return Ok(bare_request(HttpMethod::Put, path));
        }
        json_request(HttpMethod::Put, path, payload)
    }

    pub fn build_device_token(&self, device_token: &str) -> HttpRequest {
        bare_request(HttpMethod::Get, device_token_path(device_token))
    }

    pub fn build_delete_device_token(&self, device_token: &str) -> HttpRequest {
        bare_request(HttpMethod::Delete, device_token_path(device_token))
    }

    pub fn build_push(&self, payload: &Payload) -> Result<HttpRequest> {
        json_request(HttpMethod::Post, PUSH_PATH.to_string(), payload)
    }

    pub fn build_batch_push(&self, payloads: &[Payload]) -> Result<HttpRequest> {
        json_request(HttpMethod::Post, BATCH_PUSH_PATH.to_string(), payloads)
    }

    pub fn build_broadcast(&self, payload: &Payload) -> Result<HttpRequest> {
        json_request(HttpMethod::Post, BROADCAST_PATH.to_string(), payload)
    }

    pub fn build_feedback(&self, since: impl Into<OffsetDateTime>) -> Result<HttpRequest> {
        let since = format_since(since.into())?;
        let encoded: String = url::form_urlencoded::byte_serialize(since.as_bytes()).collect();
        Ok(bare_request(
            HttpMethod::Get,
            format!("{FEEDBACK_PATH}?since={encoded}"),
        ))
    }

    fn log_response(&self, operation: &str, response: &HttpResponse) {
        if let Some(logger) = &self.logger {
            logger.info(&format!("{operation} response: {response:?}"));
        }
    }
}

/// `true` for any 2xx status.
pub fn parse_success(response: &HttpResponse) -> bool {
    response.is_success()
}

/// Decode the body of a 2xx response. Any other status yields `None`; a 2xx
/// body that fails to decode is an error rather than `None`.
pub fn parse_json<V: DeserializeOwned>(response: &HttpResponse) -> Result<Option<V>> {
    if !response.is_success() {
        return Ok(None);
    }
    serde_json::from_slice(&response.body)
        .map(Some)
        .map_err(PushError::Deserialization)
}

/// Whole-second ISO-8601 in UTC, e.g. `1970-01-01T00:00:00Z`.
pub fn format_since(since: OffsetDateTime) -> Result<String> {
    let utc = since.to_offset(UtcOffset::UTC);
    Ok(utc.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
    ))?)
}

fn bare_request(method: HttpMethod, path: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn json_request<P: serde::Serialize + ?Sized>(method: HttpMethod, path: String, payload: &P) -> Result<HttpRequest> {
    let body = serde_json::to_string(payload).map_err(PushError::Serialization)?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}
