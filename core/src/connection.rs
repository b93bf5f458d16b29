//! Authenticated HTTP connection to the push API.
//!
//! # Design
//! `Connection` wraps a single `ureq::Agent`, which pools sockets and is safe
//! to share across threads. The Basic `Authorization` header is computed once
//! at construction and attached to every request. Status codes are never
//! turned into errors here; `http_status_as_error(false)` lets 4xx/5xx
//! responses reach the client as data.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use url::Url;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{is_success, HttpMethod, HttpRequest, HttpResponse, Transport};

/// Upper bound on a response body. Feedback lists for large audiences run
/// well past ureq's 10 MB default.
pub const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

pub struct Connection {
    agent: ureq::Agent,
    url: Url,
    base_url: String,
    authorization: String,
}

impl Connection {
    /// Validate `config` and build the agent. Performs no I/O.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let url = config.validate()?;
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .build()
            .new_agent();

        Ok(Self {
            agent,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            url,
            authorization: basic_auth(&config.application_key, &config.application_master_secret),
        })
    }

    /// Base URL without a trailing slash; request paths are appended to it.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// The `Authorization` header value sent with every request.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .field("authorization", &"Basic <redacted>")
            .finish()
    }
}

impl Transport for Connection {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.url_for(&request.path);
        let auth = self.authorization.as_str();

        let result = match (request.method, request.body) {
            (HttpMethod::Get, _) => {
                with_headers(self.agent.get(&url), auth, &request.headers).call()
            }
            (HttpMethod::Delete, _) => {
                with_headers(self.agent.delete(&url), auth, &request.headers).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&url), auth, &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&url), auth, &request.headers).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&url), auth, &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_headers(self.agent.put(&url), auth, &request.headers).send_empty()
            }
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let read = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec();
        let body = match read {
            Ok(body) => body,
            Err(e) if is_success(status) => return Err(e.into()),
            // Error bodies are informational only; the status is the answer.
            Err(e) => {
                tracing::debug!(status, error = %e, "discarding unreadable error body");
                Vec::new()
            }
        };

        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            status,
            "push API request completed"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    builder: ureq::RequestBuilder<B>,
    authorization: &str,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    headers
        .iter()
        .fold(builder.header("Authorization", authorization), |b, (name, value)| {
            b.header(name.as_str(), value.as_str())
        })
}

/// RFC 7617 credentials: `Basic base64(user ":" password)`.
pub fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}
