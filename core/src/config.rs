//! Client configuration.
//!
//! Credentials are the application key and master secret issued by the push
//! service; they become the Basic auth user and password on every request.
//! The base URL defaults to the production host and is only overridden to
//! target a staging or mock server.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{PushError, Result};
use crate::types::BASE_URL;

pub const ENV_APPLICATION_KEY: &str = "ZEPPELIN_APPLICATION_KEY";
pub const ENV_APPLICATION_MASTER_SECRET: &str = "ZEPPELIN_APPLICATION_MASTER_SECRET";
pub const ENV_BASE_URL: &str = "ZEPPELIN_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ZEPPELIN_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub application_key: String,
    pub application_master_secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Global per-request timeout in milliseconds, handed to the transport.
    /// `None` keeps the transport default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(application_key: impl Into<String>, application_master_secret: impl Into<String>) -> Self {
        Self {
            application_key: application_key.into(),
            application_master_secret: application_master_secret.into(),
            base_url: default_base_url(),
            timeout_ms: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Read the configuration from `ZEPPELIN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| PushError::Config(format!("{key} is not set")))
        };
        let mut config = Self::new(
            required(ENV_APPLICATION_KEY)?,
            required(ENV_APPLICATION_MASTER_SECRET)?,
        );
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| PushError::Config(format!("{ENV_TIMEOUT_SECS}={raw:?}: {e}")))?;
            config.timeout_ms = Some(secs.saturating_mul(1000));
        }
        Ok(config)
    }

    /// Parse a JSON document into a configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PushError::Config(e.to_string()))
    }

    /// Check the base URL and credentials, returning the parsed URL.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| PushError::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PushError::Config(format!(
                "base URL must use http or https, got {:?}",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(PushError::Config(format!("base URL {:?} has no host", self.base_url)));
        }
        if self.timeout_ms == Some(0) {
            return Err(PushError::Config("timeout must be at least one millisecond".to_string()));
        }
        // RFC 7617: the user-id cannot contain a colon.
        if self.application_key.contains(':') {
            return Err(PushError::Config("application key must not contain ':'".to_string()));
        }
        if self.application_key.chars().any(char::is_control)
            || self.application_master_secret.chars().any(char::is_control)
        {
            return Err(PushError::Config("credentials must not contain control characters".to_string()));
        }
        Ok(url)
    }
}
