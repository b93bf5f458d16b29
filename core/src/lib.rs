//! Synchronous client for the Urban Airship push notification API.
//!
//! # Overview
//! `PushClient` registers, fetches and deletes device tokens, sends single,
//! batch and broadcast pushes, and reads inactive-token feedback. Requests
//! are authenticated with HTTP Basic auth using the application key and
//! master secret, bodies are JSON, and any 2xx status counts as success.
//!
//! # Design
//! - `PushClient` holds immutable configuration and a `Transport`; there is
//!   no state between calls.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   a parse step (consumes an `HttpResponse`), so the I/O boundary is
//!   explicit and testable without a network.
//! - `Connection` is the blocking `ureq` transport used in production.
//! - Retries, backoff and rate limiting are left to the caller.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod logger;
pub mod token;
pub mod types;

pub use client::PushClient;
pub use config::ClientConfig;
pub use connection::Connection;
pub use error::{PushError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use logger::{Logger, TracingLogger};
pub use token::{classify, device_token_path, normalize, TokenKind};
pub use types::Payload;
