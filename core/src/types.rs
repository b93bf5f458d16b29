//! Payload type and endpoint constants for the push API.
//!
//! # Design
//! Payloads are free-form JSON objects. The service owns their schema, so
//! the client passes them through untouched instead of modelling them as
//! structs.

use serde_json::{Map, Value};

/// A JSON object sent as a request body or returned from a read.
pub type Payload = Map<String, Value>;

/// Production API host.
pub const BASE_URL: &str = "https://go.urbanairship.com";

pub const PUSH_PATH: &str = "/api/push/";
pub const BATCH_PUSH_PATH: &str = "/api/push/batch/";
pub const BROADCAST_PATH: &str = "/api/push/broadcast/";
pub const FEEDBACK_PATH: &str = "/api/device_tokens/feedback/";
