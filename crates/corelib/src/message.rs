//! Request/response envelopes exchanged with remote nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Advisory timeout used when the caller supplies none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Numeric error codes carried in error responses.
pub struct ErrorCode;

impl ErrorCode {
    pub const GENERAL: i64 = 1000;
    pub const INVALID_ADDRESS: i64 = 1001;
    pub const CONNECTION_FAILED: i64 = 1002;
    pub const NODE_NOT_RUNNING: i64 = 1003;
    pub const METHOD_NOT_FOUND: i64 = 1004;
    pub const TIMEOUT: i64 = 1005;
    pub const INVALID_RESPONSE: i64 = 1006;
    pub const REGISTRATION_FAILED: i64 = 1007;
}

/// Method invocation body delivered to the target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// What a connection is asked to deliver: the logical recipient plus the
/// invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SendParams {
    pub address: String,
    pub payload: Payload,
}

/// Error body of a failed response.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[error("OError [{code}]: {message}")]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseError {
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(ErrorCode::METHOD_NOT_FOUND, format!("method not found: {}", method), None)
    }

    pub fn timeout(operation: &str) -> Self {
        Self::new(ErrorCode::TIMEOUT, format!("operation timed out: {}", operation), None)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    pub fn ok(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: impl Into<String>, error: ResponseError) -> Self {
        Self {
            id: id.into(),
            result: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Result body, or the remote error. A response with neither yields
    /// `Value::Null`.
    pub fn into_result(self) -> std::result::Result<Value, ResponseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Per-call options of a dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Ask the registry side not to index or record this call.
    pub no_index: bool,
    /// Advisory deadline forwarded to the connection; never enforced here.
    pub timeout: Duration,
}

impl DispatchOptions {
    pub fn no_index() -> Self {
        Self {
            no_index: true,
            ..Self::default()
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            no_index: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
