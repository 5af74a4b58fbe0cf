/*
SPDX-FileCopyrightText: Copyright 2026 Status Research & Development GmbH
SPDX-License-Identifier: MIT
*/

//! Request/response model shared by the engine and the C ABI.
//!
//! A request crossing the boundary is `(method, params-JSON, request id)`;
//! a completion is `(status, body)` where the body is the JSON `result`
//! text on success and a human-readable message otherwise. The integer
//! status codes are part of the C ABI and must stay stable.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ── Identifiers ───────────────────────────────────────────────────────────────

/// Identifier correlating a completion to its originating request.
///
/// Monotonically increasing per context, starting at 1 — id 0 is reserved
/// by the C ABI to signal "request was rejected before being enqueued".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(raw: u64) -> Self {
        RequestId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Status taxonomy ───────────────────────────────────────────────────────────

/// Completion status of one request (or one subscription delivery).
///
/// The four-way taxonomy and the integer codes mirror the original library's
/// return values; foreign callers branch on the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// The call completed and `body` holds the JSON result text.
    Success,
    /// The engine or the transport reported a failure; `body` holds the
    /// message.
    Error,
    /// The request was cancelled by [`Engine::stop`](crate::Engine::stop)
    /// before completing.
    Cancelled,
    /// The transport answered, but the response could not be decoded (or the
    /// request itself could not be encoded).
    DeserializationError,
}

impl CallStatus {
    /// Stable integer code used on the C ABI.
    pub fn code(self) -> i32 {
        match self {
            CallStatus::Success => 0,
            CallStatus::Error => 1,
            CallStatus::Cancelled => 2,
            CallStatus::DeserializationError => 3,
        }
    }
}

/// One delivered completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub status: CallStatus,
    /// JSON result text on success, message otherwise.
    pub body: String,
}

impl CallResult {
    pub fn success(body: impl Into<String>) -> Self {
        CallResult {
            status: CallStatus::Success,
            body: body.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        CallResult {
            status: CallStatus::Error,
            body: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        CallResult {
            status: CallStatus::Cancelled,
            body: String::from("request cancelled by engine shutdown"),
        }
    }

    pub fn deserialization(message: impl Into<String>) -> Self {
        CallResult {
            status: CallStatus::DeserializationError,
            body: message.into(),
        }
    }

    /// Returns `true` for [`CallStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == CallStatus::Success
    }
}

// ── Encode ────────────────────────────────────────────────────────────────────

/// Request-side failures, reported before anything is enqueued.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The method name is empty.
    #[error("method name must not be empty")]
    EmptyMethod,

    /// JSON-RPC params must be a positional array (or absent).
    #[error("params must be a JSON array or null, got {found}")]
    ParamsNotArray { found: &'static str },
}

/// Short type name for diagnostics (`"object"`, `"string"`, …).
fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check that `params` is a legal positional-parameter value.
///
/// Shared by [`encode_request`] and the subscribe path, which validates up
/// front so a bad shape fails the subscription instead of every tick.
pub fn validate_params(params: &Value) -> Result<(), RpcError> {
    match params {
        Value::Null | Value::Array(_) => Ok(()),
        other => Err(RpcError::ParamsNotArray {
            found: json_type_name(other),
        }),
    }
}

/// Build the JSON-RPC 2.0 request envelope for one call.
///
/// `params` must be an array (positional parameters) or `null`, which is
/// encoded as the empty array — the original drivers always passed a JSON
/// array string.
pub fn encode_request(id: RequestId, method: &str, params: &Value) -> Result<String, RpcError> {
    if method.trim().is_empty() {
        return Err(RpcError::EmptyMethod);
    }
    validate_params(params)?;
    let params = match params {
        Value::Null => Value::Array(Vec::new()),
        _ => params.clone(),
    };

    let envelope = serde_json::json!({
        "jsonrpc": "2.0",
        "id": id.raw(),
        "method": method,
        "params": params,
    });

    // Serialising a Value built from valid parts cannot fail.
    Ok(envelope.to_string())
}

// ── Decode ────────────────────────────────────────────────────────────────────

/// JSON-RPC response envelope, as sent by the backend.
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Decode a raw transport response into a [`CallResult`].
///
/// Total: every malformed input maps to
/// [`CallStatus::DeserializationError`] rather than an `Err`, because by the
/// time a response arrives the only channel left to the caller is the
/// completion itself.
pub fn decode_response(expected: RequestId, raw: &str) -> CallResult {
    let envelope: ResponseEnvelope = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(err) => {
            return CallResult::deserialization(format!(
                "invalid JSON-RPC response for request {expected}: {err}"
            ))
        }
    };

    if let Some(err) = envelope.error {
        return CallResult::error(format!("{} (code {})", err.message, err.code));
    }

    let Some(result) = envelope.result else {
        return CallResult::deserialization(format!(
            "response for request {expected} has neither result nor error"
        ));
    };

    // The id must round-trip; a mismatch means the transport delivered a
    // response for a different request.
    match envelope.id.as_ref().and_then(Value::as_u64) {
        Some(id) if id == expected.raw() => CallResult::success(result.to_string()),
        _ => CallResult::deserialization(format!(
            "response id {:?} does not match request id {expected}",
            envelope.id
        )),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
