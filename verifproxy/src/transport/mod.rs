/*
SPDX-FileCopyrightText: Copyright 2026 Status Research & Development GmbH
SPDX-License-Identifier: MIT
*/

//! The transport seam.
//!
//! The engine never talks to a network itself — it hands each encoded
//! JSON-RPC request to a [`Transport`] and awaits the raw response body.
//! This mirrors the original library's WASM build, where the host supplies
//! the transport procedure and resolves it asynchronously.
//!
//! Two implementations ship with the crate:
//! * [`StaticTransport`] — in-process canned responder for drivers and tests.
//! * `ffi::CallbackTransport` — adapter over a C function pointer, see the
//!   `ffi` module.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Transport-side failures. Anything richer (HTTP status, connection state)
/// is flattened into the message — the engine only forwards it.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport cannot take requests at all (endpoint gone, host
    /// dropped the resolver token, …).
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// The request was sent but failed.
    #[error("transport request failed: {0}")]
    Failed(String),
}

/// Boxed response future. Deliberately not `Send`: the engine is
/// single-threaded by contract and transports may hold thread-bound state
/// (the FFI adapter holds raw pointers).
pub type TransportFuture = Pin<Box<dyn Future<Output = Result<String, TransportError>>>>;

/// One request/response exchange with the backend.
///
/// `request_json` is the full JSON-RPC 2.0 envelope; the returned string is
/// the raw response body, decoded by the engine.
pub trait Transport {
    fn send(&self, url: &str, request_json: String) -> TransportFuture;
}

// ── StaticTransport ───────────────────────────────────────────────────────────

/// In-process transport answering from a canned method → result table.
///
/// Unknown methods get a JSON-RPC `-32601` error envelope, so drivers and
/// tests exercise the same decode paths a live backend would produce.
#[derive(Debug, Default)]
pub struct StaticTransport {
    responses: RefCell<HashMap<String, Value>>,
    /// Optional simulated latency before each response resolves.
    latency: Option<Duration>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A responder pre-loaded with the methods the original example drivers
    /// call.
    pub fn with_defaults() -> Self {
        let t = Self::new();
        t.insert("eth_blockNumber", Value::String("0x153d25f".into()));
        t.insert("eth_chainId", Value::String("0x1".into()));
        t.insert("eth_getBalance", Value::String("0xde0b6b3a7640000".into()));
        t.insert("eth_call", Value::String("0x".into()));
        t.insert("eth_getLogs", Value::Array(Vec::new()));
        t
    }

    /// Resolve responses only after `latency` of engine-driven time has
    /// passed.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Set (or replace) the canned result for `method`.
    pub fn insert(&self, method: &str, result: Value) {
        self.responses.borrow_mut().insert(method.to_string(), result);
    }

    /// Build the response body for one request envelope.
    fn answer(&self, request_json: &str) -> String {
        let request: Value = match serde_json::from_str(request_json) {
            Ok(v) => v,
            // Echo a parse error the way a strict backend would.
            Err(_) => {
                return r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"parse error"}}"#
                    .to_string()
            }
        };
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();

        match self.responses.borrow().get(method) {
            Some(result) => serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result,
            })
            .to_string(),
            None => serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("the method {method} does not exist/is not available") },
            })
            .to_string(),
        }
    }
}

impl Transport for StaticTransport {
    fn send(&self, url: &str, request_json: String) -> TransportFuture {
        trace!(url, "static transport request");
        let body = self.answer(&request_json);
        let latency = self.latency;
        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            Ok(body)
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{self, CallStatus, RequestId};
    use serde_json::json;

    fn send_now(t: &StaticTransport, body: &str) -> Result<String, TransportError> {
        // StaticTransport without latency resolves on first poll.
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(t.send("https://backend.example", body.to_string()))
    }

    #[test]
    fn answers_known_method_with_matching_id() {
        let t = StaticTransport::with_defaults();
        let req = rpc::encode_request(RequestId::new(42), "eth_blockNumber", &json!([])).unwrap();

        let raw = send_now(&t, &req).unwrap();
        let res = rpc::decode_response(RequestId::new(42), &raw);
        assert_eq!(res.status, CallStatus::Success);
        assert_eq!(res.body, "\"0x153d25f\"");
    }

    #[test]
    fn unknown_method_yields_minus_32601() {
        let t = StaticTransport::new();
        let req = rpc::encode_request(RequestId::new(1), "eth_frobnicate", &json!([])).unwrap();

        let raw = send_now(&t, &req).unwrap();
        let res = rpc::decode_response(RequestId::new(1), &raw);
        assert_eq!(res.status, CallStatus::Error);
        assert!(res.body.contains("-32601"));
    }

    #[test]
    fn inserted_response_overrides_default() {
        let t = StaticTransport::with_defaults();
        t.insert("eth_blockNumber", json!("0xabc"));

        let req = rpc::encode_request(RequestId::new(2), "eth_blockNumber", &json!([])).unwrap();
        let raw = send_now(&t, &req).unwrap();
        let res = rpc::decode_response(RequestId::new(2), &raw);
        assert_eq!(res.body, "\"0xabc\"");
    }

    #[test]
    fn malformed_request_gets_parse_error_envelope() {
        let t = StaticTransport::with_defaults();
        let raw = send_now(&t, "{broken").unwrap();
        assert!(raw.contains("-32700"));
    }
}
