/*
SPDX-FileCopyrightText: Copyright 2026 Status Research & Development GmbH
SPDX-License-Identifier: MIT
*/

//! C ABI over the engine (`nvp_*` symbols).
//!
//! This is the fixed collaborator contract the original drivers were
//! written against: an opaque context handle, callback-plus-`user_data`
//! completion delivery, explicit string frees, and a caller-driven poll
//! loop. The Rust-native API in [`crate::engine`] is the primary surface;
//! this layer adapts it for foreign callers.
//!
//! # Ownership rules
//! * Every non-null `result` string handed to a callback is owned by the
//!   caller and must be released **exactly once** with [`nvp_free_string`].
//! * `request_json` handed to the transport function is owned by the callee
//!   and must be released with [`nvp_free_string`]; `url` is borrowed for
//!   the duration of the call only.
//! * A transport token must be resolved exactly once with
//!   [`nvp_resolve_transport`].
//! * A context must not be used after [`nvp_free_context`].
//!
//! # Threading
//! All calls for one context must come from the thread that called
//! [`nvp_start`]. Callbacks fire from inside [`nvp_process_tasks`] — never
//! from the call that issued the request — except the startup callback,
//! which (in this revision) fires only on failure, before `nvp_start`
//! returns NULL.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::error;

use crate::config::ProxyConfig;
use crate::engine::{Engine, EngineError, PollOutcome, SubscriptionId};
use crate::rpc::CallResult;
use crate::transport::{Transport, TransportError, TransportFuture};

// ── Status codes ──────────────────────────────────────────────────────────────

pub const NVP_RET_SUCCESS: c_int = 0;
pub const NVP_RET_ERROR: c_int = 1;
pub const NVP_RET_CANCELLED: c_int = 2;
pub const NVP_RET_DESERIALIZATION_ERROR: c_int = 3;

// ── ABI types ─────────────────────────────────────────────────────────────────

/// Completion callback: `(status, result, user_data)`.
///
/// `result` ownership transfers to the callback; free it with
/// [`nvp_free_string`].
pub type NvpCallback = extern "C" fn(status: c_int, result: *mut c_char, user_data: *mut c_void);

/// Caller-supplied transport procedure: `(url, request_json, token,
/// user_data)`.
///
/// Must not block: deliver the response later via
/// [`nvp_resolve_transport`] with `token`. Ownership of `request_json`
/// transfers to the callee.
pub type NvpTransportFn = extern "C" fn(
    url: *const c_char,
    request_json: *mut c_char,
    token: *mut NvpTransportToken,
    user_data: *mut c_void,
);

/// Opaque handle to one running engine instance.
pub struct NvpContext {
    engine: Engine,
}

/// Opaque single-use resolver for one in-flight transport exchange.
pub struct NvpTransportToken {
    tx: Option<oneshot::Sender<Result<String, TransportError>>>,
}

/// Raw `user_data` pointer, made movable into local (non-`Send`) futures.
#[derive(Clone, Copy)]
struct UserData(*mut c_void);

// ── Callback transport adapter ────────────────────────────────────────────────

/// [`Transport`] implementation over the caller's C function pointer.
struct CallbackTransport {
    func: NvpTransportFn,
    user_data: UserData,
}

impl Transport for CallbackTransport {
    fn send(&self, url: &str, request_json: String) -> TransportFuture {
        let (tx, rx) = oneshot::channel();
        let token = Box::into_raw(Box::new(NvpTransportToken { tx: Some(tx) }));

        // serde output never contains NUL; stay total anyway.
        let url_c = CString::new(url).unwrap_or_default();
        let request_c = CString::new(request_json).unwrap_or_default().into_raw();
        (self.func)(url_c.as_ptr(), request_c, token, self.user_data.0);

        Box::pin(async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Unavailable(
                    "transport token dropped unresolved".into(),
                )),
            }
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn deliver(cb: NvpCallback, result: CallResult, user_data: UserData) {
    let body = CString::new(result.body).unwrap_or_default();
    cb(result.status.code(), body.into_raw(), user_data.0);
}

/// Fire `cb` (if present) with an error status and message. Used for
/// startup failures, the only case where a callback fires outside the poll
/// loop.
fn report_failure(cb: Option<NvpCallback>, message: &str, user_data: *mut c_void) {
    error!(reason = message, "nvp_start failed");
    if let Some(cb) = cb {
        let body = CString::new(message).unwrap_or_default();
        cb(NVP_RET_ERROR, body.into_raw(), user_data);
    }
}

/// Borrow a C string, tolerating invalid UTF-8.
///
/// # Safety
/// `ptr` must be non-null and point at a NUL-terminated string.
unsafe fn lossy_string(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Schedule an asynchronously delivered deserialization failure — the C ABI
/// has no typed return channel, so even request-side failures travel
/// through the callback on a later poll.
fn schedule_decode_failure(ctx: &NvpContext, cb: NvpCallback, message: String, ud: UserData) {
    if !ctx.engine.is_running() {
        return;
    }
    ctx.engine.spawn_internal(async move {
        deliver(cb, CallResult::deserialization(message), ud);
    });
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// ABI revision, for embedders coordinating against the evolving header.
#[no_mangle]
pub extern "C" fn nvp_api_version() -> u32 {
    2
}

/// Start a proxy context.
///
/// On failure: `on_start` fires with `NVP_RET_ERROR` and a message (free it
/// with [`nvp_free_string`]) and NULL is returned. On success no callback
/// fires — the non-null return is the success signal.
#[no_mangle]
pub extern "C" fn nvp_start(
    config_json: *const c_char,
    transport: Option<NvpTransportFn>,
    transport_data: *mut c_void,
    on_start: Option<NvpCallback>,
    user_data: *mut c_void,
) -> *mut NvpContext {
    let Some(transport) = transport else {
        report_failure(on_start, "transport function must not be NULL", user_data);
        return std::ptr::null_mut();
    };
    if config_json.is_null() {
        report_failure(on_start, "config JSON must not be NULL", user_data);
        return std::ptr::null_mut();
    }

    let raw = unsafe { lossy_string(config_json) };
    let config = match ProxyConfig::from_json_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            report_failure(on_start, &format!("{err:#}"), user_data);
            return std::ptr::null_mut();
        }
    };

    let transport = Rc::new(CallbackTransport {
        func: transport,
        user_data: UserData(transport_data),
    });
    match Engine::start(config, transport) {
        Ok(engine) => Box::into_raw(Box::new(NvpContext { engine })),
        Err(err) => {
            report_failure(on_start, &err.to_string(), user_data);
            std::ptr::null_mut()
        }
    }
}

/// Request asynchronous shutdown. [`nvp_process_tasks`] returns
/// `NVP_RET_CANCELLED` once everything in flight has been cancelled and
/// delivered; only then may the context be freed.
#[no_mangle]
pub extern "C" fn nvp_stop(ctx: *mut NvpContext) {
    if let Some(ctx) = unsafe { ctx.as_ref() } {
        ctx.engine.stop();
    }
}

/// Drive the engine one non-blocking tick.
///
/// Returns `NVP_RET_SUCCESS` while the context is live,
/// `NVP_RET_CANCELLED` exactly once when shutdown completes, and
/// `NVP_RET_ERROR` on every call after that (or for a NULL context).
#[no_mangle]
pub extern "C" fn nvp_process_tasks(ctx: *mut NvpContext) -> c_int {
    let Some(ctx) = (unsafe { ctx.as_ref() }) else {
        return NVP_RET_ERROR;
    };
    match ctx.engine.process_tasks() {
        PollOutcome::Busy | PollOutcome::Idle => NVP_RET_SUCCESS,
        PollOutcome::Stopped => NVP_RET_CANCELLED,
        PollOutcome::Finished => NVP_RET_ERROR,
    }
}

/// Free a context previously returned by [`nvp_start`].
#[no_mangle]
pub extern "C" fn nvp_free_context(ctx: *mut NvpContext) {
    if ctx.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(ctx) });
}

/// Free a string the library handed to a callback (or a request the
/// transport received). Must be called exactly once per pointer.
#[no_mangle]
pub extern "C" fn nvp_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr) });
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// Enqueue a one-shot RPC call.
///
/// Returns the request id (non-zero) on acceptance; `cb` then fires exactly
/// once, from a later [`nvp_process_tasks`], with the completion. Returns 0
/// when the call was rejected (NULL argument, or the context is stopping) —
/// except for malformed `params_json`, which is reported through `cb` as a
/// deserialization error on a later poll, like any other completion.
#[no_mangle]
pub extern "C" fn nvp_call(
    ctx: *mut NvpContext,
    method: *const c_char,
    params_json: *const c_char,
    cb: Option<NvpCallback>,
    user_data: *mut c_void,
) -> u64 {
    let Some(ctx) = (unsafe { ctx.as_ref() }) else {
        return 0;
    };
    let Some(cb) = cb else { return 0 };
    if method.is_null() {
        return 0;
    }

    let method = unsafe { lossy_string(method) };
    let params_raw = if params_json.is_null() {
        String::from("null")
    } else {
        unsafe { lossy_string(params_json) }
    };
    let ud = UserData(user_data);

    let params: Value = match serde_json::from_str(&params_raw) {
        Ok(params) => params,
        Err(err) => {
            schedule_decode_failure(ctx, cb, format!("invalid params JSON: {err}"), ud);
            return 0;
        }
    };

    match ctx.engine.call(&method, params) {
        Ok(handle) => {
            let id = handle.id().raw();
            ctx.engine.spawn_internal(async move {
                let result = handle.wait().await;
                deliver(cb, result, ud);
            });
            id
        }
        Err(EngineError::Rpc(err)) => {
            schedule_decode_failure(ctx, cb, err.to_string(), ud);
            0
        }
        // Stopping/stopped: no poll will ever deliver, so don't promise one.
        Err(_) => 0,
    }
}

// ── Subscriptions ─────────────────────────────────────────────────────────────

/// Start a repeating subscription issuing `method` every `interval_ms`
/// (0 = the config's `PollIntervalMs`). `cb` fires once per delivery, zero
/// or more times, and — on engine shutdown — one final time with
/// `NVP_RET_CANCELLED`. Returns the subscription id, or 0 on rejection.
#[no_mangle]
pub extern "C" fn nvp_subscribe(
    ctx: *mut NvpContext,
    method: *const c_char,
    params_json: *const c_char,
    interval_ms: u64,
    cb: Option<NvpCallback>,
    user_data: *mut c_void,
) -> u64 {
    let Some(ctx) = (unsafe { ctx.as_ref() }) else {
        return 0;
    };
    let Some(cb) = cb else { return 0 };
    if method.is_null() {
        return 0;
    }

    let method = unsafe { lossy_string(method) };
    let params_raw = if params_json.is_null() {
        String::from("null")
    } else {
        unsafe { lossy_string(params_json) }
    };
    let ud = UserData(user_data);

    let params: Value = match serde_json::from_str(&params_raw) {
        Ok(params) => params,
        Err(err) => {
            schedule_decode_failure(ctx, cb, format!("invalid params JSON: {err}"), ud);
            return 0;
        }
    };

    let interval = if interval_ms == 0 {
        ctx.engine.poll_interval()
    } else {
        Duration::from_millis(interval_ms)
    };

    match ctx.engine.subscribe(&method, params, interval) {
        Ok(mut sub) => {
            let id = sub.id().raw();
            ctx.engine.spawn_internal(async move {
                while let Some(result) = sub.next().await {
                    deliver(cb, result, ud);
                }
            });
            id
        }
        Err(EngineError::Rpc(err)) => {
            schedule_decode_failure(ctx, cb, err.to_string(), ud);
            0
        }
        Err(_) => 0,
    }
}

/// Cancel a subscription. Returns `false` for unknown ids.
#[no_mangle]
pub extern "C" fn nvp_unsubscribe(ctx: *mut NvpContext, sub_id: u64) -> bool {
    match unsafe { ctx.as_ref() } {
        Some(ctx) => ctx.engine.unsubscribe(SubscriptionId::new(sub_id)),
        None => false,
    }
}

// ── Transport resolution ──────────────────────────────────────────────────────

/// Deliver the response for one transport exchange.
///
/// `status` is `NVP_RET_SUCCESS` with `body_json` holding the raw JSON-RPC
/// response body, or any other value with `body_json` holding a message.
/// Consumes the token; calling twice with the same token is undefined.
#[no_mangle]
pub extern "C" fn nvp_resolve_transport(
    token: *mut NvpTransportToken,
    status: c_int,
    body_json: *const c_char,
) {
    if token.is_null() {
        return;
    }
    let mut token = unsafe { Box::from_raw(token) };
    let Some(tx) = token.tx.take() else { return };

    let body = if body_json.is_null() {
        String::new()
    } else {
        unsafe { lossy_string(body_json) }
    };
    let result = if status == NVP_RET_SUCCESS {
        Ok(body)
    } else {
        Err(TransportError::Failed(body))
    };
    // The engine side may be gone (request cancelled); dropping the value
    // is the correct outcome then.
    let _ = tx.send(result);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
