/*
SPDX-FileCopyrightText: Copyright 2026 Status Research & Development GmbH
SPDX-License-Identifier: MIT
*/

//! Verified-proxy request/callback engine (Rust port)
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/     – JSON configuration blob parsing & validation
//! ├── rpc/        – request/response model, JSON-RPC envelope codec
//! ├── transport/  – Transport seam + in-process canned transport
//! ├── engine/     – context, poll loop, calls, subscriptions, shutdown
//! └── ffi/        – C ABI (`nvp_*` symbols) over the engine
//! ```
//!
//! The engine is single-threaded and cooperative: the caller owns the loop
//! and drives all progress through [`Engine::process_tasks`]. Completions
//! are never delivered from the call that issued a request — only from a
//! later poll.

pub mod config;
pub mod engine;
pub mod ffi;
pub mod rpc;
pub mod transport;

pub use config::{LogLevel, ProxyConfig};
pub use engine::{CallHandle, Engine, EngineError, PollOutcome, Subscription, SubscriptionId};
pub use rpc::{CallResult, CallStatus, RequestId};
pub use transport::{StaticTransport, Transport, TransportError, TransportFuture};
