/*
SPDX-FileCopyrightText: Copyright 2026 Status Research & Development GmbH
SPDX-License-Identifier: MIT
*/

//! Structured error types for the engine.
//!
//! [`EngineError`] covers everything that can fail *before* a request is
//! enqueued. Once a request is in flight, failures travel through the
//! completion itself as a [`CallStatus`](crate::rpc::CallStatus) — by then
//! the issuing call has already returned.

use thiserror::Error;

/// Top-level error returned by [`Engine`](super::Engine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The embedded tokio runtime could not be built.
    #[error("failed to build the engine runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// `call`/`subscribe` after [`stop`](super::Engine::stop) was requested.
    /// New work is rejected during and after shutdown.
    #[error("engine is not running — stop has been requested")]
    NotRunning,

    /// The request could not be encoded (empty method, non-array params).
    #[error(transparent)]
    Rpc(#[from] crate::rpc::RpcError),
}
