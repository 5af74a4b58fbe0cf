/*
SPDX-FileCopyrightText: Copyright 2026 Status Research & Development GmbH
SPDX-License-Identifier: MIT
*/

//! Convenience wrappers for the eth namespace methods the original example
//! drivers called. Each is a thin params-shaping layer over
//! [`Engine::call`].

use serde_json::{json, Value};

use super::{CallHandle, Engine, EngineError};

impl Engine {
    /// `eth_blockNumber`
    pub fn eth_block_number(&self) -> Result<CallHandle, EngineError> {
        self.call("eth_blockNumber", Value::Null)
    }

    /// `eth_chainId`
    pub fn eth_chain_id(&self) -> Result<CallHandle, EngineError> {
        self.call("eth_chainId", Value::Null)
    }

    /// `eth_getBalance` for `address` at `block` (`"latest"`, a number, …).
    pub fn eth_get_balance(&self, address: &str, block: &str) -> Result<CallHandle, EngineError> {
        self.call("eth_getBalance", json!([address, block]))
    }

    /// `eth_call` with a transaction object at `block`.
    pub fn eth_call(&self, tx: Value, block: &str) -> Result<CallHandle, EngineError> {
        self.call("eth_call", json!([tx, block]))
    }

    /// `eth_getLogs` with a filter object.
    pub fn eth_get_logs(&self, filter: Value) -> Result<CallHandle, EngineError> {
        self.call("eth_getLogs", json!([filter]))
    }

    /// `eth_getTransactionByHash`
    pub fn eth_get_transaction_by_hash(&self, hash: &str) -> Result<CallHandle, EngineError> {
        self.call("eth_getTransactionByHash", json!([hash]))
    }
}
