/*
SPDX-FileCopyrightText: Copyright 2026 Status Research & Development GmbH
SPDX-License-Identifier: MIT
*/

//! Driver shell: the issue-requests-and-poll loop the original C example
//! programs ran against the precompiled library, rebuilt on the Rust-native
//! API. Starts an engine over the in-process canned transport, fires a few
//! one-shot eth calls, holds a block-number subscription, then stops the
//! engine and polls it down.

use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tracing::{error, info};

use verifproxy::{CallHandle, Engine, PollOutcome, ProxyConfig, StaticTransport};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Verified-proxy driver shell (Rust implementation).
///
/// Example:
///   verifproxy-shell --tick-ms 25 --latency-ms 100 --deliveries 3
#[derive(Debug, Parser)]
#[command(
    name = "verifproxy-shell",
    about = "Verified-proxy driver shell – issues eth calls and runs the poll loop",
    long_about = None,
)]
struct Cli {
    /// Path to the JSON configuration blob. When omitted, a built-in
    /// mainnet configuration is used.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Milliseconds to sleep between poll ticks (the throttle of the
    /// original busy loop).
    #[arg(short = 't', long = "tick-ms", default_value_t = 25)]
    tick_ms: u64,

    /// Simulated backend latency in milliseconds.
    #[arg(short = 'l', long = "latency-ms", default_value_t = 100)]
    latency_ms: u64,

    /// Subscription deliveries to wait for before stopping the engine.
    #[arg(short = 'n', long = "deliveries", default_value_t = 3)]
    deliveries: usize,
}

/// The configuration the original example.c shipped, with a driver-friendly
/// subscription tick.
const DEFAULT_CONFIG: &str = r#"{
    "Eth2Network": "mainnet",
    "TrustedBlockRoot": "0x6e2b0d0725949a5ce977b61646cc4353a8c789f6c2b8fc8bfc98fcfdb99b3d00",
    "BackendUrl": "https://eth.llamarpc.com",
    "LogLevel": "info",
    "PollIntervalMs": 500
}"#;

fn load_config(cli: &Cli) -> anyhow::Result<ProxyConfig> {
    match &cli.config {
        Some(path) => ProxyConfig::from_file(path),
        None => ProxyConfig::from_json_str(DEFAULT_CONFIG),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("verifproxy-shell starting up...");

    let cli = Cli::parse();
    info!(
        config      = ?cli.config,
        tick_ms     = cli.tick_ms,
        latency_ms  = cli.latency_ms,
        deliveries  = cli.deliveries,
        "Configuration"
    );

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    // ── Transport & engine ────────────────────────────────────────────────────
    let transport = StaticTransport::with_defaults()
        .with_latency(Duration::from_millis(cli.latency_ms));
    // One wei short of 0.01 ETH, so the balance is visibly canned.
    transport.insert("eth_getBalance", json!("0x2386f26fc0ffff"));

    let engine = match Engine::start(config, Rc::new(transport)) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to start engine: {e}");
            process::exit(1);
        }
    };

    // ── Issue requests ────────────────────────────────────────────────────────
    let mut pending: Vec<(&'static str, CallHandle)> = Vec::new();
    let calls: [(&'static str, Result<CallHandle, _>); 3] = [
        ("eth_blockNumber", engine.eth_block_number()),
        ("eth_chainId", engine.eth_chain_id()),
        (
            "eth_getBalance",
            engine.eth_get_balance("0x00000000219ab540356cbb839cbe05303d7705fa", "latest"),
        ),
    ];
    for (label, handle) in calls {
        match handle {
            Ok(handle) => {
                info!(call = label, id = handle.id().raw(), "Request enqueued");
                pending.push((label, handle));
            }
            Err(e) => error!(call = label, "Failed to enqueue: {e}"),
        }
    }

    let mut subscription = match engine.subscribe("eth_blockNumber", json!([]), engine.poll_interval())
    {
        Ok(sub) => {
            info!(sub = sub.id().raw(), "Block-number subscription started");
            sub
        }
        Err(e) => {
            error!("Failed to subscribe: {e}");
            process::exit(1);
        }
    };

    // ── Poll loop ─────────────────────────────────────────────────────────────
    let tick = Duration::from_millis(cli.tick_ms);
    let mut deliveries = 0usize;

    while !(pending.is_empty() && deliveries >= cli.deliveries) {
        engine.process_tasks();

        pending.retain_mut(|(label, handle)| match handle.try_result() {
            Some(result) => {
                info!(
                    call = *label,
                    status = ?result.status,
                    body = %result.body,
                    "Call completed"
                );
                false
            }
            None => true,
        });

        while let Some(result) = subscription.try_next() {
            deliveries += 1;
            info!(
                delivery = deliveries,
                status = ?result.status,
                body = %result.body,
                "Subscription delivery"
            );
        }

        std::thread::sleep(tick);
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    info!("Stopping engine...");
    engine.stop();
    loop {
        match engine.process_tasks() {
            PollOutcome::Stopped => break,
            _ => std::thread::sleep(tick),
        }
    }
    // The subscription's final delivery is its cancellation notice.
    while let Some(result) = subscription.try_next() {
        info!(status = ?result.status, "Subscription wound down");
    }
    info!("Shutdown complete");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_config_is_valid() {
        let config = ProxyConfig::from_json_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.network, "mainnet");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }
}
