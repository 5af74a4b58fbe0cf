//! Proxy configuration loading and validation.
//!
//! The engine is started with a JSON configuration blob. The key names match
//! the ones the original C drivers passed to `startVerifProxy`:
//!
//! ```json
//! {
//!   "Eth2Network": "mainnet",
//!   "TrustedBlockRoot": "0x6e2b0d0725949a5ce977b61646cc4353a8c789f6c2b8fc8bfc98fcfdb99b3d00",
//!   "BackendUrl": "https://eth.llamarpc.com",
//!   "LogLevel": "info"
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

// ── Private JSON deserialization types ────────────────────────────────────────

/// Raw shape of the configuration blob as it crosses the boundary.
///
/// Kept private — callers work with the validated [`ProxyConfig`] instead.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigBlob {
    #[serde(rename = "Eth2Network")]
    eth2_network: String,
    #[serde(rename = "TrustedBlockRoot")]
    trusted_block_root: String,
    #[serde(rename = "BackendUrl")]
    backend_url: String,
    #[serde(rename = "LogLevel", default)]
    log_level: LogLevel,
    /// Subscription tick in milliseconds. Defaults to one mainnet slot.
    #[serde(rename = "PollIntervalMs", default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
}

/// Serde default for `PollIntervalMs`: 12 s = one mainnet slot.
fn default_poll_interval_ms() -> u64 {
    12_000
}

// ── Public data structures ────────────────────────────────────────────────────

/// Log verbosity requested by the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map onto the `tracing` level used when the embedder initialises a
    /// subscriber from this config.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Validated engine configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Consensus network name (`"mainnet"`, `"sepolia"`, …). The engine does
    /// not interpret this beyond requiring it to be non-empty; it is handed
    /// to the transport/verifier collaborators as-is.
    pub network: String,

    /// Trusted consensus block root: `0x` followed by 64 hex digits.
    pub trusted_block_root: String,

    /// Execution JSON-RPC endpoint the transport should talk to.
    pub backend_url: String,

    /// Requested log verbosity.
    pub log_level: LogLevel,

    /// Interval between subscription ticks.
    pub poll_interval: Duration,
}

impl ProxyConfig {
    /// Parse and validate a configuration blob.
    ///
    /// # Errors
    /// Returns an error when the JSON is malformed, a required key is
    /// missing, or a value fails validation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let blob: ConfigBlob =
            serde_json::from_str(raw).context("Failed to parse configuration JSON")?;

        if blob.eth2_network.trim().is_empty() {
            bail!("Eth2Network must not be empty");
        }
        validate_block_root(&blob.trusted_block_root)?;
        validate_backend_url(&blob.backend_url)?;

        let config = ProxyConfig {
            network: blob.eth2_network,
            trusted_block_root: blob.trusted_block_root,
            backend_url: blob.backend_url,
            log_level: blob.log_level,
            poll_interval: Duration::from_millis(blob.poll_interval_ms),
        };

        debug!(
            network = %config.network,
            backend_url = %config.backend_url,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "Configuration parsed"
        );

        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fails
    /// [`from_json_str`](Self::from_json_str) validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading proxy configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_json_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

/// A trusted block root is `0x` + 64 hex digits (a 32-byte hash).
fn validate_block_root(root: &str) -> Result<()> {
    let Some(hex) = root.strip_prefix("0x") else {
        bail!("TrustedBlockRoot must start with 0x: '{root}'");
    };
    if hex.len() != 64 {
        bail!(
            "TrustedBlockRoot must be 32 bytes (64 hex digits), got {} digits",
            hex.len()
        );
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("TrustedBlockRoot contains non-hex characters: '{root}'");
    }
    Ok(())
}

fn validate_backend_url(url: &str) -> Result<()> {
    const SCHEMES: [&str; 4] = ["http://", "https://", "ws://", "wss://"];

    if url.trim().is_empty() {
        bail!("BackendUrl must not be empty");
    }
    if !SCHEMES.iter().any(|s| url.starts_with(s)) {
        bail!("BackendUrl must use an http(s):// or ws(s):// scheme: '{url}'");
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GOOD_ROOT: &str =
        "0x6e2b0d0725949a5ce977b61646cc4353a8c789f6c2b8fc8bfc98fcfdb99b3d00";

    fn good_blob() -> String {
        format!(
            r#"{{
                "Eth2Network": "mainnet",
                "TrustedBlockRoot": "{GOOD_ROOT}",
                "BackendUrl": "https://eth.llamarpc.com",
                "LogLevel": "info"
            }}"#
        )
    }

    // ── from_json_str ─────────────────────────────────────────────────────────

    #[test]
    fn parses_the_original_driver_blob() {
        let cfg = ProxyConfig::from_json_str(&good_blob()).unwrap();
        assert_eq!(cfg.network, "mainnet");
        assert_eq!(cfg.trusted_block_root, GOOD_ROOT);
        assert_eq!(cfg.backend_url, "https://eth.llamarpc.com");
        assert_eq!(cfg.log_level, LogLevel::Info);
    }

    #[test]
    fn log_level_defaults_to_info_when_absent() {
        let raw = format!(
            r#"{{"Eth2Network":"mainnet","TrustedBlockRoot":"{GOOD_ROOT}","BackendUrl":"https://x.example"}}"#
        );
        let cfg = ProxyConfig::from_json_str(&raw).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Info);
    }

    #[test]
    fn poll_interval_defaults_to_one_slot() {
        let cfg = ProxyConfig::from_json_str(&good_blob()).unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_millis(12_000));
    }

    #[test]
    fn poll_interval_can_be_overridden() {
        let raw = format!(
            r#"{{"Eth2Network":"mainnet","TrustedBlockRoot":"{GOOD_ROOT}","BackendUrl":"https://x.example","PollIntervalMs":250}}"#
        );
        let cfg = ProxyConfig::from_json_str(&raw).unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(ProxyConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let raw = r#"{"Eth2Network":"mainnet","BackendUrl":"https://x.example"}"#;
        assert!(ProxyConfig::from_json_str(raw).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let raw = format!(
            r#"{{"Eth2Network":"mainnet","TrustedBlockRoot":"{GOOD_ROOT}","BackendUrl":"https://x.example","Bogus":1}}"#
        );
        assert!(ProxyConfig::from_json_str(&raw).is_err());
    }

    // ── validation ────────────────────────────────────────────────────────────

    #[test]
    fn block_root_must_have_0x_prefix() {
        let raw = good_blob().replace("0x6e2b", "6e2b0d");
        assert!(ProxyConfig::from_json_str(&raw).is_err());
    }

    #[test]
    fn block_root_must_be_32_bytes() {
        let raw = good_blob().replace(GOOD_ROOT, "0xdeadbeef");
        assert!(ProxyConfig::from_json_str(&raw).is_err());
    }

    #[test]
    fn block_root_must_be_hex() {
        let bad = format!("0x{}", "zz".repeat(32));
        let raw = good_blob().replace(GOOD_ROOT, &bad);
        assert!(ProxyConfig::from_json_str(&raw).is_err());
    }

    #[test]
    fn backend_url_requires_known_scheme() {
        let raw = good_blob().replace("https://eth.llamarpc.com", "ftp://eth.example");
        assert!(ProxyConfig::from_json_str(&raw).is_err());
    }

    #[test]
    fn websocket_backend_url_is_accepted() {
        let raw = good_blob().replace("https://eth.llamarpc.com", "wss://eth.example/ws");
        assert!(ProxyConfig::from_json_str(&raw).is_ok());
    }

    #[test]
    fn empty_network_is_rejected() {
        let raw = good_blob().replace("mainnet", "  ");
        assert!(ProxyConfig::from_json_str(&raw).is_err());
    }

    // ── from_file ─────────────────────────────────────────────────────────────

    #[test]
    fn loads_config_from_file() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(good_blob().as_bytes()).unwrap();

        let cfg = ProxyConfig::from_file(f.path()).unwrap();
        assert_eq!(cfg.network, "mainnet");
    }

    #[test]
    fn missing_file_returns_error() {
        assert!(ProxyConfig::from_file(Path::new("/nonexistent/proxy.json")).is_err());
    }

    // ── LogLevel ──────────────────────────────────────────────────────────────

    #[test]
    fn log_levels_map_to_tracing_levels() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Info.to_tracing_level(), tracing::Level::INFO);
    }
}
