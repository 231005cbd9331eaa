use crate::domain::{BASE_FEE, TESTNET_PASSPHRASE};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "lpool.toml";

/// Network endpoints and client tunables. Every key is optional in the
/// config file; missing keys keep their testnet defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rpc_url: String,
    pub faucet_url: String,
    pub network_passphrase: String,
    pub explorer_url: String,
    pub base_fee: u32,
    pub tx_timeout_secs: u64,
    pub toast_ttl_secs: u64,
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: "https://soroban-testnet.stellar.org".into(),
            faucet_url: "https://friendbot.stellar.org".into(),
            network_passphrase: TESTNET_PASSPHRASE.into(),
            explorer_url: "https://stellar.expert/explorer/testnet".into(),
            base_fee: BASE_FEE,
            tx_timeout_secs: 30,
            toast_ttl_secs: 5,
            log_file: "lpool.log".into(),
        }
    }
}

impl Settings {
    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

/// Reads settings from `path`. A missing file yields the defaults; an
/// unreadable or malformed one is an error.
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .map_err(|e| format!("Invalid config {} - {}", path.display(), e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(format!("Cannot read config {}: {}", path.display(), e)),
    }
}
