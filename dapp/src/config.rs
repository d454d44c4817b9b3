use clap::Parser;
use serde::{Deserialize, Serialize};
use veilcount_common::network::Network;

// Directory holding per-network deployment manifests
pub const DEFAULT_MANIFEST_DIR: &str = "deployments/";
// Manifest file emitted by the deployment tooling for the counter contract
pub const CONTRACT_MANIFEST_FILE: &str = "EncryptedCounter.json";

// Client-side timeout raced against on-chain confirmation.
// Advisory only: the transaction itself is not cancelled.
pub const TX_CONFIRMATION_TIMEOUT_SECS: u64 = 60;

// When set (to anything non-empty), the devnet deployment is selected
// instead of the testnet one
pub const MOCKED_ENV_VAR: &str = "VEILCOUNT_MOCKED";

fn default_manifest_dir() -> String {
    DEFAULT_MANIFEST_DIR.to_owned()
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network deployment to run against
    #[clap(long, default_value_t = Network::Testnet)]
    #[serde(default)]
    pub network: Network,
    /// Directory holding the per-network deployment manifests
    #[clap(long, default_value_t = String::from(DEFAULT_MANIFEST_DIR))]
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Set log level
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Write logs to this file in addition to the console
    #[clap(long)]
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Parser)]
#[clap(version = veilcount_common::config::VERSION, about = "Confidential counter dApp demo client")]
pub struct Config {
    #[clap(flatten)]
    pub network: NetworkConfig,
    #[clap(flatten)]
    pub log: LogConfig,
    /// Account to act as (defaults to a demo account)
    #[clap(long)]
    pub account: Option<String>,
    /// Override the contract address instead of reading a deployment manifest
    #[clap(long)]
    pub contract: Option<String>,
    /// Amount to increment the counter by during the demo run
    #[clap(long, default_value_t = 5)]
    pub value: u8,
}
