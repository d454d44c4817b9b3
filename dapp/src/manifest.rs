use log::{debug, info};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;
use veilcount_common::{crypto::Address, network::Network};

use crate::config::CONTRACT_MANIFEST_FILE;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("deployment manifest not found at {0}: {1}")]
    NotFound(String, std::io::Error),
    #[error("invalid deployment manifest: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("invalid contract address in manifest: {0}")]
    InvalidAddress(String),
}

// Manifest file emitted by the deployment tooling.
// Only the address field matters here, the rest (ABI, bytecode hash...)
// is ignored.
#[derive(Debug, Deserialize)]
pub struct DeploymentManifest {
    pub address: String,
    #[serde(default, rename = "contractName")]
    pub contract_name: Option<String>,
}

// Resolve the deployed counter contract address for the given network.
// The caller decides what a failure means; for the component it is logged
// and the address stays at the zero sentinel.
pub fn load_contract_address(dir: &Path, network: Network) -> Result<Address, ManifestError> {
    let path = dir.join(network.manifest_dir()).join(CONTRACT_MANIFEST_FILE);
    debug!("Loading deployment manifest from {}", path.display());

    let content = fs::read_to_string(&path)
        .map_err(|e| ManifestError::NotFound(path.display().to_string(), e))?;
    let manifest: DeploymentManifest = serde_json::from_str(&content)?;

    let address: Address = manifest
        .address
        .parse()
        .map_err(|_| ManifestError::InvalidAddress(manifest.address.clone()))?;

    info!(
        "Using {} for the counter contract on {}",
        address, network
    );
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_manifest(dir: &Path, network: Network, content: &str) {
        let network_dir = dir.join(network.manifest_dir());
        fs::create_dir_all(&network_dir).unwrap();
        fs::write(network_dir.join(CONTRACT_MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn test_load_valid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            Network::Devnet,
            r#"{"address":"0x00000000000000000000000000000000deadbeef","contractName":"EncryptedCounter"}"#,
        );

        let address = load_contract_address(dir.path(), Network::Devnet).unwrap();
        assert_eq!(
            address.to_hex(),
            "0x00000000000000000000000000000000deadbeef"
        );
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_contract_address(dir.path(), Network::Testnet);
        assert!(matches!(result, Err(ManifestError::NotFound(_, _))));
    }

    #[test]
    fn test_network_variants_use_separate_manifests() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            Network::Testnet,
            r#"{"address":"0x1111111111111111111111111111111111111111"}"#,
        );
        write_manifest(
            dir.path(),
            Network::Devnet,
            r#"{"address":"0x2222222222222222222222222222222222222222"}"#,
        );

        let testnet = load_contract_address(dir.path(), Network::Testnet).unwrap();
        let devnet = load_contract_address(dir.path(), Network::Devnet).unwrap();
        assert_ne!(testnet, devnet);
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), Network::Devnet, r#"{"address":"0x1234"}"#);
        let result = load_contract_address(dir.path(), Network::Devnet);
        assert!(matches!(result, Err(ManifestError::InvalidAddress(_))));
    }

    #[test]
    fn test_malformed_json_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), Network::Devnet, "not json");
        let result = load_contract_address(dir.path(), Network::Devnet);
        assert!(matches!(result, Err(ManifestError::Invalid(_))));
    }
}
