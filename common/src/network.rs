use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

// Deployment variant the component runs against.
// Testnet is the public demo network, Devnet a local development node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Testnet,
    Devnet,
}

impl Network {
    // Directory name used by the deployment tooling for this variant
    pub fn manifest_dir(&self) -> &'static str {
        match self {
            Network::Testnet => "sepolia",
            Network::Devnet => "localhost",
        }
    }

    pub fn is_devnet(&self) -> bool {
        matches!(self, Network::Devnet)
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Devnet => write!(f, "devnet"),
        }
    }
}

impl FromStr for Network {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            _ => Err("invalid network, expected 'testnet' or 'devnet'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_dir_mapping() {
        assert_eq!(Network::Testnet.manifest_dir(), "sepolia");
        assert_eq!(Network::Devnet.manifest_dir(), "localhost");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("Devnet".parse::<Network>().unwrap(), Network::Devnet);
        assert!("mainnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for network in [Network::Testnet, Network::Devnet] {
            assert_eq!(network.to_string().parse::<Network>().unwrap(), network);
        }
    }
}
