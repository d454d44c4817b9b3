use anyhow::Error;
use thiserror::Error;

use crate::{fhe::FheError, manifest::ManifestError, reencrypt::ReencryptError};

#[derive(Debug, Error)]
pub enum DappError {
    #[error("contract address is not resolved yet")]
    ContractNotResolved,
    #[error("no signer available from the wallet provider")]
    SignerUnavailable,
    #[error("pending encryption has no ciphertext handle")]
    MissingHandle,
    #[error(
        "transaction confirmation timed out after {} seconds",
        crate::config::TX_CONFIRMATION_TIMEOUT_SECS
    )]
    ConfirmationTimeout,
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Fhe(#[from] FheError),
    #[error(transparent)]
    Reencrypt(#[from] ReencryptError),
    #[error(transparent)]
    Any(#[from] Error),
}
