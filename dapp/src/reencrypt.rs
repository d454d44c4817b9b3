use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use veilcount_common::crypto::{Address, CiphertextHandle};

use crate::chain::Signer;

#[derive(Debug, Error)]
pub enum ReencryptError {
    // Distinguished condition: the account has no counter ciphertext yet.
    // Callers treat this as plaintext zero, not as a failure.
    #[error("handle is not initialized")]
    HandleNotInitialized,
    #[error("re-encryption request was not authorized by the signer")]
    Unauthorized,
    #[error("re-encryption failed: {0}")]
    Protocol(String),
}

// External threshold re-encryption protocol: a signer-authenticated
// party obtains the plaintext behind an encrypted handle.
#[async_trait]
pub trait ReencryptionClient: Send + Sync {
    async fn reencrypt_u8(
        &self,
        signer: &Arc<dyn Signer>,
        handle: &CiphertextHandle,
        contract: &Address,
    ) -> Result<u8, ReencryptError>;
}
