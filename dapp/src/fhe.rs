use async_trait::async_trait;
use log::debug;
use std::{sync::Arc, time::Instant};
use thiserror::Error;
use veilcount_common::{api::EncryptedInput, config::COUNTER_BIT_WIDTH, crypto::Address};

#[derive(Debug, Error)]
pub enum FheError {
    #[error("encryption client is not initialized")]
    NotInitialized,
    #[error("failed to create encrypted input for contract {0}")]
    InputConstruction(Address),
    #[error("encryption failed: {0}")]
    Encryption(String),
}

// Builder for an encrypted input scoped to (contract, account).
// Values are appended with their declared bit width, then sealed into
// a (handles, proof) pair by encrypt().
#[async_trait]
pub trait EncryptedInputBuilder: Send {
    fn add8(&mut self, value: u8);

    async fn encrypt(self: Box<Self>) -> Result<EncryptedInput, FheError>;
}

// External homomorphic encryption client
pub trait FheClient: Send + Sync {
    fn create_encrypted_input(
        &self,
        contract: &Address,
        account: &Address,
    ) -> Result<Box<dyn EncryptedInputBuilder>, FheError>;
}

// Encrypt a single bounded integer for the given contract and account.
// The client slot is None until the encryption library has been
// initialized; that precondition failure is a descriptive error, not a
// panic. Timing is logged for observability only.
pub async fn encrypt_u8(
    client: Option<&Arc<dyn FheClient>>,
    contract: &Address,
    account: &Address,
    value: u8,
) -> Result<EncryptedInput, FheError> {
    let client = client.ok_or(FheError::NotInitialized)?;

    debug!(
        "Encrypting {}-bit value {} for contract {} and account {}",
        COUNTER_BIT_WIDTH, value, contract, account
    );
    let start = Instant::now();

    let mut builder = client.create_encrypted_input(contract, account)?;
    builder.add8(value);
    let input = builder.encrypt().await?;

    debug!("Encryption successful, took {:?}", start.elapsed());
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uninitialized_client_is_an_error() {
        let result = encrypt_u8(None, &Address::zero(), &Address::zero(), 1).await;
        assert!(matches!(result, Err(FheError::NotInitialized)));
    }
}
