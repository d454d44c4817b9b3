use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use veilcount_common::crypto::{Address, CiphertextHandle};

// Read-only chain view: query the current encrypted counter handle
// for an account. On the wire this is a decimal-string-encoded u256.
#[async_trait]
pub trait CounterView: Send + Sync {
    async fn get_counter(&self, contract: &Address, account: &Address)
        -> Result<CiphertextHandle>;
}

// Receipt returned once a transaction is included on chain
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

// Handle to a submitted transaction, resolved by waiting for confirmation
#[async_trait]
pub trait PendingTransaction: Send + Sync {
    async fn wait(self: Box<Self>) -> Result<TxReceipt>;
}

// Signer-backed write path to the counter contract.
// Handle and proof travel as 0x-prefixed hex strings.
#[async_trait]
pub trait Signer: Send + Sync {
    fn account(&self) -> Address;

    async fn increment_by(
        &self,
        contract: &Address,
        handle_hex: &str,
        proof_hex: &str,
    ) -> Result<Box<dyn PendingTransaction>>;
}

// Wallet abstraction: hands out a signer when one is connected
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn get_signer(&self) -> Result<Arc<dyn Signer>>;
}
