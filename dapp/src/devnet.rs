//! In-memory backends standing in for the local development node and
//! the encryption service, the equivalent of the mocked/localhost mode
//! of the deployment tooling. Used by the demo binary on devnet and by
//! integration tests.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::Mutex;
use veilcount_common::{
    api::EncryptedInput,
    crypto::{Address, CiphertextHandle, HANDLE_SIZE},
};

use crate::{
    chain::{CounterView, PendingTransaction, Signer, TxReceipt, WalletProvider},
    fhe::{EncryptedInputBuilder, FheClient},
    reencrypt::{ReencryptError, ReencryptionClient},
};

const PROOF_SIZE: usize = 64;

#[derive(Default)]
struct LedgerInner {
    // account -> (current handle, plaintext counter)
    counters: HashMap<Address, (CiphertextHandle, u8)>,
    // what each handle decrypts to
    ciphertexts: HashMap<CiphertextHandle, u8>,
    // input handle hex -> proof hex it was sealed with
    proofs: HashMap<String, String>,
}

// Shared plaintext ledger behind every devnet backend.
// Handles are keccak-derived and unique per encryption.
pub struct DevLedger {
    inner: Mutex<LedgerInner>,
    nonce: AtomicU64,
    block_height: AtomicU64,
}

impl DevLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(LedgerInner::default()),
            nonce: AtomicU64::new(1),
            block_height: AtomicU64::new(1),
        })
    }

    fn derive_handle(&self, contract: &Address, account: &Address, value: u8) -> CiphertextHandle {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Keccak256::new();
        hasher.update(contract.as_bytes());
        hasher.update(account.as_bytes());
        hasher.update([value]);
        hasher.update(nonce.to_be_bytes());
        let bytes: [u8; HANDLE_SIZE] = hasher.finalize().into();
        CiphertextHandle::new(bytes)
    }

    // Seal a batch of values into fresh handles bound to one proof
    async fn seal(
        self: &Arc<Self>,
        contract: &Address,
        account: &Address,
        values: &[u8],
    ) -> EncryptedInput {
        let mut proof = vec![0u8; PROOF_SIZE];
        rand::thread_rng().fill_bytes(&mut proof);
        let proof_hex = veilcount_common::crypto::to_hex_prefixed(&proof);

        let mut handles = Vec::with_capacity(values.len());
        let mut inner = self.inner.lock().await;
        for value in values {
            let handle = self.derive_handle(contract, account, *value);
            inner.ciphertexts.insert(handle, *value);
            inner.proofs.insert(handle.to_hex(), proof_hex.clone());
            handles.push(handle);
        }

        EncryptedInput {
            handles,
            input_proof: proof,
        }
    }

    // Apply a confirmed increment: wrapping add at the counter bit width,
    // new handle minted for the updated ciphertext
    async fn apply_increment(
        self: &Arc<Self>,
        contract: &Address,
        account: &Address,
        amount: u8,
    ) -> u64 {
        let mut inner = self.inner.lock().await;
        let current = inner.counters.get(account).map(|(_, v)| *v).unwrap_or(0);
        let updated = current.wrapping_add(amount);
        let handle = self.derive_handle(contract, account, updated);
        inner.ciphertexts.insert(handle, updated);
        inner.counters.insert(*account, (handle, updated));
        self.block_height.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterView for DevLedger {
    async fn get_counter(
        &self,
        _contract: &Address,
        account: &Address,
    ) -> Result<CiphertextHandle> {
        let inner = self.inner.lock().await;
        Ok(inner
            .counters
            .get(account)
            .map(|(handle, _)| *handle)
            .unwrap_or_else(CiphertextHandle::zero))
    }
}

// ---- Encryption service ----

pub struct DevFheClient {
    ledger: Arc<DevLedger>,
}

impl DevFheClient {
    pub fn new(ledger: Arc<DevLedger>) -> Self {
        Self { ledger }
    }
}

impl FheClient for DevFheClient {
    fn create_encrypted_input(
        &self,
        contract: &Address,
        account: &Address,
    ) -> Result<Box<dyn EncryptedInputBuilder>, crate::fhe::FheError> {
        Ok(Box::new(DevInputBuilder {
            ledger: Arc::clone(&self.ledger),
            contract: *contract,
            account: *account,
            values: Vec::new(),
        }))
    }
}

struct DevInputBuilder {
    ledger: Arc<DevLedger>,
    contract: Address,
    account: Address,
    values: Vec<u8>,
}

#[async_trait]
impl EncryptedInputBuilder for DevInputBuilder {
    fn add8(&mut self, value: u8) {
        self.values.push(value);
    }

    async fn encrypt(self: Box<Self>) -> Result<EncryptedInput, crate::fhe::FheError> {
        if self.values.is_empty() {
            return Err(crate::fhe::FheError::Encryption(
                "no values added to the input".to_owned(),
            ));
        }
        Ok(self
            .ledger
            .seal(&self.contract, &self.account, &self.values)
            .await)
    }
}

// ---- Wallet and signer ----

pub struct DevWalletProvider {
    signer: Option<Arc<dyn Signer>>,
}

impl DevWalletProvider {
    pub fn connected(signer: Arc<dyn Signer>) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    pub fn disconnected() -> Self {
        Self { signer: None }
    }
}

#[async_trait]
impl WalletProvider for DevWalletProvider {
    async fn get_signer(&self) -> Result<Arc<dyn Signer>> {
        self.signer
            .clone()
            .ok_or_else(|| anyhow!("wallet has no signer connected"))
    }
}

pub struct DevSigner {
    account: Address,
    ledger: Arc<DevLedger>,
    confirmation_latency: Duration,
    fail_confirmation: bool,
}

impl DevSigner {
    pub fn new(account: Address, ledger: Arc<DevLedger>) -> Self {
        Self {
            account,
            ledger,
            confirmation_latency: Duration::from_millis(10),
            fail_confirmation: false,
        }
    }

    // How long a transaction stays pending before inclusion
    pub fn with_confirmation_latency(mut self, latency: Duration) -> Self {
        self.confirmation_latency = latency;
        self
    }

    // Make every transaction revert at confirmation time
    pub fn with_failing_confirmation(mut self) -> Self {
        self.fail_confirmation = true;
        self
    }
}

#[async_trait]
impl Signer for DevSigner {
    fn account(&self) -> Address {
        self.account
    }

    async fn increment_by(
        &self,
        contract: &Address,
        handle_hex: &str,
        proof_hex: &str,
    ) -> Result<Box<dyn PendingTransaction>> {
        let handle_bytes = hex::decode(handle_hex.strip_prefix("0x").unwrap_or(handle_hex))?;
        let handle_bytes: [u8; HANDLE_SIZE] = handle_bytes
            .try_into()
            .map_err(|_| anyhow!("invalid handle length"))?;
        let handle = CiphertextHandle::new(handle_bytes);

        let amount = {
            let inner = self.ledger.inner.lock().await;
            match inner.proofs.get(&handle.to_hex()) {
                Some(expected) if expected == proof_hex => {}
                Some(_) => bail!("input proof does not match the ciphertext handle"),
                None => bail!("unknown input handle {}", handle.to_hex()),
            }
            *inner
                .ciphertexts
                .get(&handle)
                .ok_or_else(|| anyhow!("unknown ciphertext handle"))?
        };

        let tx_hash = {
            let mut hasher = Keccak256::new();
            hasher.update(self.account.as_bytes());
            hasher.update([amount]);
            hasher.update(
                self.ledger
                    .nonce
                    .load(Ordering::SeqCst)
                    .to_be_bytes(),
            );
            veilcount_common::crypto::to_hex_prefixed(&hasher.finalize())
        };

        Ok(Box::new(DevPendingTransaction {
            ledger: Arc::clone(&self.ledger),
            contract: *contract,
            account: self.account,
            amount,
            latency: self.confirmation_latency,
            fail: self.fail_confirmation,
            tx_hash,
        }))
    }
}

struct DevPendingTransaction {
    ledger: Arc<DevLedger>,
    contract: Address,
    account: Address,
    amount: u8,
    latency: Duration,
    fail: bool,
    tx_hash: String,
}

#[async_trait]
impl PendingTransaction for DevPendingTransaction {
    async fn wait(self: Box<Self>) -> Result<TxReceipt> {
        tokio::time::sleep(self.latency).await;
        if self.fail {
            bail!("transaction {} reverted", self.tx_hash);
        }
        let block_number = self
            .ledger
            .apply_increment(&self.contract, &self.account, self.amount)
            .await;
        Ok(TxReceipt {
            tx_hash: self.tx_hash,
            block_number,
        })
    }
}

// ---- Re-encryption service ----

pub struct DevReencryptor {
    ledger: Arc<DevLedger>,
}

impl DevReencryptor {
    pub fn new(ledger: Arc<DevLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl ReencryptionClient for DevReencryptor {
    async fn reencrypt_u8(
        &self,
        signer: &Arc<dyn Signer>,
        handle: &CiphertextHandle,
        _contract: &Address,
    ) -> Result<u8, ReencryptError> {
        if handle.is_zero() {
            return Err(ReencryptError::HandleNotInitialized);
        }

        let inner = self.ledger.inner.lock().await;

        // Only the counter owner may re-encrypt a counter handle
        let owner = inner
            .counters
            .iter()
            .find(|(_, (h, _))| h == handle)
            .map(|(account, _)| *account);
        if let Some(owner) = owner {
            if owner != signer.account() {
                return Err(ReencryptError::Unauthorized);
            }
        }

        inner
            .ciphertexts
            .get(handle)
            .copied()
            .ok_or_else(|| ReencryptError::Protocol("unknown ciphertext handle".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> Address {
        Address::new([byte; veilcount_common::crypto::ADDRESS_SIZE])
    }

    #[tokio::test]
    async fn test_get_counter_defaults_to_zero_handle() {
        let ledger = DevLedger::new();
        let handle = ledger
            .get_counter(&address(1), &address(2))
            .await
            .unwrap();
        assert!(handle.is_zero());
    }

    #[tokio::test]
    async fn test_increment_updates_handle_and_value() {
        let ledger = DevLedger::new();
        let contract = address(1);
        let account = address(2);

        let input = ledger.seal(&contract, &account, &[5]).await;
        let signer = DevSigner::new(account, Arc::clone(&ledger));
        let tx = signer
            .increment_by(
                &contract,
                &input.handles[0].to_hex(),
                &veilcount_common::crypto::to_hex_prefixed(&input.input_proof),
            )
            .await
            .unwrap();
        tx.wait().await.unwrap();

        let handle = ledger.get_counter(&contract, &account).await.unwrap();
        assert!(!handle.is_zero());

        let signer: Arc<dyn Signer> = Arc::new(DevSigner::new(account, Arc::clone(&ledger)));
        let reencryptor = DevReencryptor::new(Arc::clone(&ledger));
        let value = reencryptor
            .reencrypt_u8(&signer, &handle, &contract)
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_increment_rejects_mismatched_proof() {
        let ledger = DevLedger::new();
        let contract = address(1);
        let account = address(2);

        let input = ledger.seal(&contract, &account, &[5]).await;
        let signer = DevSigner::new(account, Arc::clone(&ledger));
        let result = signer
            .increment_by(&contract, &input.handles[0].to_hex(), "0xdeadbeef")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reencrypt_zero_handle_is_uninitialized() {
        let ledger = DevLedger::new();
        let signer: Arc<dyn Signer> =
            Arc::new(DevSigner::new(address(2), Arc::clone(&ledger)));
        let reencryptor = DevReencryptor::new(ledger);
        let result = reencryptor
            .reencrypt_u8(&signer, &CiphertextHandle::zero(), &address(1))
            .await;
        assert!(matches!(result, Err(ReencryptError::HandleNotInitialized)));
    }

    #[tokio::test]
    async fn test_reencrypt_rejects_foreign_counter() {
        let ledger = DevLedger::new();
        let contract = address(1);
        let owner = address(2);
        let intruder = address(3);

        let input = ledger.seal(&contract, &owner, &[4]).await;
        let signer = DevSigner::new(owner, Arc::clone(&ledger));
        let tx = signer
            .increment_by(
                &contract,
                &input.handles[0].to_hex(),
                &veilcount_common::crypto::to_hex_prefixed(&input.input_proof),
            )
            .await
            .unwrap();
        tx.wait().await.unwrap();
        let handle = ledger.get_counter(&contract, &owner).await.unwrap();

        let foreign: Arc<dyn Signer> =
            Arc::new(DevSigner::new(intruder, Arc::clone(&ledger)));
        let reencryptor = DevReencryptor::new(Arc::clone(&ledger));
        let result = reencryptor.reencrypt_u8(&foreign, &handle, &contract).await;
        assert!(matches!(result, Err(ReencryptError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_wrapping_at_bit_width() {
        let ledger = DevLedger::new();
        let contract = address(1);
        let account = address(2);

        for amount in [200u8, 100] {
            let input = ledger.seal(&contract, &account, &[amount]).await;
            let signer = DevSigner::new(account, Arc::clone(&ledger));
            let tx = signer
                .increment_by(
                    &contract,
                    &input.handles[0].to_hex(),
                    &veilcount_common::crypto::to_hex_prefixed(&input.input_proof),
                )
                .await
                .unwrap();
            tx.wait().await.unwrap();
        }

        let handle = ledger.get_counter(&contract, &account).await.unwrap();
        let signer: Arc<dyn Signer> = Arc::new(DevSigner::new(account, Arc::clone(&ledger)));
        let reencryptor = DevReencryptor::new(Arc::clone(&ledger));
        let value = reencryptor
            .reencrypt_u8(&signer, &handle, &contract)
            .await
            .unwrap();
        assert_eq!(value, 200u8.wrapping_add(100));
    }
}
