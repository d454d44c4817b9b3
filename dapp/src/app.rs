use log::{debug, error, info, trace, warn};
use std::{path::Path, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use veilcount_common::{
    api::EncryptedInput,
    crypto::{to_hex_prefixed, Address, CiphertextHandle},
    network::Network,
};

use crate::{
    chain::{CounterView, TxReceipt, WalletProvider},
    config::TX_CONFIRMATION_TIMEOUT_SECS,
    error::DappError,
    fhe::{self, FheClient},
    manifest,
    reencrypt::{ReencryptError, ReencryptionClient},
    state::{CounterEvent, CounterState},
};

// The confidential counter component: sequencing of external calls,
// one authoritative state container, user-triggered side effects.
//
// Collaborators are passed in explicitly; there is no ambient singleton
// for the encryption client. Every failure is terminal to its triggering
// action and handled here, nothing is re-thrown to the caller.
pub struct CounterApp {
    // Account the component acts for
    account: Address,
    wallet: Arc<dyn WalletProvider>,
    // Read-only chain view for balance reads
    chain: Arc<dyn CounterView>,
    // None until the encryption library has been initialized
    fhe: Option<Arc<dyn FheClient>>,
    reencryption: Arc<dyn ReencryptionClient>,
    // Single writer for all component state
    state: Mutex<CounterState>,
    confirmation_timeout: Duration,
}

impl CounterApp {
    pub fn new(
        account: Address,
        wallet: Arc<dyn WalletProvider>,
        chain: Arc<dyn CounterView>,
        reencryption: Arc<dyn ReencryptionClient>,
    ) -> Self {
        Self {
            account,
            wallet,
            chain,
            fhe: None,
            reencryption,
            state: Mutex::new(CounterState::new()),
            confirmation_timeout: Duration::from_secs(TX_CONFIRMATION_TIMEOUT_SECS),
        }
    }

    // Attach an initialized encryption client
    pub fn with_fhe_client(mut self, client: Arc<dyn FheClient>) -> Self {
        self.fhe = Some(client);
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn get_account(&self) -> &Address {
        &self.account
    }

    // Snapshot of the current component state
    pub async fn state(&self) -> CounterState {
        self.state.lock().await.clone()
    }

    // Mount-time sequence: locate the contract, then fetch the handle
    pub async fn mount(&self, manifest_dir: &Path, network: Network) {
        self.resolve_contract(manifest_dir, network).await;
        self.refresh_handle().await;
    }

    // Contract Locator: resolve the deployed address for the network.
    // On failure the address stays at the zero sentinel and every
    // address-dependent action below no-ops.
    pub async fn resolve_contract(&self, manifest_dir: &Path, network: Network) {
        match manifest::load_contract_address(manifest_dir, network) {
            Ok(address) => {
                self.state
                    .lock()
                    .await
                    .apply(CounterEvent::ContractResolved(address));
            }
            Err(e) => {
                error!(
                    "Error loading deployment manifest - you probably forgot \
                     to deploy the counter contract: {}",
                    e
                );
            }
        }
    }

    // Set the contract address directly, bypassing the manifest lookup
    pub async fn set_contract_address(&self, address: Address) {
        self.state
            .lock()
            .await
            .apply(CounterEvent::ContractResolved(address));
    }

    // Balance Reader: fetch the current encrypted handle for the account.
    // A failed read leaves the previously displayed value untouched.
    pub async fn refresh_handle(&self) {
        let contract = self.state.lock().await.contract_address;
        if contract.is_zero() {
            trace!("Contract address not resolved yet, skipping handle refresh");
            return;
        }

        match self.chain.get_counter(&contract, &self.account).await {
            Ok(handle) => {
                debug!("Fetched counter handle {}", handle);
                self.state
                    .lock()
                    .await
                    .apply(CounterEvent::HandleFetched(handle));
            }
            Err(e) => warn!("Failed to fetch counter handle: {}", e),
        }
    }

    // Confirm the numeric input as the value to encrypt
    pub async fn choose_value(&self, value: u8) {
        self.state
            .lock()
            .await
            .apply(CounterEvent::ValueChosen(value));
    }

    // Encryption Adapter: wrap the chosen value into a (handles, proof)
    // pair. Preconditions (resolved address, initialized client) fail as
    // descriptive errors that are logged, with no state change.
    pub async fn encrypt(&self) {
        let (contract, value) = {
            let state = self.state.lock().await;
            (state.contract_address, state.chosen_value)
        };

        match self.try_encrypt(contract, value).await {
            Ok(input) => {
                self.state
                    .lock()
                    .await
                    .apply(CounterEvent::EncryptionReady(input));
            }
            Err(e) => error!("Encryption error: {}", e),
        }
    }

    async fn try_encrypt(
        &self,
        contract: Address,
        value: u8,
    ) -> Result<EncryptedInput, DappError> {
        if contract.is_zero() {
            return Err(DappError::ContractNotResolved);
        }
        let input = fhe::encrypt_u8(self.fhe.as_ref(), &contract, &self.account, value).await?;
        Ok(input)
    }

    // Decryption branch, independent of the encryption state.
    // An uninitialized handle is shown as zero by policy; any other
    // failure replaces the displayed value with an explicit marker.
    pub async fn decrypt(&self) {
        let (contract, handle) = {
            let state = self.state.lock().await;
            (state.contract_address, state.handle)
        };

        match self.try_decrypt(contract, handle).await {
            Ok(value) => {
                self.state
                    .lock()
                    .await
                    .apply(CounterEvent::DecryptSucceeded(value));
            }
            Err(DappError::Reencrypt(ReencryptError::HandleNotInitialized)) => {
                debug!("Counter handle not initialized yet, showing zero");
                self.state
                    .lock()
                    .await
                    .apply(CounterEvent::DecryptSucceeded(0));
            }
            Err(e) => {
                error!("Decryption error: {}", e);
                self.state.lock().await.apply(CounterEvent::DecryptFailed);
            }
        }
    }

    async fn try_decrypt(
        &self,
        contract: Address,
        handle: CiphertextHandle,
    ) -> Result<u8, DappError> {
        let signer = self
            .wallet
            .get_signer()
            .await
            .map_err(|_| DappError::SignerUnavailable)?;
        let value = self
            .reencryption
            .reencrypt_u8(&signer, &handle, &contract)
            .await?;
        Ok(value)
    }

    // Transaction Submitter: send the pending encryption to the contract
    // and race confirmation against the client-side timeout.
    //
    // State machine: Idle -> Submitting -> Confirmed (refresh) |
    // TimedOut | Errored, guard cleared on every branch. A submission
    // requested while one is in flight is dropped silently.
    pub async fn submit(&self) {
        let (contract, pending) = {
            let mut state = self.state.lock().await;
            if state.contract_address.is_zero() {
                debug!("Contract address not resolved yet, ignoring submission");
                return;
            }
            let Some(pending) = state.pending.clone() else {
                debug!("No pending encryption to submit");
                return;
            };
            if !state.apply(CounterEvent::SubmitStarted) {
                debug!("A submission is already in flight, ignoring");
                return;
            }
            (state.contract_address, pending)
        };

        let result = self.try_submit(contract, pending).await;
        match &result {
            Ok(receipt) => info!(
                "Transaction {} confirmed in block {}",
                receipt.tx_hash, receipt.block_number
            ),
            Err(e) => error!("Transfer error: {}", e),
        }

        // Only a confirmed submission triggers a balance refresh
        if result.is_ok() {
            self.refresh_handle().await;
        }

        self.state.lock().await.apply(CounterEvent::SubmitSettled);
    }

    async fn try_submit(
        &self,
        contract: Address,
        pending: EncryptedInput,
    ) -> Result<TxReceipt, DappError> {
        let signer = self
            .wallet
            .get_signer()
            .await
            .map_err(|_| DappError::SignerUnavailable)?;

        let handle = pending.primary_handle().ok_or(DappError::MissingHandle)?;
        let handle_hex = handle.to_hex();
        let proof_hex = to_hex_prefixed(&pending.input_proof);

        let tx = signer
            .increment_by(&contract, &handle_hex, &proof_hex)
            .await
            .map_err(DappError::Any)?;
        debug!("Transaction submitted, waiting for confirmation");

        // Losing the race drops the local confirmation watch only; the
        // transaction itself may still confirm on chain later and is not
        // reconciled with the reported timeout.
        match tokio::time::timeout(self.confirmation_timeout, tx.wait()).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => Err(DappError::Any(e)),
            Err(_) => Err(DappError::ConfirmationTimeout),
        }
    }
}
