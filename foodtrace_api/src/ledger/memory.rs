use super::{parse_address, sender_account, signing_wallet, BatchLedger, LedgerError, Result};
use crate::config::LedgerSettings;
use async_trait::async_trait;
use ethers::types::Address;
use ethers::utils::{keccak256, to_checksum};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-process ledger for offline runs and tests.
///
/// Writes overwrite any earlier data for the same batch id.
pub struct MemoryLedger {
    batches: RwLock<HashMap<String, String>>,
    nonce: AtomicU64,
    contract_address: Address,
    account: Address,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            batches: RwLock::new(HashMap::new()),
            nonce: AtomicU64::new(0),
            contract_address: Address::zero(),
            account: Address::zero(),
        }
    }

    /// Addresses follow the Ethereum backend: the signing key's address when
    /// a key is configured, else `account_address`. Nothing is signed.
    pub fn from_settings(settings: &LedgerSettings) -> Result<Self> {
        let wallet = signing_wallet(settings)?;

        let mut ledger = Self::new();
        ledger.contract_address = parse_address("contract_address", &settings.contract_address)?;
        ledger.account = sender_account(wallet.as_ref(), settings)?;
        Ok(ledger)
    }

    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.batches.read().await.is_empty()
    }
}

#[async_trait]
impl BatchLedger for MemoryLedger {
    async fn submit_batch(&self, batch_id: &str, data: &str) -> Result<String> {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);

        let mut preimage = Vec::with_capacity(batch_id.len() + data.len() + 9);
        preimage.extend_from_slice(batch_id.as_bytes());
        preimage.push(0);
        preimage.extend_from_slice(data.as_bytes());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let tx_hash = format!("0x{}", hex::encode(keccak256(&preimage)));

        self.batches
            .write()
            .await
            .insert(batch_id.to_string(), data.to_string());
        Ok(tx_hash)
    }

    async fn fetch_batch(&self, batch_id: &str) -> Result<String> {
        self.batches
            .read()
            .await
            .get(batch_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(batch_id.to_string()))
    }

    fn contract_address(&self) -> String {
        to_checksum(&self.contract_address, None)
    }

    fn account_address(&self) -> String {
        to_checksum(&self.account, None)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
