//! Batch ledger access
//!
//! The ledger is the authoritative store for batch records. The service only
//! forwards writes and reads to it through [`BatchLedger`].

pub mod ethereum;
pub mod memory;

pub use ethereum::EthereumLedger;
pub use memory::MemoryLedger;

use crate::config::{LedgerBackend, LedgerSettings};
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::to_checksum;
use log::warn;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid ledger configuration: {0}")]
    InvalidConfig(String),

    #[error("No signing key configured for ledger writes")]
    MissingSigner,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Batch not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Two-operation view of the batch contract
#[async_trait]
pub trait BatchLedger: Send + Sync {
    /// Record `data` under `batch_id` and return the transaction hash.
    /// Returns as soon as the transaction is accepted for broadcast.
    async fn submit_batch(&self, batch_id: &str, data: &str) -> Result<String>;

    /// Read the data recorded under `batch_id`
    async fn fetch_batch(&self, batch_id: &str) -> Result<String>;

    /// Checksummed contract address
    fn contract_address(&self) -> String;

    /// Checksummed address transactions are sent from
    fn account_address(&self) -> String;

    fn backend_name(&self) -> &'static str;
}

/// Build the ledger client selected by `settings.backend`.
///
/// No network round-trip happens here; the first remote call is made by
/// the first request that needs it.
pub fn connect(settings: &LedgerSettings) -> Result<Arc<dyn BatchLedger>> {
    match settings.backend {
        LedgerBackend::Ethereum => Ok(Arc::new(EthereumLedger::new(settings)?)),
        LedgerBackend::Memory => Ok(Arc::new(MemoryLedger::from_settings(settings)?)),
    }
}

pub(crate) fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| LedgerError::InvalidConfig(format!("{}: {}", field, e)))
}

/// Wallet for the configured signing key, bound to `settings.chain_id`
pub(crate) fn signing_wallet(settings: &LedgerSettings) -> Result<Option<LocalWallet>> {
    settings
        .private_key
        .as_ref()
        .map(|key| {
            key.expose()
                .parse::<LocalWallet>()
                .map(|wallet| wallet.with_chain_id(settings.chain_id))
                .map_err(|_| LedgerError::InvalidConfig("private_key is not a valid key".into()))
        })
        .transpose()
}

/// Sender address: the signing key's address if a key is configured, else
/// `account_address`, else the zero address
pub(crate) fn sender_account(
    wallet: Option<&LocalWallet>,
    settings: &LedgerSettings,
) -> Result<Address> {
    let configured = settings
        .account_address
        .as_deref()
        .map(|value| parse_address("account_address", value))
        .transpose()?;

    match (wallet, configured) {
        (Some(wallet), Some(configured)) => {
            if configured != wallet.address() {
                warn!(
                    "Configured account_address {} does not match the signing key; using {}",
                    to_checksum(&configured, None),
                    to_checksum(&wallet.address(), None)
                );
            }
            Ok(wallet.address())
        }
        (Some(wallet), None) => Ok(wallet.address()),
        (None, Some(configured)) => Ok(configured),
        (None, None) => Ok(Address::zero()),
    }
}
