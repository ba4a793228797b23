//! Ethereum ledger client using ethers-rs
//!
//! Talks JSON-RPC over HTTP to the node hosting the batch contract. Writes
//! are signed locally with the configured key and broadcast without waiting
//! for a receipt. Reads are plain `eth_call`s.

use super::{parse_address, sender_account, signing_wallet, BatchLedger, LedgerError, Result};
use crate::config::LedgerSettings;
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::utils::to_checksum;
use std::sync::Arc;

abigen!(
    BatchContract,
    r#"[
        function addBatch(string id, string data)
        function getBatch(string id) external view returns (string)
    ]"#
);

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

const GWEI: u64 = 1_000_000_000;

/// Fee and gas settings applied to every `addBatch` transaction
#[derive(Debug, Clone, Copy)]
struct TxParams {
    gas_limit: U256,
    max_fee_per_gas: U256,
    max_priority_fee_per_gas: U256,
}

pub struct EthereumLedger {
    provider: Provider<Http>,
    reader: BatchContract<Provider<Http>>,
    writer: Option<BatchContract<SignerClient>>,
    contract_address: Address,
    account: Address,
    params: TxParams,
}

impl EthereumLedger {
    pub fn new(settings: &LedgerSettings) -> Result<Self> {
        let provider = Provider::<Http>::try_from(settings.rpc_url.as_str())
            .map_err(|e| LedgerError::InvalidConfig(format!("rpc_url: {}", e)))?;

        let contract_address = parse_address("contract_address", &settings.contract_address)?;

        let wallet = signing_wallet(settings)?;
        let account = sender_account(wallet.as_ref(), settings)?;

        let reader = BatchContract::new(contract_address, Arc::new(provider.clone()));
        let writer = wallet.map(|wallet| {
            let client = Arc::new(SignerMiddleware::new(provider.clone(), wallet));
            BatchContract::new(contract_address, client)
        });

        let params = TxParams {
            gas_limit: U256::from(settings.gas_limit),
            max_fee_per_gas: U256::from(settings.max_fee_per_gas_gwei) * U256::from(GWEI),
            max_priority_fee_per_gas: U256::from(settings.max_priority_fee_per_gas_gwei)
                * U256::from(GWEI),
        };

        Ok(Self {
            provider,
            reader,
            writer,
            contract_address,
            account,
            params,
        })
    }
}

#[async_trait]
impl BatchLedger for EthereumLedger {
    async fn submit_batch(&self, batch_id: &str, data: &str) -> Result<String> {
        let writer = self.writer.as_ref().ok_or(LedgerError::MissingSigner)?;

        let nonce = self
            .provider
            .get_transaction_count(self.account, None)
            .await
            .map_err(|e| LedgerError::Provider(e.to_string()))?;

        let mut call = writer
            .add_batch(batch_id.to_string(), data.to_string())
            .from(self.account)
            .nonce(nonce)
            .gas(self.params.gas_limit);
        if let TypedTransaction::Eip1559(tx) = &mut call.tx {
            tx.max_fee_per_gas = Some(self.params.max_fee_per_gas);
            tx.max_priority_fee_per_gas = Some(self.params.max_priority_fee_per_gas);
        }

        let pending = call
            .send()
            .await
            .map_err(|e| LedgerError::Contract(e.to_string()))?;
        Ok(format!("{:?}", pending.tx_hash()))
    }

    async fn fetch_batch(&self, batch_id: &str) -> Result<String> {
        self.reader
            .get_batch(batch_id.to_string())
            .call()
            .await
            .map_err(|e| LedgerError::Contract(e.to_string()))
    }

    fn contract_address(&self) -> String {
        to_checksum(&self.contract_address, None)
    }

    fn account_address(&self) -> String {
        to_checksum(&self.account, None)
    }

    fn backend_name(&self) -> &'static str {
        "ethereum"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretString;

    // Well-known development key (first Hardhat/Anvil account)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_account_derived_from_key() {
        let settings = LedgerSettings {
            private_key: Some(SecretString::new(DEV_KEY)),
            ..Default::default()
        };
        let ledger = EthereumLedger::new(&settings).unwrap();
        assert_eq!(ledger.account_address(), DEV_ACCOUNT);
        assert!(ledger.writer.is_some());
    }

    #[test]
    fn test_configured_account_without_key() {
        let settings = LedgerSettings {
            account_address: Some(DEV_ACCOUNT.to_lowercase()),
            ..Default::default()
        };
        let ledger = EthereumLedger::new(&settings).unwrap();
        assert_eq!(ledger.account_address(), DEV_ACCOUNT);
        assert!(ledger.writer.is_none());
    }

    #[test]
    fn test_contract_address_is_checksummed() {
        let settings = LedgerSettings {
            contract_address: "0xebc162045f0a15db16669dd9c0ebc0bf4f80f48d".to_string(),
            ..Default::default()
        };
        let ledger = EthereumLedger::new(&settings).unwrap();
        let address = ledger.contract_address();
        assert!(address.eq_ignore_ascii_case("0xebc162045f0a15db16669dd9c0ebc0bf4f80f48d"));
        assert_ne!(address, address.to_lowercase());
    }

    #[test]
    fn test_fee_params_in_wei() {
        let ledger = EthereumLedger::new(&LedgerSettings::default()).unwrap();
        assert_eq!(ledger.params.gas_limit, U256::from(200_000u64));
        assert_eq!(ledger.params.max_fee_per_gas, U256::from(2_000_000_000u64));
        assert_eq!(ledger.params.max_priority_fee_per_gas, U256::from(1_000_000_000u64));
    }

    #[test]
    fn test_invalid_private_key() {
        let settings = LedgerSettings {
            private_key: Some(SecretString::new("0x1234")),
            ..Default::default()
        };
        assert!(matches!(
            EthereumLedger::new(&settings),
            Err(LedgerError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_without_signer() {
        let ledger = EthereumLedger::new(&LedgerSettings::default()).unwrap();
        let err = ledger.submit_batch("B1", "harvest-2024").await.unwrap_err();
        assert!(matches!(err, LedgerError::MissingSigner));
    }

    fn unreachable_node() -> LedgerSettings {
        LedgerSettings {
            rpc_url: "http://127.0.0.1:1".to_string(),
            private_key: Some(SecretString::new(DEV_KEY)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_to_unreachable_node() {
        let ledger = EthereumLedger::new(&unreachable_node()).unwrap();
        let err = ledger.submit_batch("B1", "harvest-2024").await.unwrap_err();
        assert!(matches!(err, LedgerError::Provider(_)));
        assert!(err.to_string().starts_with("Provider error: "));
    }

    #[tokio::test]
    async fn test_fetch_from_unreachable_node() {
        let ledger = EthereumLedger::new(&unreachable_node()).unwrap();
        let err = ledger.fetch_batch("B1").await.unwrap_err();
        assert!(matches!(err, LedgerError::Contract(_)));
    }
}
