//! FoodTrace Safety API
//!
//! District-level crop-area risk lookups over a static dataset, plus
//! batch write/trace operations forwarded to a smart contract.

pub mod api;
pub mod config;
pub mod dataset;
pub mod ledger;
pub mod safety;

pub use api::server::{create_router, AppState};
pub use config::Config;
pub use dataset::{normalize_district, DatasetStore};
pub use ledger::{BatchLedger, LedgerError};
pub use safety::{classify, RiskLevel};
