//! Service configuration
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! `FOODTRACE_*` environment variables (nested keys separated by `__`, e.g.
//! `FOODTRACE_LEDGER__PRIVATE_KEY`). Command-line flags are applied last by
//! the binary.

use crate::api::cors::CorsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

pub const ENV_PREFIX: &str = "FOODTRACE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub dataset: DatasetSettings,
    pub cors: CorsConfig,
    pub ledger: LedgerSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// CSV file with at least `District` and `Area` columns
    pub path: PathBuf,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/tamilnaducropprod.csv"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Ethereum,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub backend: LedgerBackend,
    /// JSON-RPC endpoint of the node
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: String,
    /// Sender address reported when no signing key is configured
    pub account_address: Option<String>,
    pub private_key: Option<SecretString>,
    pub gas_limit: u64,
    pub max_fee_per_gas_gwei: u64,
    pub max_priority_fee_per_gas_gwei: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Ethereum,
            rpc_url: "http://127.0.0.1:7545".to_string(),
            chain_id: 1337,
            contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            account_address: None,
            private_key: None,
            gas_limit: 200_000,
            max_fee_per_gas_gwei: 2,
            max_priority_fee_per_gas_gwei: 1,
        }
    }
}

/// Secret text that is wiped on drop and never printed
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(<redacted>)")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

impl Config {
    /// Load configuration from `path` (skipped if absent) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_layers(path, environment())
    }

    fn load_layers(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(env);

        let settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Config>()
            .context("Invalid configuration")?;
        Ok(settings)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8001");
        assert_eq!(config.dataset.path, PathBuf::from("data/tamilnaducropprod.csv"));
        assert_eq!(config.ledger.backend, LedgerBackend::Ethereum);
        assert_eq!(config.ledger.rpc_url, "http://127.0.0.1:7545");
        assert_eq!(config.ledger.gas_limit, 200_000);
        assert!(config.ledger.private_key.is_none());
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://localhost:5173", "http://localhost:3000"]
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("absent.yaml").as_path())).unwrap();
        assert_eq!(config.server.port, 8001);
    }

    #[test]
    fn test_yaml_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foodtrace.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "server:\n  port: 9100\ndataset:\n  path: /srv/crops.csv\nledger:\n  backend: memory\n  private_key: \"0xabc\"\ncors:\n  allowed_origins:\n    - https://foodtrace.example\n"
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.dataset.path, PathBuf::from("/srv/crops.csv"));
        assert_eq!(config.ledger.backend, LedgerBackend::Memory);
        assert_eq!(config.ledger.gas_limit, 200_000);
        assert_eq!(
            config.ledger.private_key.as_ref().map(|k| k.expose()),
            Some("0xabc")
        );
        assert_eq!(config.cors.allowed_origins, vec!["https://foodtrace.example"]);
    }

    fn env_vars(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let env = env_vars(&[
            ("FOODTRACE_LEDGER__PRIVATE_KEY", "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
            ("FOODTRACE_LEDGER__CONTRACT_ADDRESS", "0xebc162045f0a15db16669dd9c0ebc0bf4f80f48d"),
            ("FOODTRACE_CORS__ALLOWED_ORIGINS", "https://a.example,https://b.example"),
            ("FOODTRACE_SERVER__PORT", "9200"),
            ("UNRELATED_SERVER__PORT", "1"),
        ]);

        let config = Config::load_layers(None, env).unwrap();
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        let key = config.ledger.private_key.as_ref().map(|k| k.expose());
        assert_eq!(key.map(str::len), Some(66));
        assert_eq!(
            config.ledger.contract_address,
            "0xebc162045f0a15db16669dd9c0ebc0bf4f80f48d"
        );
        assert_eq!(config.ledger.gas_limit, 200_000);
    }

    #[test]
    fn test_environment_overrides_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foodtrace.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "server:\n  port: 9100\n  host: 127.0.0.1\nledger:\n  backend: memory\n  private_key: \"0xabc\"\ncors:\n  allowed_origins:\n    - https://foodtrace.example\n"
        )
        .unwrap();

        let env = env_vars(&[
            ("FOODTRACE_LEDGER__PRIVATE_KEY", "0xdef"),
            ("FOODTRACE_CORS__ALLOWED_ORIGINS", "https://a.example,https://b.example"),
            ("FOODTRACE_SERVER__PORT", "9200"),
        ]);

        let config = Config::load_layers(Some(path.as_path()), env).unwrap();
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.ledger.backend, LedgerBackend::Memory);
        assert_eq!(
            config.ledger.private_key.as_ref().map(|k| k.expose()),
            Some("0xdef")
        );
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretString::new("0xdeadbeef");
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("deadbeef"));
        let settings = LedgerSettings {
            private_key: Some(secret),
            ..Default::default()
        };
        assert!(!format!("{:?}", settings).contains("deadbeef"));
    }
}
