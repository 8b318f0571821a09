//! Configuration for the pool ledger

use crate::types::{Principal, POOL_CONTRACT_NAME};
use serde::{Deserialize, Serialize};

/// Pool ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Contract deployment
    pub contract: ContractConfig,

    /// Actor configuration
    pub actor: ActorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "pool-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            contract: ContractConfig::default(),
            actor: ActorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where the pool contract lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployer address
    pub deployer: String,

    /// Contract name
    pub name: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            // Default devnet deployer
            deployer: "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".to_string(),
            name: POOL_CONTRACT_NAME.to_string(),
        }
    }
}

impl ContractConfig {
    /// Deployer as a principal
    pub fn deployer_principal(&self) -> crate::Result<Principal> {
        Principal::parse(self.deployer.as_str())
            .map_err(|e| crate::Error::Config(format!("Invalid deployer: {}", e)))
    }
}

/// Actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Bounded mailbox capacity (messages)
    pub mailbox_capacity: usize,

    /// Verify invariants after every public call
    pub check_invariants: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1024,
            check_invariants: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(deployer) = std::env::var("POOL_DEPLOYER") {
            config.contract.deployer = deployer;
        }

        if let Ok(name) = std::env::var("POOL_CONTRACT_NAME") {
            config.contract.name = name;
        }

        if let Ok(capacity) = std::env::var("POOL_MAILBOX_CAPACITY") {
            config.actor.mailbox_capacity = capacity.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid POOL_MAILBOX_CAPACITY: {}", e))
            })?;
        }

        if let Ok(level) = std::env::var("POOL_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(json) = std::env::var("POOL_LOG_JSON") {
            config.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the ledger cannot start with
    pub fn validate(&self) -> crate::Result<()> {
        let deployer = self.contract.deployer_principal()?;
        if deployer.is_contract() {
            return Err(crate::Error::Config(
                "Deployer must be a standard principal".to_string(),
            ));
        }
        Principal::contract(&deployer, &self.contract.name)
            .map_err(|e| crate::Error::Config(format!("Invalid contract name: {}", e)))?;

        if self.actor.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "Mailbox capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
