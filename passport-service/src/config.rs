//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the hex-encoded 32-byte signing seed.
pub const SIGNER_SEED_ENV: &str = "PASSPORT_SIGNER_SEED";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Signer configuration
    #[serde(default)]
    pub signer: SignerConfig,

    /// Storage configuration
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Maximum concurrent connections
    pub max_connections: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Hex-encoded 32-byte Ed25519 seed. Never written to the config file;
    /// provided via the PASSPORT_SIGNER_SEED environment variable.
    #[serde(skip)]
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the sled database directory
    pub path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8090,
                max_connections: 1000,
            },
            signer: SignerConfig { seed: None },
            store: StoreConfig {
                path: PathBuf::from("passport-data"),
            },
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ServiceConfig = toml::from_str(&contents)?;

        // The signing seed only ever comes from the environment
        if config.signer.seed.is_none() {
            config.signer.seed = std::env::var(SIGNER_SEED_ENV).ok();
        }

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
