use crate::error::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub dkim: DkimConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub listen_addr: String,
    /// Admin credentials for the /v1 surface. The server refuses to
    /// start when either is empty.
    pub admin_user: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DkimConfig {
    pub key_dir: String,
    pub selector: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AdminError::Config(e.to_string()))?;

        toml::from_str(&content).map_err(|e| AdminError::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                listen_addr: "0.0.0.0:8080".to_string(),
                admin_user: String::new(),
                admin_password: String::new(),
            },
            storage: StorageConfig {
                database_url: "sqlite://mailadm.db".to_string(),
            },
            dkim: DkimConfig {
                key_dir: "data/dkim".to_string(),
                selector: "default".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
