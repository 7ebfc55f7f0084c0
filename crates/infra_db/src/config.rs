//! Session configuration

use serde::Deserialize;
use std::path::PathBuf;

use core_kernel::CoreError;

use crate::pool::DatabaseConfig;

/// Settings for an intake session, read from `RELIEF_`-prefixed variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReliefConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Pool size; one connection unless raised
    pub max_connections: u32,
    /// Append-only file receiving store failures
    pub failure_log: PathBuf,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for ReliefConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/relief".to_string(),
            max_connections: 1,
            failure_log: PathBuf::from("relief-failures.log"),
            log_level: "info".to_string(),
        }
    }
}

impl ReliefConfig {
    /// Loads configuration from the environment
    ///
    /// `RELIEF_DATABASE_URL`, `RELIEF_MAX_CONNECTIONS`, `RELIEF_FAILURE_LOG`
    /// and `RELIEF_LOG_LEVEL` override the defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("RELIEF").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.database_url.trim().is_empty() {
            return Err(CoreError::configuration("database url must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(CoreError::configuration("max connections must be at least 1"));
        }
        Ok(())
    }

    /// Pool settings derived from this configuration
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone()).max_connections(self.max_connections)
    }
}
