//! Application configuration management.

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a new connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// The single currency every amount in this ledger is denominated in.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Execution budget for one unit of work, in milliseconds.
    #[serde(default = "default_unit_of_work_timeout")]
    pub unit_of_work_timeout_ms: u64,
    /// Buffered events per subscriber before slow receivers start lagging.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    /// Zero-padding width of the sequence part of `TXN-<year>-<seq>`.
    #[serde(default = "default_transaction_number_width")]
    pub transaction_number_width: usize,
}

fn default_currency() -> Currency {
    Currency::Usd
}

fn default_unit_of_work_timeout() -> u64 {
    5000
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_transaction_number_width() -> usize {
    6
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            unit_of_work_timeout_ms: default_unit_of_work_timeout(),
            event_channel_capacity: default_event_channel_capacity(),
            transaction_number_width: default_transaction_number_width(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
