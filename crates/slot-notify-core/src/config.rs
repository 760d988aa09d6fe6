//! Configuration and settings management
//!
//! Layered loading shared by all crates: optional config files, `APP__`
//! prefixed variables, then plain environment variables.

use crate::store::SelectionStore;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Initial backoff for Telegram API retries
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound on a single retry delay
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 10_000;
/// Retries after the first failed attempt
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

/// Builds the layered configuration source.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE maps to snake_case keys; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Settings owned by the core.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CoreSettings {
    /// Idle time after which a pending status selection is forgotten.
    /// Unset keeps selections for the lifetime of the process.
    pub selection_ttl_secs: Option<u64>,
}

impl CoreSettings {
    /// Load core settings from the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading or deserialization fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Creates the selection store these settings describe.
    #[must_use]
    pub fn selection_store(&self) -> SelectionStore {
        match self.selection_ttl_secs {
            Some(secs) if secs > 0 => SelectionStore::with_idle_ttl(Duration::from_secs(secs)),
            _ => SelectionStore::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_selection_ttl_from_env() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("SELECTION_TTL_SECS", "900");
        let settings = CoreSettings::new()?;
        assert_eq!(settings.selection_ttl_secs, Some(900));
        env::remove_var("SELECTION_TTL_SECS");

        env::set_var("SELECTION_TTL_SECS", "");
        let settings = CoreSettings::new()?;
        assert_eq!(settings.selection_ttl_secs, None);
        env::remove_var("SELECTION_TTL_SECS");
        Ok(())
    }
}
