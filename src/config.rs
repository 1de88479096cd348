//! Configuration management with validation and defaults
//!
//! Configuration is read from TOML, then overridden from `FAIRPLAY_*`
//! environment variables, then validated. Nothing here is global: the loaded
//! [`FairplayConfig`] is handed to constructors.

use crate::errors::{ConfigurationError, FairplayResult};
use crate::seeds::cipher::{SeedCipher, KEY_LEN};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const ENV_SEED_KEY: &str = "FAIRPLAY_SEED_KEY";
pub const ENV_MAX_CLIENT_SEED_LEN: &str = "FAIRPLAY_MAX_CLIENT_SEED_LEN";
pub const ENV_LOG: &str = "FAIRPLAY_LOG";

/// Upper limit accepted for `seeds.max_client_seed_length`
pub const CLIENT_SEED_LENGTH_LIMIT: usize = 256;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FairplayConfig {
    pub seeds: SeedConfig,
    pub logging: LoggingConfig,
}

/// Seed handling settings
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// Hex encoded 32-byte AES key for server seeds at rest
    pub encryption_key: String,
    pub max_client_seed_length: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            encryption_key: String::new(),
            max_client_seed_length: 64,
        }
    }
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("encryption_key", &if self.encryption_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("max_client_seed_length", &self.max_client_seed_length)
            .finish()
    }
}

impl SeedConfig {
    /// Build the at-rest cipher from the configured key
    pub fn cipher(&self) -> FairplayResult<SeedCipher> {
        if self.encryption_key.is_empty() {
            return Err(ConfigurationError::MissingRequired("seeds.encryption_key".to_string()).into());
        }
        Ok(SeedCipher::from_hex(&self.encryption_key)?)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "fairplay=info".to_string(),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> FairplayResult<FairplayConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            FairplayConfig::default()
        };

        self.apply_overrides(&mut config, |name| env::var(name).ok())?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> FairplayResult<FairplayConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_overrides<F>(&self, config: &mut FairplayConfig, lookup: F) -> FairplayResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_SEED_KEY) {
            config.seeds.encryption_key = key;
        }
        if let Some(length) = lookup(ENV_MAX_CLIENT_SEED_LEN) {
            config.seeds.max_client_seed_length = length.parse().map_err(|_| ConfigurationError::InvalidValue {
                field: ENV_MAX_CLIENT_SEED_LEN.to_string(),
                value: length,
                reason: "Invalid length".to_string(),
            })?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            config.logging.filter = filter;
        }

        Ok(())
    }

    /// Validate configuration values
    ///
    /// An empty encryption key passes here; it is rejected when a cipher is
    /// built from it, so verification-only tools can run without one.
    pub fn validate(&self, config: &FairplayConfig) -> FairplayResult<()> {
        let seeds = &config.seeds;

        if !seeds.encryption_key.is_empty() {
            let key = hex::decode(&seeds.encryption_key).map_err(|e| ConfigurationError::InvalidValue {
                field: "seeds.encryption_key".to_string(),
                value: "<redacted>".to_string(),
                reason: format!("Not valid hex: {}", e),
            })?;
            if key.len() != KEY_LEN {
                return Err(ConfigurationError::InvalidValue {
                    field: "seeds.encryption_key".to_string(),
                    value: "<redacted>".to_string(),
                    reason: format!("Key must be {} bytes, got {}", KEY_LEN, key.len()),
                }
                .into());
            }
        }

        if seeds.max_client_seed_length == 0 || seeds.max_client_seed_length > CLIENT_SEED_LENGTH_LIMIT {
            return Err(ConfigurationError::InvalidValue {
                field: "seeds.max_client_seed_length".to_string(),
                value: seeds.max_client_seed_length.to_string(),
                reason: format!("Must be between 1 and {}", CLIENT_SEED_LENGTH_LIMIT),
            }
            .into());
        }

        if config.logging.filter.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("logging.filter".to_string()).into());
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &FairplayConfig, path: &str) -> FairplayResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

/// Builder pattern for creating configurations
#[derive(Default)]
pub struct ConfigBuilder {
    config: FairplayConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encryption_key(mut self, key_hex: impl Into<String>) -> Self {
        self.config.seeds.encryption_key = key_hex.into();
        self
    }

    pub fn max_client_seed_length(mut self, length: usize) -> Self {
        self.config.seeds.max_client_seed_length = length;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.logging.filter = filter.into();
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> FairplayResult<FairplayConfig> {
        ConfigLoader::new().validate(&self.config)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FairplayError;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_default_config() {
        let config = FairplayConfig::default();
        assert_eq!(config.seeds.max_client_seed_length, 64);
        assert_eq!(config.logging.filter, "fairplay=info");
        assert!(ConfigLoader::new().validate(&config).is_ok());
    }

    #[test]
    fn test_missing_key_is_reported_when_building_cipher() {
        let err = FairplayConfig::default().seeds.cipher().unwrap_err();
        assert!(matches!(
            err,
            FairplayError::Configuration(ConfigurationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_key_validation() {
        let loader = ConfigLoader::new();
        let mut config = FairplayConfig::default();

        config.seeds.encryption_key = "abcd".to_string();
        assert!(loader.validate(&config).is_err());

        config.seeds.encryption_key = "zz".repeat(32);
        assert!(loader.validate(&config).is_err());

        config.seeds.encryption_key = KEY_HEX.to_string();
        assert!(loader.validate(&config).is_ok());
        assert!(config.seeds.cipher().is_ok());
    }

    #[test]
    fn test_client_seed_length_bounds() {
        assert!(ConfigBuilder::new().max_client_seed_length(0).build().is_err());
        assert!(ConfigBuilder::new().max_client_seed_length(CLIENT_SEED_LENGTH_LIMIT + 1).build().is_err());
        assert!(ConfigBuilder::new().max_client_seed_length(32).build().is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_SEED_KEY, KEY_HEX),
            (ENV_MAX_CLIENT_SEED_LEN, "32"),
            (ENV_LOG, "fairplay=debug"),
        ]
        .into_iter()
        .collect();

        let loader = ConfigLoader::new();
        let mut config = FairplayConfig::default();
        loader
            .apply_overrides(&mut config, |name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.seeds.encryption_key, KEY_HEX);
        assert_eq!(config.seeds.max_client_seed_length, 32);
        assert_eq!(config.logging.filter, "fairplay=debug");
    }

    #[test]
    fn test_invalid_override() {
        let loader = ConfigLoader::new();
        let mut config = FairplayConfig::default();
        let result = loader.apply_overrides(&mut config, |name| {
            (name == ENV_MAX_CLIENT_SEED_LEN).then(|| "many".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ConfigBuilder::new().encryption_key(KEY_HEX).build().unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains(KEY_HEX));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_save_and_load_config() -> FairplayResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let original = ConfigBuilder::new()
            .encryption_key(KEY_HEX)
            .max_client_seed_length(48)
            .build()?;

        let loader = ConfigLoader::new();
        loader.save(&original, path)?;
        let loaded = loader.load_from_file(path)?;

        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> FairplayResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[seeds]\nmax_client_seed_length = 20\n").unwrap();

        let loaded = ConfigLoader::new().load_from_file(temp_file.path().to_str().unwrap())?;
        assert_eq!(loaded.seeds.max_client_seed_length, 20);
        assert_eq!(loaded.logging, LoggingConfig::default());
        Ok(())
    }
}
