//! # fit-config
//!
//! Layered configuration loading for Stackfit using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`STACKFIT_*` prefix, `__` as separator)
//! 2. Project-level `.stackfit/config.toml`
//! 3. User-level `~/.config/stackfit/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `STACKFIT_DATABASE__URL` -> `database.url`,
//! `STACKFIT_FLAGS__CACHE_TTL_SECS` -> `flags.cache_ttl_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use fit_config::FitConfig;
//!
//! let config = FitConfig::load_with_dotenv().expect("config");
//! if config.database.is_remote() {
//!     println!("Remote database: {}", config.database.url);
//! }
//! ```

mod database;
mod error;
mod flags;
mod logo;
mod server;
mod versions;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use flags::FlagsConfig;
pub use logo::LogoConfig;
pub use server::ServerConfig;
pub use versions::VersionsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FitConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub flags: FlagsConfig,
    #[serde(default)]
    pub versions: VersionsConfig,
    #[serde(default)]
    pub logo: LogoConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl FitConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".stackfit/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("STACKFIT_").split("__"))
    }

    /// Reject values that would make a component misbehave.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.versions.retention == 0 {
            return Err(ConfigError::InvalidValue {
                field: "versions.retention".into(),
                reason: "must keep at least one version".into(),
            });
        }
        if self.logo.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "logo.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.database.url.is_empty() != self.database.auth_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database".into(),
                reason: "url and auth_token must be set together".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stackfit").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = FitConfig::default();
        assert!(!config.database.is_remote());
        assert!(!config.logo.is_configured());
        assert_eq!(config.flags.cache_ttl_secs, 30);
        assert_eq!(config.versions.retention, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = FitConfig::figment();
        let config: FitConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.server.bind, "127.0.0.1:8787");
    }

    #[test]
    fn zero_retention_is_rejected() {
        let mut config = FitConfig::default();
        config.versions.retention = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("versions.retention"));
    }

    #[test]
    fn half_configured_remote_is_rejected() {
        let mut config = FitConfig::default();
        config.database.url = "libsql://x.turso.io".into();
        assert!(config.validate().is_err());
    }
}
