//! Configuration management for the NeuroLift client
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: NL__)

use anyhow::Result;
use neurolift_shared::{MergePolicy, WeightUnit};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub storage: StorageConfig,
    #[validate(nested)]
    pub remote: RemoteConfig,
    #[validate(nested)]
    pub sync: SyncConfig,
    #[serde(default)]
    #[validate(nested)]
    pub training: TrainingConfig,
}

/// Local database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StorageConfig {
    pub database_url: String,
    #[validate(range(min = 1, max = 64))]
    pub max_connections: u32,
}

/// Remote document store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Account the documents live under; sync is skipped without one
    #[serde(default)]
    pub user_id: Option<String>,
    /// Bearer token; never logged or printed
    #[serde(default)]
    pub api_key: Option<String>,
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

/// Background sync configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    pub enabled: bool,
    #[validate(range(min = 5, max = 86400))]
    pub interval_secs: u64,
    #[serde(default)]
    pub policy: MergePolicy,
}

/// Training defaults
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrainingConfig {
    pub weight_unit: WeightUnit,
    #[validate(range(min = 1, max = 86400))]
    pub rest_seconds: u64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub bar_weight: f64,
    #[validate(range(min = 0.25, max = 50.0))]
    pub overload_increment: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::Kg,
            rest_seconds: 90,
            bar_weight: 20.0,
            overload_increment: 2.5,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                database_url: "sqlite://neurolift.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            remote: RemoteConfig {
                base_url: "http://localhost:8787".to_string(),
                user_id: None,
                api_key: None,
                timeout_secs: 15,
            },
            sync: SyncConfig {
                enabled: true,
                interval_secs: 300, // 5 minutes
                policy: MergePolicy::LastWriteWins,
            },
            training: TrainingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with NL__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (NL__ prefix)
            // e.g., NL__REMOTE__USER_ID=abc sets remote.user_id
            .add_source(config::Environment::with_prefix("NL").separator("__"))
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Range checks plus the rules ranges cannot express
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let url = self.remote.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("remote.base_url must be an http(s) URL, got '{}'", url);
        }
        if self.storage.database_url.trim().is_empty() {
            anyhow::bail!("storage.database_url cannot be empty");
        }
        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// True when sync has somewhere to go
    pub fn sync_configured(&self) -> bool {
        self.sync.enabled
            && self
                .remote
                .user_id
                .as_deref()
                .is_some_and(|id| !id.trim().is_empty())
    }

    /// Effective configuration as TOML with secrets masked
    pub fn to_toml(&self) -> Result<String> {
        let mut printable = self.clone();
        if printable.remote.api_key.is_some() {
            printable.remote.api_key = Some("********".to_string());
        }
        Ok(toml::to_string_pretty(&printable)?)
    }
}
