//! Configuration management for the shop ledger
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with SHOP__ prefix

use chrono::FixedOffset;
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{ReportMode, DEFAULT_UTC_OFFSET_HOURS};

use crate::error::{AppError, AppResult};
use crate::services::finance::RestockPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Durable store configuration
    pub storage: StorageConfig,

    /// Reconciliation report defaults
    pub report: ReportConfig,

    pub finance: FinanceConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per account
    pub data_dir: String,

    /// Account opened by the CLI
    pub account_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Revenue recognition mode used when the caller does not choose one
    pub mode: ReportMode,

    /// Offset of the shop's local clock from UTC, in hours
    pub utc_offset_hours: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceConfig {
    /// Whether deleting a material purchase takes its restock back out
    pub restock_policy: RestockPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON log lines
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SHOP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.account_id", "default")?
            .set_default("report.mode", "order_based")?
            .set_default("report.utc_offset_hours", DEFAULT_UTC_OFFSET_HOURS)?
            .set_default("finance.restock_policy", "final")?
            .set_default("logging.filter", "shop_ledger=info")?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SHOP__ prefix)
            .add_source(
                Environment::with_prefix("SHOP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Shop-local clock used to bucket orders into calendar days
    pub fn shop_offset(&self) -> AppResult<FixedOffset> {
        self.report.shop_offset()
    }
}

impl ReportConfig {
    pub fn shop_offset(&self) -> AppResult<FixedOffset> {
        shared::shop_offset(self.utc_offset_hours).ok_or_else(|| {
            AppError::Configuration(format!(
                "report.utc_offset_hours out of range: {}",
                self.utc_offset_hours
            ))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            storage: StorageConfig::default(),
            report: ReportConfig::default(),
            finance: FinanceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            account_id: "default".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::OrderBased,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            restock_policy: RestockPolicy::Final,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "shop_ledger=info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offset_is_indochina_time() {
        let offset = Config::default().shop_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_out_of_range_offset_rejected() {
        let report = ReportConfig {
            utc_offset_hours: 30,
            ..Default::default()
        };
        assert!(matches!(report.shop_offset(), Err(AppError::Configuration(_))));

        let huge = ReportConfig {
            utc_offset_hours: i32::MAX,
            ..Default::default()
        };
        assert!(matches!(huge.shop_offset(), Err(AppError::Configuration(_))));
    }
}
