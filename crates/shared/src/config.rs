//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Deposit guard configuration.
    #[serde(default)]
    pub deposit: DepositConfig,
    /// Aggregation report configuration.
    #[serde(default)]
    pub reports: ReportConfig,
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
    /// Seconds to wait for a pooled connection before failing.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whether sqlx statement logging is enabled.
    #[serde(default)]
    pub sqlx_logging: bool,
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

impl DatabaseConfig {
    /// Creates a configuration for `url` with default pool settings.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Deposit guard configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DepositConfig {
    /// Share of the outstanding unpaid total an account may deposit, in percent.
    #[serde(default = "default_cap_percent")]
    pub cap_percent: u8,
}

fn default_cap_percent() -> u8 {
    25
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            cap_percent: default_cap_percent(),
        }
    }
}

/// Aggregation report configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReportConfig {
    /// Row limit for the top-paying accounts report when the caller gives none.
    #[serde(default = "default_top_accounts_limit")]
    pub default_top_accounts_limit: u64,
}

fn default_top_accounts_limit() -> u64 {
    2
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_top_accounts_limit: default_top_accounts_limit(),
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
            .add_source(
                config::Environment::with_prefix("SETTLE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
