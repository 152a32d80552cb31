//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Currency conversion configuration.
    #[serde(default)]
    pub currency: CurrencyConfig,
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
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Currency conversion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// How long cached exchange rates stay valid, in seconds.
    #[serde(default = "default_rate_cache_ttl")]
    pub rate_cache_ttl_secs: u64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            rate_cache_ttl_secs: default_rate_cache_ttl(),
        }
    }
}

fn default_rate_cache_ttl() -> u64 {
    3600 // 1 hour
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
            .add_source(config::Environment::with_prefix("CLAIMFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("CLAIMFLOW__DATABASE__URL", Some("postgres://localhost/cf")),
                ("CLAIMFLOW__DATABASE__MAX_CONNECTIONS", Some("5")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/cf");
                assert_eq!(config.database.max_connections, 5);
                assert_eq!(config.database.min_connections, 1);
            },
        );
    }

    #[test]
    fn test_currency_defaults() {
        temp_env::with_vars(
            [("CLAIMFLOW__DATABASE__URL", Some("postgres://localhost/cf"))],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.currency.rate_cache_ttl_secs, 3600);
            },
        );
    }

    #[test]
    fn test_currency_ttl_override() {
        temp_env::with_vars(
            [
                ("CLAIMFLOW__DATABASE__URL", Some("postgres://localhost/cf")),
                ("CLAIMFLOW__CURRENCY__RATE_CACHE_TTL_SECS", Some("60")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.currency.rate_cache_ttl_secs, 60);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars_unset(["CLAIMFLOW__DATABASE__URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }
}
