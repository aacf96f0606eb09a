//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port (default: 3000)
//! - `SHOP_CATALOG_PATH` - Product catalog JSON file
//!   (default: crates/storefront/data/products.json)
//! - `SHOP_DATA_DIR` - Directory holding the persisted cart snapshot
//!   (default: .powerlabs)
//! - `SHOP_CONTINUE_DELAY_MS` - Delay before returning to the catalog after a
//!   completed checkout (default: 700)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_CATALOG_PATH: &str = "crates/storefront/data/products.json";
const DEFAULT_DATA_DIR: &str = ".powerlabs";
const DEFAULT_CONTINUE_DELAY_MS: u64 = 700;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Product catalog file, read once at startup
    pub catalog_path: PathBuf,
    /// Directory for the cart snapshot
    pub data_dir: PathBuf,
    /// Cosmetic delay before navigating back to the catalog after checkout
    pub continue_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHOP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_PORT".to_string(), e.to_string()))?;
        let continue_delay = parse_delay_ms(
            "SHOP_CONTINUE_DELAY_MS",
            &get_env_or_default(
                "SHOP_CONTINUE_DELAY_MS",
                &DEFAULT_CONTINUE_DELAY_MS.to_string(),
            ),
        )?;

        Ok(Self {
            host,
            port,
            catalog_path: get_path_or_default("SHOP_CATALOG_PATH", DEFAULT_CATALOG_PATH)?,
            data_dir: get_path_or_default("SHOP_DATA_DIR", DEFAULT_DATA_DIR)?,
            continue_delay,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and local tooling: loopback, ephemeral port,
    /// and the given catalog and data paths.
    #[must_use]
    pub fn local(catalog_path: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            catalog_path: catalog_path.into(),
            data_dir: data_dir.into(),
            continue_delay: Duration::from_millis(DEFAULT_CONTINUE_DELAY_MS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a path from the environment, rejecting a variable set to blank.
fn get_path_or_default(key: &str, default: &str) -> Result<PathBuf, ConfigError> {
    let value = get_env_or_default(key, default);
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "path cannot be empty".to_string(),
        ));
    }
    Ok(PathBuf::from(value))
}

/// Parse a millisecond delay.
fn parse_delay_ms(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delay_ms() {
        assert_eq!(
            parse_delay_ms("TEST_DELAY", "700").unwrap(),
            Duration::from_millis(700)
        );
        assert_eq!(
            parse_delay_ms("TEST_DELAY", " 0 ").unwrap(),
            Duration::ZERO
        );
    }

    #[test]
    fn test_parse_delay_ms_invalid() {
        let err = parse_delay_ms("TEST_DELAY", "soon").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "TEST_DELAY"));
    }

    #[test]
    fn test_local_config() {
        let config = ShopConfig::local("catalog.json", "/tmp/shop");

        assert_eq!(config.catalog_path, PathBuf::from("catalog.json"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(config.continue_delay, Duration::from_millis(700));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let mut config = ShopConfig::local("catalog.json", "data");
        config.port = 3000;

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
