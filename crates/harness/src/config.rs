//! Harness configuration
//!
//! Explicit config values passed into each sweep; overridable from
//! `WEBCHECK_*` environment variables. Nothing here is global state.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one sweep against a target application
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the application under test
    pub base_url: String,

    /// Login credentials for the application's HTML login form
    pub credentials: Credentials,

    /// Path to the application's SQLite database (read-only verification)
    pub db_path: PathBuf,

    /// WebDriver server to spawn and drive
    pub driver: DriverConfig,

    /// Bound for every element/page wait
    pub wait_timeout: Duration,

    /// Output directory for the results artifact
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Configuration for spawning the WebDriver server
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Path to the driver binary (chromedriver, geckodriver)
    pub binary_path: PathBuf,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for driver startup
    pub startup_timeout: Duration,

    /// Run the browser headless
    pub headless: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("chromedriver"),
            port: None,
            startup_timeout: Duration::from_secs(15),
            headless: true,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            credentials: Credentials {
                username: "Admin".to_string(),
                password: "admin".to_string(),
            },
            db_path: PathBuf::from("app.db"),
            driver: DriverConfig::default(),
            wait_timeout: Duration::from_secs(10),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl HarnessConfig {
    /// Build a config from `WEBCHECK_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("WEBCHECK_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(user) = std::env::var("WEBCHECK_USER") {
            config.credentials.username = user;
        }
        if let Ok(pass) = std::env::var("WEBCHECK_PASSWORD") {
            config.credentials.password = pass;
        }
        if let Ok(db) = std::env::var("WEBCHECK_DB_PATH") {
            config.db_path = PathBuf::from(db);
        }
        if let Ok(driver) = std::env::var("WEBCHECK_DRIVER_BIN") {
            config.driver.binary_path = PathBuf::from(driver);
        }
        if let Ok(port) = std::env::var("WEBCHECK_DRIVER_PORT") {
            config.driver.port = port.parse().ok();
        }
        if let Ok(secs) = std::env::var("WEBCHECK_WAIT_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.wait_timeout = Duration::from_secs(secs);
            }
        }
        if let Ok(out) = std::env::var("WEBCHECK_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(out);
        }

        config
    }

    /// Whether a target application has been configured for this process.
    ///
    /// The sweep binary skips (exit 0) when this is false so that plain
    /// `cargo test` stays hermetic on machines without a running target.
    pub fn target_configured() -> bool {
        std::env::var("WEBCHECK_BASE_URL").is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = HarnessConfig::default();
        assert!(config.base_url.starts_with("http://"));
        assert_eq!(config.wait_timeout, Duration::from_secs(10));
        assert!(config.driver.headless);
    }
}
