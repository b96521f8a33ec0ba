//! Application configuration loaded from environment variables.
//!
//! Credentials are read once at startup and held in memory; nothing re-reads
//! the environment per request.

use std::env;

/// Application configuration, loaded once at startup and passed by reference
/// into the webhook routes and sync engine. There is no process-wide global.
#[derive(Debug, Clone)]
pub struct Config {
    /// RevenueCat V1 secret API key (bearer credential for subscriber fetches)
    pub rc_api_key: String,
    /// RevenueCat project ID
    pub rc_project_id: String,
    /// Shared secret expected in the webhook `Authorization` header
    pub webhook_token: String,
    /// Base URL of the RevenueCat V1 API (overridable for tests)
    pub rc_api_url: String,
    /// Path of the SQLite database file
    pub database_path: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A missing credential is a startup-time fatal condition; the server
    /// must not begin serving without the full set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            rc_api_key: env::var("RC_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("RC_API_KEY"))?,
            rc_project_id: env::var("RC_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("RC_PROJECT_ID"))?,
            webhook_token: env::var("WEBHOOK_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WEBHOOK_TOKEN"))?,
            rc_api_url: env::var("RC_API_URL")
                .unwrap_or_else(|_| "https://api.revenuecat.com/v1".to_string()),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "entitlements.sqlite".to_string()),
            // A PORT that is set but unparsable is a misconfiguration, not
            // something to paper over with the default.
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            rc_api_key: "sk_test_key".to_string(),
            rc_project_id: "test-project".to_string(),
            webhook_token: "test_webhook_token".to_string(),
            rc_api_url: "http://127.0.0.1:9/v1".to_string(),
            database_path: ":memory:".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Process environment is shared across test threads.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_required_vars() {
        env::set_var("RC_API_KEY", "sk_test_abc");
        env::set_var("RC_PROJECT_ID", "proj123");
        env::set_var("WEBHOOK_TOKEN", "hook_secret");
    }

    #[test]
    fn test_config_from_env() {
        let _env = ENV_LOCK.lock().unwrap();
        set_required_vars();
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.rc_api_key, "sk_test_abc");
        assert_eq!(config.rc_project_id, "proj123");
        assert_eq!(config.webhook_token, "hook_secret");
        assert_eq!(config.rc_api_url, "https://api.revenuecat.com/v1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_fatal() {
        let _env = ENV_LOCK.lock().unwrap();
        set_required_vars();
        env::set_var("PORT", "not-a-port");

        let err = Config::from_env().expect_err("Config should reject bad PORT");
        assert!(matches!(err, ConfigError::Invalid("PORT")));

        env::remove_var("PORT");
    }
}
