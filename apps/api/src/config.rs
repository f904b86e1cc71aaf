//! API server configuration.
//!
//! Loaded with the `config` crate: built-in defaults, then an optional
//! `stocky.toml` in the working directory, then `STOCKY_*` environment
//! variables (nested keys use a double underscore, e.g. `STOCKY_SMTP__HOST`).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

const DEV_ACCESS_SECRET: &str = "dev-access-secret";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Secret for signing access tokens
    pub jwt_access_secret: String,

    /// Secret for signing refresh tokens
    pub jwt_refresh_secret: String,

    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: i64,

    /// Outgoing mail. Mail is disabled when no host is set.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// SMTP settings for order notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS (port 465) instead of STARTTLS.
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_from")]
    pub from: String,
}

fn default_from() -> String {
    "no-reply@stocky.local".to_string()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        SmtpConfig {
            host: None,
            port: None,
            username: None,
            password: None,
            secure: false,
            from: default_from(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: 5000,
            database_path: "stocky.db".to_string(),
            jwt_access_secret: DEV_ACCESS_SECRET.to_string(),
            jwt_refresh_secret: DEV_REFRESH_SECRET.to_string(),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 604_800,
            smtp: SmtpConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from defaults, `stocky.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config: ApiConfig = Config::builder()
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("jwt_access_secret", defaults.jwt_access_secret)?
            .set_default("jwt_refresh_secret", defaults.jwt_refresh_secret)?
            .set_default("access_token_ttl_secs", defaults.access_token_ttl_secs)?
            .set_default("refresh_token_ttl_secs", defaults.refresh_token_ttl_secs)?
            .set_default("smtp.secure", false)?
            .set_default("smtp.from", defaults.smtp.from)?
            .add_source(File::with_name("stocky").required(false))
            .add_source(
                Environment::with_prefix("STOCKY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_access_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_access_secret".to_string()));
        }
        if self.jwt_refresh_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_refresh_secret".to_string()));
        }
        if self.access_token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("access_token_ttl_secs".to_string()));
        }
        if self.refresh_token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("refresh_token_ttl_secs".to_string()));
        }
        if self.jwt_access_secret == self.jwt_refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        Ok(())
    }

    /// True while either JWT secret is still the built-in development value.
    pub fn uses_dev_secrets(&self) -> bool {
        self.jwt_access_secret == DEV_ACCESS_SECRET || self.jwt_refresh_secret == DEV_REFRESH_SECRET
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Access and refresh tokens must be signed with different secrets")]
    SharedSecret,

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.uses_dev_secrets());
        assert_eq!(config.port, 5000);
        assert_eq!(config.smtp.from, "no-reply@stocky.local");
        assert!(config.smtp.host.is_none());
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.jwt_refresh_secret = config.jwt_access_secret.clone();
        assert!(matches!(config.validate(), Err(ConfigError::SharedSecret)));

        let mut config = ApiConfig::default();
        config.access_token_ttl_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = ApiConfig::default();
        config.jwt_access_secret = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));
    }
}
