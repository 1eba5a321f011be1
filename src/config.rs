use std::fmt;
use tracing::{debug, warn};

use crate::shared::AppError;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Signing settings for bearer tokens
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSettings {
    pub key: String,
    pub issuer: String,
    pub audience: String,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Application configuration, loaded once at startup and never mutated
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt: JwtSettings,
    /// PostgreSQL connection string; the in-memory database is used when absent
    pub database_url: Option<String>,
    pub bind_address: String,
}

impl AppConfig {
    /// Reads the configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    warn!(variable = name, "Required configuration variable missing");
                    AppError::ConfigurationError(format!("{} must be set", name))
                })
        };

        let jwt = JwtSettings {
            key: required("JWT_KEY")?,
            issuer: required("JWT_ISSUER")?,
            audience: required("JWT_AUDIENCE")?,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let bind_address =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        debug!(
            issuer = %jwt.issuer,
            audience = %jwt.audience,
            has_database_url = database_url.is_some(),
            bind_address = %bind_address,
            "Configuration loaded"
        );

        Ok(Self {
            jwt,
            database_url,
            bind_address,
        })
    }
}
