//! Configuration loading and representation.
//!
//! Every setting comes from the process environment with a default; a value
//! that is present but unparseable is a startup error.

use std::net::SocketAddr;

use airhouse_observability::LogFormat;
use thiserror::Error;

pub const DEFAULT_LOW_QUANTITY: i64 = 5;
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 720;
/// One year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Items at or below this quantity are reported as low stock.
    pub low_quantity: i64,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            low_quantity: DEFAULT_LOW_QUANTITY,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            use_persistent_stores: false,
            database_url: None,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let bind_addr = parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?;
        let low_quantity = parse_or(&lookup, "LOW_QUANTITY", DEFAULT_LOW_QUANTITY)?;
        let token_ttl_minutes = parse_or(&lookup, "TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        let use_persistent_stores = parse_or(&lookup, "USE_PERSISTENT_STORES", false)?;
        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::Json)?;

        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            return Err(ConfigError::Invalid {
                var: "TOKEN_TTL_MINUTES",
                value: token_ttl_minutes.to_string(),
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_MINUTES}"),
            });
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            bind_addr,
            low_quantity,
            jwt_secret,
            token_ttl_minutes,
            use_persistent_stores,
            database_url,
            log_format,
        })
    }

    /// True when no `JWT_SECRET` was supplied.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
