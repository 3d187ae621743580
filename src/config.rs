use chrono::Duration as ChronoDuration;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ACCESS_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 7;
// Upper bound for either token lifetime
const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, loaded once at startup
#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub store_timeout: Duration,
    pub access_token_ttl: ChronoDuration,
    pub refresh_token_ttl: ChronoDuration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("bind_addr", &self.bind_addr)
            .field("store_timeout", &self.store_timeout)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

impl Config {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from any key lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let store_timeout_secs: u64 =
            parse_or(&lookup, "STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)?;
        let access_token_ttl = parse_ttl(
            &lookup,
            "ACCESS_TOKEN_TTL_HOURS",
            DEFAULT_ACCESS_TOKEN_TTL_HOURS,
            ChronoDuration::try_hours,
        )?;
        let refresh_token_ttl = parse_ttl(
            &lookup,
            "REFRESH_TOKEN_TTL_DAYS",
            DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            ChronoDuration::try_days,
        )?;

        Ok(Self {
            jwt_secret,
            database_url,
            bind_addr,
            store_timeout: Duration::from_secs(store_timeout_secs),
            access_token_ttl,
            refresh_token_ttl,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// Token lifetimes must be positive and at most MAX_TOKEN_TTL_DAYS
fn parse_ttl<F>(
    lookup: &F,
    name: &'static str,
    default: i64,
    to_duration: fn(i64) -> Option<ChronoDuration>,
) -> Result<ChronoDuration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount: i64 = parse_or(lookup, name, default)?;
    let invalid = || ConfigError::Invalid {
        name,
        value: amount.to_string(),
    };

    let max = ChronoDuration::try_days(MAX_TOKEN_TTL_DAYS).ok_or_else(invalid)?;
    match to_duration(amount) {
        Some(ttl) if ttl > ChronoDuration::zero() && ttl <= max => Ok(ttl),
        _ => Err(invalid()),
    }
}
