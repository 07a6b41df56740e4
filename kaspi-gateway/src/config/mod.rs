//! Gateway configuration.
//!
//! Listener and observability settings come from [`kaspi_core::config::Config`]
//! (`APP__*`). Provider and deployment settings are read here:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `KASPI_BASE_URL` | required |
//! | `KASPI_API_KEY` | required |
//! | `KASPI_TIMEOUT_SECONDS` | 30 |
//! | `KASPI_MAX_CONCURRENT_REQUESTS` | 64 |
//! | `KASPI_POOL_MAX_IDLE_PER_HOST` | 32 |
//! | `GATEWAY_TIER` | basic |
//! | `MONGODB_URI` / `MONGODB_DATABASE` | unset (in-memory device store) |

use std::str::FromStr;
use std::time::Duration;

use kaspi_core::config::Config as ServerConfig;
use kaspi_core::CapabilityTier;
use reqwest::Url;
use secrecy::Secret;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 64;
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to load server settings: {0}")]
    Server(#[from] config::ConfigError),
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub kaspi: KaspiConfig,
    pub tier: CapabilityTier,
    pub database: Option<DatabaseConfig>,
}

#[derive(Clone, Debug)]
pub struct KaspiConfig {
    /// Always ends with `/` so relative paths join under it.
    pub base_url: Url,
    pub api_key: Secret<String>,
    pub timeout: Duration,
    pub max_concurrent_requests: usize,
    pub pool_max_idle_per_host: usize,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub uri: Secret<String>,
    pub name: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let server = ServerConfig::load()?;
        Self::from_lookup(server, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(server: ServerConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = var("KASPI_BASE_URL").ok_or(ConfigError::Missing("KASPI_BASE_URL"))?;
        let base_url = parse_base_url(&base_url)?;

        let api_key = var("KASPI_API_KEY").ok_or(ConfigError::Missing("KASPI_API_KEY"))?;
        if reqwest::header::HeaderValue::from_str(&api_key).is_err() {
            return Err(ConfigError::Invalid {
                key: "KASPI_API_KEY",
                value: "<redacted>".to_string(),
                reason: "not a valid header value".to_string(),
            });
        }

        let timeout_seconds = parse_or(
            "KASPI_TIMEOUT_SECONDS",
            var("KASPI_TIMEOUT_SECONDS"),
            DEFAULT_TIMEOUT_SECONDS,
        )?;
        let max_concurrent_requests = parse_or(
            "KASPI_MAX_CONCURRENT_REQUESTS",
            var("KASPI_MAX_CONCURRENT_REQUESTS"),
            DEFAULT_MAX_CONCURRENT_REQUESTS,
        )?;
        let pool_max_idle_per_host = parse_or(
            "KASPI_POOL_MAX_IDLE_PER_HOST",
            var("KASPI_POOL_MAX_IDLE_PER_HOST"),
            DEFAULT_POOL_MAX_IDLE_PER_HOST,
        )?;
        if timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "KASPI_TIMEOUT_SECONDS",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid {
                key: "KASPI_MAX_CONCURRENT_REQUESTS",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let tier = parse_or("GATEWAY_TIER", var("GATEWAY_TIER"), CapabilityTier::Basic)?;

        let database = match (var("MONGODB_URI"), var("MONGODB_DATABASE")) {
            (Some(uri), Some(name)) => Some(DatabaseConfig {
                uri: Secret::new(uri),
                name,
            }),
            (Some(_), None) => return Err(ConfigError::Missing("MONGODB_DATABASE")),
            (None, Some(_)) => return Err(ConfigError::Missing("MONGODB_URI")),
            (None, None) => None,
        };

        Ok(Self {
            server,
            kaspi: KaspiConfig {
                base_url,
                api_key: Secret::new(api_key),
                timeout: Duration::from_secs(timeout_seconds),
                max_concurrent_requests,
                pool_max_idle_per_host,
            },
            tier,
            database,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "KASPI_BASE_URL",
        value: raw.to_string(),
        reason,
    };

    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https".to_string()));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
