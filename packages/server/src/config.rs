use std::str::FromStr;

use actors::PoolConfig;
use delivery::DeliveryConfig;
use dispatch::DispatchConfig;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    pub dispatch: DispatchConfig,
    pub pool: PoolConfig,
    pub delivery: DeliveryConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                       | Default   |
    /// |-------------------------------|-----------|
    /// | `HOST`                        | `0.0.0.0` |
    /// | `PORT`                        | `8080`    |
    /// | `DISPATCH_CAPACITY`           | `0`       |
    /// | `DISPATCH_RELEASE_ON_TIMEOUT` | `true`    |
    /// | `WORKER_TIMEOUT_SECS`         | `300`     |
    /// | `DELIVERY_LIMIT`              | `0`       |
    /// | `DELIVERY_TIMEOUT_SECS`       | `10`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse(&lookup, "PORT", "u16", 8080)?;

        let capacity = parse(&lookup, "DISPATCH_CAPACITY", "usize", 0)?;
        let release_on_timeout = parse(&lookup, "DISPATCH_RELEASE_ON_TIMEOUT", "bool", true)?;
        let dispatch =
            DispatchConfig::with_capacity(capacity).release_on_timeout(release_on_timeout);

        let pool = PoolConfig::with_timeout(parse(&lookup, "WORKER_TIMEOUT_SECS", "u64", 300)?);

        let delivery = DeliveryConfig {
            timeout_secs: parse(&lookup, "DELIVERY_TIMEOUT_SECS", "u64", 10)?,
            limit: parse(&lookup, "DELIVERY_LIMIT", "usize", 0)?,
        };

        Ok(Self {
            host,
            port,
            dispatch,
            pool,
            delivery,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<F, T>(
    lookup: &F,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
    }
}
