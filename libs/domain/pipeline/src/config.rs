use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value {value:?}: expected {expected}")]
    Invalid { name: &'static str, value: String, expected: &'static str },
}

/// Every environment-driven knob the indexer recognizes. Loaded once at
/// startup via [`Config::from_env`] and handed down to the supervisor.
#[derive(Debug, Clone)]
pub struct Config {
    pub coordination_url: String,
    pub database_url: String,
    pub rpc_url: String,
    pub batch_size: u64,
    pub lease_ttl: Duration,
    pub min_block: u64,
    pub rpc_calls_per_sec: u32,
    pub max_retries: u32,
    pub worker_count: u32,
    pub max_blocks_concurrent: usize,
    pub store_pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            coordination_url: required("COORDINATION_URL")?,
            database_url: required("DATABASE_URL")?,
            rpc_url: required("RPC_URL")?,
            batch_size: parse_or("BATCH_SIZE", 20)?,
            lease_ttl: Duration::from_secs(parse_or("LEASE_TTL_SECONDS", 300)?),
            min_block: parse_or("MIN_BLOCK_NUMBER", 0)?,
            rpc_calls_per_sec: parse_or("RPC_CALLS_PER_SEC", 50)?,
            max_retries: parse_or("MAX_RETRIES", 5)?,
            worker_count: parse_or("INDEXER_COUNT", 4)?,
            max_blocks_concurrent: parse_or("MAX_BLOCKS_CONCURRENT", 10)?,
            store_pool_size: parse_or("STORE_POOL_SIZE", 8)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected: std::any::type_name::<T>(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_variable_is_reported_by_name() {
        std::env::remove_var("RPC_URL_TEST_SENTINEL_DOES_NOT_EXIST");
        let err = required("RPC_URL_TEST_SENTINEL_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RPC_URL_TEST_SENTINEL_DOES_NOT_EXIST")));
    }

    #[test]
    fn parse_or_falls_back_to_default_when_unset() {
        std::env::remove_var("CHAINIDX_TEST_BATCH_SIZE");
        let value: u64 = parse_or("CHAINIDX_TEST_BATCH_SIZE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
