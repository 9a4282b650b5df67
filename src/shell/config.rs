// Runtime configuration read from the process environment.

use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BULK_CONCURRENCY: usize = 8;
pub const DEFAULT_MARK_RETRY_LIMIT: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Students processed at once by a bulk assignment request.
    pub bulk_concurrency: usize,
    /// Extra attempts after a version conflict while marking attendance.
    pub mark_retry_limit: usize,
    /// Load demo reference data and bearer tokens at startup.
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse(&lookup, "EXAM_BIND_ADDR", DEFAULT_BIND_ADDR.to_string(), |v| {
            v.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;
        let bulk_concurrency = parse(
            &lookup,
            "EXAM_BULK_CONCURRENCY",
            DEFAULT_BULK_CONCURRENCY.to_string(),
            |v| match v.parse::<usize>() {
                Ok(0) => Err("must be at least 1".to_string()),
                Ok(n) => Ok(n),
                Err(e) => Err(e.to_string()),
            },
        )?;
        let mark_retry_limit = parse(
            &lookup,
            "EXAM_MARK_RETRY_LIMIT",
            DEFAULT_MARK_RETRY_LIMIT.to_string(),
            |v| v.parse::<usize>().map_err(|e| e.to_string()),
        )?;
        let seed_demo = parse(&lookup, "EXAM_SEED_DEMO", "false".to_string(), |v| {
            match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                _ => Err("expected true or false".to_string()),
            }
        })?;

        Ok(Self {
            bind_addr,
            bulk_concurrency,
            mark_retry_limit,
            seed_demo,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            bulk_concurrency: DEFAULT_BULK_CONCURRENCY,
            mark_retry_limit: DEFAULT_MARK_RETRY_LIMIT,
            seed_demo: false,
        }
    }
}

fn parse<F, T, P>(lookup: &F, key: &'static str, default: String, parser: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    let value = lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default);
    parser(&value).map_err(|reason| ConfigError::Invalid { key, value, reason })
}
