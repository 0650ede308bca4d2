//! Environment configuration for the service

use std::time::Duration;
use tracing::warn;

const DEFAULT_DB_PATH: &str = "data/broker.db";
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Settings read from the environment (after `.env` is loaded)
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `BROKER_DB_PATH`
    pub db_path: String,
    /// `CHANNEL_CACHE_TTL_SECS`
    pub cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("BROKER_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let cache_ttl_secs = match lookup("CHANNEL_CACHE_TTL_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid CHANNEL_CACHE_TTL_SECS, using default");
                DEFAULT_CACHE_TTL_SECS
            }),
            None => DEFAULT_CACHE_TTL_SECS,
        };

        Self {
            db_path,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.db_path, "data/broker.db");
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BROKER_DB_PATH", "/srv/ledger.db"),
            ("CHANNEL_CACHE_TTL_SECS", "120"),
        ]);
        assert_eq!(config.db_path, "/srv/ledger.db");
        assert_eq!(config.cache_ttl, Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_ttl_falls_back() {
        let config = config_from(&[("CHANNEL_CACHE_TTL_SECS", "an hour")]);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }
}
