use std::net::SocketAddr;

use vf_search::DEFAULT_SEED;
use vf_types::{config_error, VfResult};

pub const ADDR_ENV: &str = "VOLTFORGE_ADDR";
pub const SEED_ENV: &str = "VOLTFORGE_SEED";
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime settings of the request layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub addr: SocketAddr,
    /// Seed used by `/search/optimize` when the request names none.
    pub seed: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            seed: DEFAULT_SEED,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> VfResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> VfResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(addr) = lookup(ADDR_ENV) {
            config.addr = addr
                .trim()
                .parse()
                .map_err(|e| config_error!("{ADDR_ENV}={addr:?} is not a socket address: {e}"))?;
        }
        if let Some(seed) = lookup(SEED_ENV) {
            config.seed = seed
                .trim()
                .parse()
                .map_err(|e| config_error!("{SEED_ENV}={seed:?} is not a u64: {e}"))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn reads_overrides() {
        let config =
            ServiceConfig::from_lookup(lookup(&[(ADDR_ENV, "127.0.0.1:9000"), (SEED_ENV, " 7 ")]))
                .unwrap();
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 9000)));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = ServiceConfig::from_lookup(lookup(&[(SEED_ENV, "many")])).unwrap_err();
        assert!(matches!(err, vf_types::VfError::Config(_)));
        assert!(ServiceConfig::from_lookup(lookup(&[(ADDR_ENV, "  ")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup(&[(ADDR_ENV, "localhost")])).is_err());
    }
}
