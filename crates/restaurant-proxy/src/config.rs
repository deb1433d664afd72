use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use restaurant_core::cache::CACHE_VERSION;
use restaurant_core::config::default_data_dir;
use restaurant_core::util::is_http_url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: String,
    pub upstream: String,
    pub cache_path: PathBuf,
    pub cache_version: u32,
    pub request_timeout: Duration,
    pub precache_fonts: bool,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "RESTAURANT_PROXY_BIND_ADDR", "127.0.0.1:8080");

        let upstream = value_or_default(&lookup, "RESTAURANT_PROXY_UPSTREAM", "http://localhost:8000")
            .trim_end_matches('/')
            .to_string();
        if !is_http_url(&upstream) {
            return Err(ConfigError::Invalid(
                "RESTAURANT_PROXY_UPSTREAM must start with http:// or https://".to_string(),
            ));
        }

        let cache_path = optional_trimmed(&lookup, "RESTAURANT_PROXY_CACHE_PATH")
            .map_or_else(|| default_data_dir().join("cache.db"), PathBuf::from);

        let cache_version = value_or_default(
            &lookup,
            "RESTAURANT_PROXY_CACHE_VERSION",
            &CACHE_VERSION.to_string(),
        )
        .parse::<u32>()
        .map_err(|_| {
            ConfigError::Invalid("RESTAURANT_PROXY_CACHE_VERSION must be a positive integer".to_string())
        })?;
        if cache_version == 0 {
            return Err(ConfigError::Invalid(
                "RESTAURANT_PROXY_CACHE_VERSION must be >= 1".to_string(),
            ));
        }

        let timeout_secs = value_or_default(&lookup, "RESTAURANT_PROXY_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "RESTAURANT_PROXY_TIMEOUT_SECS must be an integer in [1, 300]".to_string(),
                )
            })?;
        if !(1..=300).contains(&timeout_secs) {
            return Err(ConfigError::Invalid(
                "RESTAURANT_PROXY_TIMEOUT_SECS must be in [1, 300]".to_string(),
            ));
        }

        let precache_fonts = match optional_trimmed(&lookup, "RESTAURANT_PROXY_PRECACHE_FONTS")
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("0" | "false" | "no") => false,
            Some("1" | "true" | "yes") => true,
            Some(_) => {
                return Err(ConfigError::Invalid(
                    "RESTAURANT_PROXY_PRECACHE_FONTS must be true or false".to_string(),
                ))
            }
        };

        Ok(Self {
            bind_addr,
            upstream,
            cache_path,
            cache_version,
            request_timeout: Duration::from_secs(timeout_secs),
            precache_fonts,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ProxyConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        ProxyConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.upstream, "http://localhost:8000");
        assert_eq!(config.cache_version, CACHE_VERSION);
        assert!(config.cache_path.ends_with("cache.db"));
        assert!(!config.precache_fonts);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("RESTAURANT_PROXY_UPSTREAM", "https://static.example.com/"),
            ("RESTAURANT_PROXY_CACHE_PATH", "/var/cache/restaurants.db"),
            ("RESTAURANT_PROXY_CACHE_VERSION", "4"),
            ("RESTAURANT_PROXY_PRECACHE_FONTS", "TRUE"),
        ])
        .unwrap();
        assert_eq!(config.upstream, "https://static.example.com");
        assert_eq!(config.cache_path, PathBuf::from("/var/cache/restaurants.db"));
        assert_eq!(config.cache_version, 4);
        assert!(config.precache_fonts);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = config_from(&[("RESTAURANT_PROXY_UPSTREAM", "static.example.com")]).unwrap_err();
        assert!(err.to_string().contains("RESTAURANT_PROXY_UPSTREAM"));
        assert!(config_from(&[("RESTAURANT_PROXY_CACHE_VERSION", "0")]).is_err());
        assert!(config_from(&[("RESTAURANT_PROXY_TIMEOUT_SECS", "900")]).is_err());
        assert!(config_from(&[("RESTAURANT_PROXY_PRECACHE_FONTS", "maybe")]).is_err());
    }
}
