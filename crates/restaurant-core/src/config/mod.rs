//! Client configuration read from the environment.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::is_http_url;

pub const API_URL_VAR: &str = "RESTAURANTS_API_URL";
pub const HTTP_TIMEOUT_VAR: &str = "RESTAURANTS_HTTP_TIMEOUT_SECS";
pub const DATA_DIR_VAR: &str = "RESTAURANTS_DATA_DIR";

pub const DEFAULT_API_URL: &str = "http://localhost:1337";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

const APP_DIR: &str = "restaurants";
const DATABASE_FILE: &str = "restaurants.db";
const LOCAL_STORAGE_FILE: &str = "local-storage.json";
const CACHE_FILE: &str = "cache.db";

/// Where the client talks to and where it keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            data_dir: default_data_dir(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base_url = value_or_default(&lookup, API_URL_VAR, DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();
        if !is_http_url(&api_base_url) {
            return Err(Error::Config(format!(
                "{API_URL_VAR} must start with http:// or https://"
            )));
        }

        let timeout_secs = value_or_default(
            &lookup,
            HTTP_TIMEOUT_VAR,
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{HTTP_TIMEOUT_VAR} must be an integer in [1, 300]")))?;
        if !(1..=300).contains(&timeout_secs) {
            return Err(Error::Config(format!(
                "{HTTP_TIMEOUT_VAR} must be in [1, 300]"
            )));
        }

        let data_dir =
            optional_trimmed(&lookup, DATA_DIR_VAR).map_or_else(default_data_dir, PathBuf::from);

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            data_dir,
        })
    }

    /// Local store database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Simple storage file holding favorites.
    pub fn local_storage_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_STORAGE_FILE)
    }

    /// Offline response cache database file.
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE)
    }
}

/// Platform data directory for the app, falling back to the working directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
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
