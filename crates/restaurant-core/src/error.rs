//! Error types for restaurant-core

use thiserror::Error;

/// Result type alias using restaurant-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in restaurant-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failure (unreachable host, timeout, bad body)
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-success status
    #[error("API error: {message}")]
    Api { status: u16, message: String },

    /// The host has no persistent local store
    #[error("Local store unavailable: {0}")]
    LocalStoreUnavailable(String),

    /// Local store open or transaction failure
    #[error("Local store error: {0}")]
    LocalStore(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// A record with the same key already exists
    #[error("Duplicate id: {0}")]
    DuplicateId(i64),

    /// No record matches the requested id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Both the remote API and the local store failed
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Non-success API answer with its HTTP status.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the API could not be reached or failed on its side
    /// (transport errors and 5xx statuses).
    pub const fn is_network(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// True when the API answered and refused the request (4xx).
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status < 500)
    }

    /// True for failures of the local persistent store.
    pub const fn is_local_store(&self) -> bool {
        matches!(
            self,
            Self::LocalStoreUnavailable(_) | Self::LocalStore(_) | Self::LibSql(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_network_and_store_errors() {
        assert!(Error::api(500, "HTTP 500").is_network());
        assert!(!Error::api(500, "HTTP 500").is_local_store());
        assert!(Error::LocalStoreUnavailable("none".to_string()).is_local_store());
        assert!(Error::LocalStore("locked".to_string()).is_local_store());
        assert!(!Error::NotFound("5".to_string()).is_network());
    }

    #[test]
    fn client_errors_are_rejections_not_outages() {
        let rejected = Error::api(422, "rating is required (422)");
        assert!(rejected.is_rejection());
        assert!(!rejected.is_network());
        assert!(!Error::api(503, "HTTP 503").is_rejection());

        let decode = serde_json::from_str::<i64>("{").unwrap_err();
        assert!(!Error::from(decode).is_network());
    }
}
