//! Small helpers shared by the remote client, the cache fetcher and config.

/// Longest API error body kept in an error message
const MAX_ERROR_TEXT: usize = 180;

/// Trimmed copy of `value`, or `None` when only whitespace remains.
pub fn trimmed_non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// True for absolute `http://` and `https://` URLs.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Error body from the API, trimmed and cut to a log-friendly length.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(MAX_ERROR_TEXT).collect()
}

/// Now as Unix milliseconds; pending review ids and cache entries use it.
pub fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
