//! HTTP client for the restaurant/review API.
//!
//! The client is stateless and never retries; fallback and retry policy live
//! in [`crate::services::RestaurantDirectory`] and [`crate::sync`].

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{NewReview, Restaurant, Review};
use crate::util::{compact_text, is_http_url, trimmed_non_empty};

/// Header carrying the replay key of a pending review.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Remote operations the directory depends on
#[allow(async_fn_in_trait)]
pub trait RemoteApi {
    /// `GET /restaurants`
    async fn fetch_all(&self) -> Result<Vec<Restaurant>>;

    /// `GET /reviews?restaurant_id={id}`
    async fn fetch_reviews(&self, restaurant_id: i64) -> Result<Vec<Review>>;

    /// `POST /reviews`; the server echoes the created review with its id.
    async fn post_review(&self, review: &NewReview, idempotency_key: Option<&str>)
        -> Result<Review>;
}

/// `reqwest` implementation of [`RemoteApi`]
#[derive(Clone)]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    /// API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        read_json(ensure_success(response).await?).await
    }
}

impl RemoteApi for HttpRemote {
    async fn fetch_all(&self) -> Result<Vec<Restaurant>> {
        self.get_json(&format!("{}/restaurants", self.base_url))
            .await
    }

    async fn fetch_reviews(&self, restaurant_id: i64) -> Result<Vec<Review>> {
        self.get_json(&format!(
            "{}/reviews?restaurant_id={}",
            self.base_url,
            urlencoding::encode(&restaurant_id.to_string())
        ))
        .await
    }

    async fn post_review(
        &self,
        review: &NewReview,
        idempotency_key: Option<&str>,
    ) -> Result<Review> {
        let url = format!("{}/reviews", self.base_url);
        tracing::debug!("POST {url}");

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(review);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        read_json(ensure_success(request.send().await?).await?).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(url));
    }
    Err(Error::api(status.as_u16(), parse_api_error(status, &body)))
}

/// Decode a success body. A body that arrived but does not parse is a
/// `Serialization` error, not a network one: the request reached the server.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base_url = trimmed_non_empty(&raw)
        .ok_or_else(|| Error::InvalidInput("API base URL must not be empty".to_string()))?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}
