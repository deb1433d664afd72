//! Network side of the offline cache

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use super::{CacheRequest, CachedResponse};
use crate::error::{Error, Result};
use crate::util::{is_http_url, trimmed_non_empty};

/// Performs a request against the network.
///
/// Any HTTP status is a response; only transport failures are errors.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse>;
}

/// `reqwest` fetcher resolving relative requests against one origin
#[derive(Clone)]
pub struct HttpFetcher {
    origin: String,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(origin: impl Into<String>, timeout: Duration) -> Result<Self> {
        let origin: String = origin.into();
        let origin = trimmed_non_empty(&origin)
            .filter(|origin| is_http_url(origin))
            .ok_or_else(|| {
                Error::InvalidInput("upstream origin must include http:// or https://".to_string())
            })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn url_for(&self, path_and_query: &str) -> String {
        if is_http_url(path_and_query) {
            path_and_query.to_string()
        } else {
            format!("{}{}", self.origin, path_and_query)
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method {}", request.method)))?;
        let url = self.url_for(&request.path_and_query);
        tracing::debug!("{method} {url}");

        let mut builder = self.client.request(method, &url);
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?.to_vec();

        Ok(CachedResponse {
            status,
            content_type,
            body,
        })
    }
}
