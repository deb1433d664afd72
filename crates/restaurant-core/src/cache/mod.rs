//! Offline response cache at the network boundary.
//!
//! Static assets are pre-fetched into a version-tagged bucket at install
//! time. Afterwards every GET is answered cache-first, except review data,
//! which always goes to the network, and restaurant detail pages, which all
//! share one cached page shell whatever their query string.

mod bucket;
mod fetch;

pub use bucket::{bucket_name, CacheBucket};
pub use fetch::{Fetcher, HttpFetcher};

use crate::error::{Error, Result};
use crate::util::is_http_url;

/// Current cache version; bumping it starts a fresh bucket.
pub const CACHE_VERSION: u32 = 3;

/// Assets pre-fetched at install.
pub const STATIC_MANIFEST: &[&str] = &[
    "js/dbhelper.js",
    "js/restaurant_info.js",
    "js/form.js",
    "js/main.js",
    "css/responsive.css",
    "css/styles.css",
    "data/restaurants.json",
    "index.html",
    "restaurant.html",
    "manifest.json",
];

/// Third-party stylesheet the pages link to; opt-in because install fails
/// as a whole when it cannot be reached.
pub const FONT_STYLESHEET: &str = "https://fonts.googleapis.com/css?family=Roboto:400,500,700";

const PAGE_SHELL_KEY: &str = "/restaurant.html";

/// How a request is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Non-GET: straight to the network
    PassThrough,
    /// Restaurant detail page: the cached shell, network when missing
    PageShell,
    /// Review data: always the network
    NetworkOnly,
    /// Cache first, network on a miss
    CacheFirst,
}

/// Pick the route for a request; `path` excludes the query string.
pub fn classify(method: &str, path: &str) -> Route {
    if !method.eq_ignore_ascii_case("GET") {
        Route::PassThrough
    } else if path.starts_with(PAGE_SHELL_KEY) {
        Route::PageShell
    } else if path.starts_with("/reviews") {
        Route::NetworkOnly
    } else {
        Route::CacheFirst
    }
}

/// Cache key for a manifest entry or request target.
pub fn request_key(target: &str) -> String {
    if is_http_url(target) || target.starts_with('/') {
        target.to_string()
    } else {
        format!("/{target}")
    }
}

/// A request crossing the network boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    pub method: String,
    pub path_and_query: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl CacheRequest {
    pub fn get(target: &str) -> Self {
        Self {
            method: "GET".to_string(),
            path_and_query: request_key(target),
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        self.path_and_query
            .split_once('?')
            .map_or(self.path_and_query.as_str(), |(path, _)| path)
    }
}

/// A response as stored in, or served from, the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The cache policy over one bucket and one network fetcher
pub struct OfflineCache<F> {
    bucket: CacheBucket,
    fetcher: F,
}

impl<F: Fetcher> OfflineCache<F> {
    pub const fn new(bucket: CacheBucket, fetcher: F) -> Self {
        Self { bucket, fetcher }
    }

    pub const fn bucket(&self) -> &CacheBucket {
        &self.bucket
    }

    /// Fetch and store every manifest entry.
    ///
    /// Nothing is stored unless every entry fetches with a success status.
    pub async fn install(&self, manifest: &[&str]) -> Result<usize> {
        let mut entries = Vec::with_capacity(manifest.len());
        for target in manifest {
            let request = CacheRequest::get(target);
            let response = self.fetcher.fetch(&request).await.map_err(|error| {
                Error::Fetch(format!("install: {} failed: {error}", request.path_and_query))
            })?;
            if !response.is_success() {
                return Err(Error::Fetch(format!(
                    "install: {} answered {}",
                    request.path_and_query, response.status
                )));
            }
            entries.push((request.path_and_query, response));
        }

        self.bucket.put_all(&entries).await?;
        tracing::info!(bucket = self.bucket.name(), count = entries.len(), "Cache installed");
        Ok(entries.len())
    }

    /// Answer one request according to its route.
    pub async fn handle(&self, request: &CacheRequest) -> Result<CachedResponse> {
        match classify(&request.method, request.path()) {
            Route::PassThrough | Route::NetworkOnly => self.fetcher.fetch(request).await,
            Route::PageShell => match self.cached(PAGE_SHELL_KEY).await {
                Some(response) => Ok(response),
                None => self.fetcher.fetch(request).await,
            },
            Route::CacheFirst => {
                if let Some(response) = self.cached(&request.path_and_query).await {
                    return Ok(response);
                }
                let response = self.fetcher.fetch(request).await?;
                if response.is_success() {
                    if let Err(error) = self.bucket.put(&request.path_and_query, &response).await {
                        tracing::warn!(key = %request.path_and_query, "Failed to cache response: {error}");
                    }
                }
                Ok(response)
            }
        }
    }

    /// Cache lookup where a broken bucket counts as a miss.
    async fn cached(&self, key: &str) -> Option<CachedResponse> {
        match self.bucket.lookup(key).await {
            Ok(found) => found,
            Err(error) => {
                tracing::warn!(key, "Cache lookup failed: {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct FakeFetcher {
        offline: AtomicBool,
        missing: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn set_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }
    }

    impl Fetcher for FakeFetcher {
        async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method, request.path_and_query));
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::api(503, "offline"));
            }
            let status = if self.missing.iter().any(|path| *path == request.path()) {
                404
            } else {
                200
            };
            Ok(CachedResponse {
                status,
                content_type: "text/plain".to_string(),
                body: format!("live {}", request.path_and_query).into_bytes(),
            })
        }
    }

    async fn cache(fetcher: FakeFetcher) -> OfflineCache<FakeFetcher> {
        OfflineCache::new(
            CacheBucket::open_in_memory(CACHE_VERSION).await.unwrap(),
            fetcher,
        )
    }

    #[test]
    fn classify_routes_requests() {
        assert_eq!(classify("POST", "/reviews"), Route::PassThrough);
        assert_eq!(classify("PUT", "/index.html"), Route::PassThrough);
        assert_eq!(classify("GET", "/restaurant.html"), Route::PageShell);
        assert_eq!(classify("get", "/reviews"), Route::NetworkOnly);
        assert_eq!(classify("GET", "/reviews/12"), Route::NetworkOnly);
        assert_eq!(classify("GET", "/css/styles.css"), Route::CacheFirst);
        assert_eq!(classify("GET", "/restaurants"), Route::CacheFirst);
    }

    #[test]
    fn request_path_drops_query() {
        let request = CacheRequest::get("restaurant.html?id=4");
        assert_eq!(request.path_and_query, "/restaurant.html?id=4");
        assert_eq!(request.path(), "/restaurant.html");
    }

    #[tokio::test]
    async fn install_stores_whole_manifest() {
        let cache = cache(FakeFetcher::default()).await;
        assert_eq!(cache.install(STATIC_MANIFEST).await.unwrap(), STATIC_MANIFEST.len());

        let keys = cache.bucket().keys().await.unwrap();
        assert_eq!(keys.len(), STATIC_MANIFEST.len());
        assert!(keys.contains(&"/restaurant.html".to_string()));
        assert!(keys.contains(&"/data/restaurants.json".to_string()));
    }

    #[tokio::test]
    async fn install_is_all_or_nothing() {
        let cache = cache(FakeFetcher {
            missing: vec!["/manifest.json"],
            ..FakeFetcher::default()
        })
        .await;

        let error = cache.install(STATIC_MANIFEST).await.unwrap_err();
        assert!(matches!(error, Error::Fetch(_)));
        assert!(cache.bucket().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn detail_pages_share_cached_shell() {
        let cache = cache(FakeFetcher::default()).await;
        cache.install(&["restaurant.html"]).await.unwrap();
        cache.fetcher.set_offline();

        let response = cache
            .handle(&CacheRequest::get("/restaurant.html?id=7"))
            .await
            .unwrap();
        assert_eq!(response.body, b"live /restaurant.html".to_vec());
    }

    #[tokio::test]
    async fn detail_page_falls_back_to_network() {
        let cache = cache(FakeFetcher::default()).await;
        let response = cache
            .handle(&CacheRequest::get("/restaurant.html?id=7"))
            .await
            .unwrap();
        assert_eq!(response.body, b"live /restaurant.html?id=7".to_vec());
        assert!(cache.bucket().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reviews_always_hit_network() {
        let cache = cache(FakeFetcher::default()).await;
        let request = CacheRequest::get("/reviews?restaurant_id=2");
        cache.handle(&request).await.unwrap();
        cache.handle(&request).await.unwrap();

        assert_eq!(cache.fetcher.calls().len(), 2);
        assert!(cache.bucket().keys().await.unwrap().is_empty());

        cache.fetcher.set_offline();
        assert!(cache.handle(&request).await.is_err());
    }

    #[tokio::test]
    async fn non_get_passes_through() {
        let cache = cache(FakeFetcher::default()).await;
        let request = CacheRequest {
            method: "POST".to_string(),
            path_and_query: "/css/styles.css".to_string(),
            content_type: Some("application/json".to_string()),
            body: b"{}".to_vec(),
        };
        cache.handle(&request).await.unwrap();
        cache.handle(&request).await.unwrap();

        assert_eq!(cache.fetcher.calls(), vec!["POST /css/styles.css".to_string(); 2]);
        assert!(cache.bucket().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cache_first_stores_on_miss_and_serves_offline() {
        let cache = cache(FakeFetcher::default()).await;
        let request = CacheRequest::get("/img/1.jpg");

        let live = cache.handle(&request).await.unwrap();
        cache.fetcher.set_offline();
        let cached = cache.handle(&request).await.unwrap();

        assert_eq!(live, cached);
        assert_eq!(cache.fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_responses_are_not_cached() {
        let cache = cache(FakeFetcher {
            missing: vec!["/img/404.jpg"],
            ..FakeFetcher::default()
        })
        .await;
        let request = CacheRequest::get("/img/404.jpg");

        assert_eq!(cache.handle(&request).await.unwrap().status, 404);
        assert!(cache.bucket().keys().await.unwrap().is_empty());
    }
}
