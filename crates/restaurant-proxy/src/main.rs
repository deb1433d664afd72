mod config;
mod error;
mod routes;

use std::sync::Arc;

use config::ProxyConfig;
use restaurant_core::cache::{CacheBucket, HttpFetcher, OfflineCache, FONT_STYLESHEET, STATIC_MANIFEST};
use routes::{app_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("restaurant_proxy=info,restaurant_core=info")
            }),
        )
        .init();

    let config = Arc::new(ProxyConfig::from_env()?);
    tracing::info!("Starting restaurant-proxy with config: {:?}", config);

    let bucket = CacheBucket::open_path(&config.cache_path, config.cache_version).await?;
    let fetcher = HttpFetcher::new(config.upstream.clone(), config.request_timeout)?;
    let cache = Arc::new(OfflineCache::new(bucket, fetcher));

    let mut manifest = STATIC_MANIFEST.to_vec();
    if config.precache_fonts {
        manifest.push(FONT_STYLESHEET);
    }
    // Requests still work uncached when the upstream is down at start-up.
    if let Err(error) = cache.install(&manifest).await {
        tracing::warn!("Cache install failed, serving without precached assets: {error}");
    }

    let bind_addr = config.bind_addr.clone();
    let router = app_router(AppState { config, cache });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("restaurant-proxy listening on {}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
