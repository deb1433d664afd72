use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use restaurant_core::config::ClientConfig;
use restaurant_core::db::LocalStore;
use restaurant_core::favorites::{Favorites, FileStorage};
use restaurant_core::notice::{Notice, NoticeLevel, Notifier};
use restaurant_core::remote::HttpRemote;
use restaurant_core::services::RestaurantDirectory;
use restaurant_core::{Restaurant, Review};
use serde::Serialize;

use crate::error::CliError;

pub type Directory = RestaurantDirectory<HttpRemote>;

#[derive(Debug, Serialize)]
pub struct RestaurantListItem {
    pub id: i64,
    pub name: String,
    pub neighborhood: String,
    pub cuisine_type: String,
    pub address: String,
    pub favorite: bool,
    pub detail_url: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub rating: u8,
    pub comments: String,
    pub created_at: i64,
    pub pending: bool,
}

/// Prints notices to stderr so JSON output on stdout stays clean.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", format_notice(&notice));
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Pending => "pending",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

/// Environment config with command-line overrides applied.
pub fn resolve_config(
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = api_url {
        config.api_base_url = api_url;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    Ok(config)
}

/// Build the directory for one command.
///
/// A store that fails to open degrades to no store rather than failing the
/// command; reads then depend on the API alone.
pub async fn open_directory(
    config: &ClientConfig,
    no_local_store: bool,
) -> Result<Directory, CliError> {
    let remote = HttpRemote::new(config.api_base_url.clone(), config.request_timeout)?;

    let store = if no_local_store {
        LocalStore::unavailable()
    } else {
        match LocalStore::open_path(config.database_path()).await {
            Ok(store) => store,
            Err(error) => {
                tracing::warn!(
                    path = %config.database_path().display(),
                    "Local store unavailable: {error}"
                );
                LocalStore::unavailable()
            }
        }
    };

    let favorites = Favorites::new(FileStorage::new(config.local_storage_path()));
    Ok(RestaurantDirectory::new(
        remote,
        store,
        favorites,
        Arc::new(ConsoleNotifier),
    ))
}

pub fn restaurant_to_list_item(restaurant: &Restaurant, favorite: bool) -> RestaurantListItem {
    RestaurantListItem {
        id: restaurant.id,
        name: restaurant.name.clone(),
        neighborhood: restaurant.neighborhood.clone(),
        cuisine_type: restaurant.cuisine_type.clone(),
        address: restaurant.address.clone(),
        favorite,
        detail_url: restaurant.detail_url(),
    }
}

pub fn review_to_item(review: &Review) -> ReviewItem {
    ReviewItem {
        id: review.id.get(),
        restaurant_id: review.restaurant_id,
        name: review.name.clone(),
        rating: review.rating,
        comments: review.comments.clone(),
        created_at: review.created_at,
        pending: review.id.is_pending(),
    }
}

pub fn format_restaurant_line(item: &RestaurantListItem) -> String {
    let star = if item.favorite { " *" } else { "" };
    format!(
        "{:>4}  {} ({}, {}){star}",
        item.id, item.name, item.cuisine_type, item.neighborhood
    )
}

pub fn format_review_lines(reviews: &[Review]) -> Vec<String> {
    let mut lines = Vec::new();
    for review in reviews {
        let pending = if review.id.is_pending() {
            " [pending]"
        } else {
            ""
        };
        lines.push(format!(
            "{} - {}/5 - {}{pending}",
            review.name,
            review.rating,
            format_review_date(review.created_at)
        ));
        lines.push(format!("    {}", review.comments));
    }
    lines
}

/// Local calendar date of a review timestamp in milliseconds.
pub fn format_review_date(created_at_ms: i64) -> String {
    if created_at_ms <= 0 {
        return "undated".to_string();
    }
    Local
        .timestamp_millis_opt(created_at_ms)
        .single()
        .map_or_else(|| "undated".to_string(), |time| time.format("%b %-d, %Y").to_string())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
