use std::collections::BTreeMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use restaurant_core::config::ClientConfig;
use restaurant_core::models::LatLng;
use restaurant_core::notice::Notice;
use restaurant_core::sync::{ReplayedReview, SyncReport};
use restaurant_core::{Restaurant, Review, ReviewId};
use tempfile::tempdir;

use crate::cli::CompletionShell;
use crate::commands::common::{
    format_notice, format_restaurant_line, format_review_date, format_review_lines,
    open_directory, restaurant_to_list_item, review_to_item,
};
use crate::commands::completions::run_completions;
use crate::commands::favorite::run_favorite;
use crate::commands::review::{run_pending, run_review};
use crate::commands::show::format_restaurant_detail;
use crate::commands::sync::{format_sync_report, run_sync};
use crate::error::CliError;

fn offline_config(data_dir: &std::path::Path) -> ClientConfig {
    ClientConfig {
        // Port 9 (discard) on localhost is closed in test environments
        api_base_url: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_secs(2),
        data_dir: data_dir.to_path_buf(),
    }
}

fn restaurant() -> Restaurant {
    Restaurant {
        id: 3,
        name: "Kang Ho Dong Baekjeong".to_string(),
        neighborhood: "Manhattan".to_string(),
        cuisine_type: "Asian".to_string(),
        address: "1 E 32nd St, New York, NY 10016".to_string(),
        latlng: LatLng {
            lat: 40.747_143,
            lng: -73.985_414,
        },
        photograph: Some("3".to_string()),
        operating_hours: BTreeMap::from([("Monday".to_string(), "11:30 am - 2:00 am".to_string())]),
    }
}

fn review(id: i64) -> Review {
    Review {
        id: ReviewId::new(id),
        restaurant_id: 3,
        name: "Ada".to_string(),
        rating: 4,
        comments: "Great barbecue".to_string(),
        created_at: 0,
    }
}

#[test]
fn restaurant_line_marks_favorites() {
    let item = restaurant_to_list_item(&restaurant(), true);
    assert_eq!(
        format_restaurant_line(&item),
        "   3  Kang Ho Dong Baekjeong (Asian, Manhattan) *"
    );
    assert_eq!(item.detail_url, "./restaurant.html?id=3");
}

#[test]
fn restaurant_detail_lists_photo_and_hours() {
    let lines = format_restaurant_detail(&restaurant(), false);
    assert_eq!(lines[0], "Kang Ho Dong Baekjeong");
    assert!(lines.contains(&"Photo: /img/3".to_string()));
    assert!(lines.iter().any(|line| line.contains("Monday")));
}

#[test]
fn review_lines_flag_pending_reviews() {
    let lines = format_review_lines(&[review(-5), review(8)]);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Ada - 4/5 - undated [pending]");
    assert_eq!(lines[1], "    Great barbecue");
    assert_eq!(lines[2], "Ada - 4/5 - undated");

    assert!(review_to_item(&review(-5)).pending);
    assert!(!review_to_item(&review(8)).pending);
}

#[test]
fn review_date_is_a_calendar_date() {
    let formatted = format_review_date(1_700_000_000_000);
    assert!(formatted.contains("2023"));
    assert_eq!(format_review_date(0), "undated");
}

#[test]
fn notices_are_tagged_by_level() {
    assert_eq!(
        format_notice(&Notice::pending("Saved for later")),
        "[pending] Saved for later"
    );
    assert_eq!(format_notice(&Notice::error("Nope")), "[error] Nope");
}

#[test]
fn sync_report_summaries() {
    assert_eq!(format_sync_report(&SyncReport::default()), "Nothing to sync");

    let replayed = ReplayedReview {
        local_id: ReviewId::new(-2),
        server_id: ReviewId::new(40),
    };
    let synced = SyncReport {
        replayed: vec![replayed],
        ..SyncReport::default()
    };
    assert_eq!(format_sync_report(&synced), "Synced 1 review(s)");

    let offline = SyncReport {
        remaining: 2,
        stopped_offline: true,
        ..SyncReport::default()
    };
    assert_eq!(
        format_sync_report(&offline),
        "API unreachable; synced 0, 2 review(s) still pending"
    );

    let refused = SyncReport {
        replayed: vec![replayed],
        remaining: 1,
        rejected: 1,
        ..SyncReport::default()
    };
    assert_eq!(
        format_sync_report(&refused),
        "Synced 1; 1 rejected by the API, 1 review(s) still pending"
    );
}

#[tokio::test]
async fn offline_review_is_kept_pending_on_disk() {
    let tmp = tempdir().unwrap();
    let config = offline_config(tmp.path());

    let directory = open_directory(&config, false).await.unwrap();
    run_review(&directory, 3, "Ada", 5, "Lovely").await.unwrap();
    run_pending(&directory, true).await.unwrap();
    run_sync(&directory).await.unwrap();
    drop(directory);

    let reopened = open_directory(&config, false).await.unwrap();
    let pending = reopened.store().pending_reviews().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].comments, "Lovely");
    assert!(config.database_path().exists());
}

#[tokio::test]
async fn pending_without_local_store_is_an_error() {
    let tmp = tempdir().unwrap();
    let directory = open_directory(&offline_config(tmp.path()), true)
        .await
        .unwrap();

    let error = run_pending(&directory, false).await.unwrap_err();
    assert!(matches!(error, CliError::NoLocalStore));
}

#[tokio::test]
async fn favorites_persist_between_runs() {
    let tmp = tempdir().unwrap();
    let config = offline_config(tmp.path());

    let directory = open_directory(&config, false).await.unwrap();
    run_favorite(&directory, 7).unwrap();
    drop(directory);

    let reopened = open_directory(&config, true).await.unwrap();
    assert_eq!(reopened.favorites().unwrap(), vec![7]);
    assert!(config.local_storage_path().exists());
}

#[test]
fn run_completions_writes_bash_script_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("restaurants.bash");

    run_completions(CompletionShell::Bash, Some(&path)).unwrap();

    let script = std::fs::read_to_string(&path).unwrap();
    assert!(script.contains("restaurants"));
    assert!(script.contains("favorite"));
}
