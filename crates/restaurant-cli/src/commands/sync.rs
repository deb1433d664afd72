use restaurant_core::state::SyncState;
use restaurant_core::sync::SyncReport;

use crate::commands::common::Directory;
use crate::error::CliError;

pub async fn run_sync(directory: &Directory) -> Result<(), CliError> {
    if !directory.store().is_available() {
        return Err(CliError::NoLocalStore);
    }
    let report = directory.sync_pending_reviews().await?;
    println!("{}", format_sync_report(&report));
    Ok(())
}

pub fn format_sync_report(report: &SyncReport) -> String {
    let synced = report.replayed.len();
    match report.state() {
        SyncState::Synced if synced == 0 => "Nothing to sync".to_string(),
        SyncState::Synced => format!("Synced {synced} review(s)"),
        SyncState::Offline => format!(
            "API unreachable; synced {synced}, {} review(s) still pending",
            report.remaining
        ),
        SyncState::Error => format!(
            "Synced {synced}; {} rejected by the API, {} review(s) still pending",
            report.rejected, report.remaining
        ),
    }
}
