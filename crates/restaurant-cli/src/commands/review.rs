use restaurant_core::services::SavedTo;
use restaurant_core::NewReview;

use crate::commands::common::{format_review_lines, print_json, review_to_item, Directory};
use crate::error::CliError;

pub async fn run_review(
    directory: &Directory,
    restaurant_id: i64,
    name: &str,
    rating: u8,
    comments: &str,
) -> Result<(), CliError> {
    let submission = directory
        .add_review(NewReview::new(restaurant_id, name, rating, comments))
        .await?;

    match submission.saved_to {
        SavedTo::Server => println!("Review {} published", submission.review.id),
        SavedTo::Local => println!(
            "Review stored locally as {}; run `restaurants sync` once the API is reachable",
            submission.review.id
        ),
    }
    Ok(())
}

pub async fn run_pending(directory: &Directory, as_json: bool) -> Result<(), CliError> {
    if !directory.store().is_available() {
        return Err(CliError::NoLocalStore);
    }
    let pending = directory.store().pending_reviews().await?;

    if as_json {
        return print_json(&pending.iter().map(review_to_item).collect::<Vec<_>>());
    }
    if pending.is_empty() {
        println!("No pending reviews.");
        return Ok(());
    }
    for review in &pending {
        println!("Restaurant {}:", review.restaurant_id);
        for line in format_review_lines(std::slice::from_ref(review)) {
            println!("  {line}");
        }
    }
    Ok(())
}
