use restaurant_core::services::Filter;
use restaurant_core::state::BrowseState;

use crate::commands::common::{
    format_restaurant_line, print_json, restaurant_to_list_item, Directory, RestaurantListItem,
};
use crate::error::CliError;

pub async fn run_list(
    directory: &Directory,
    cuisine: &str,
    neighborhood: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let mut state = BrowseState::default();
    state
        .update(directory, Filter::parse(cuisine), Filter::parse(neighborhood))
        .await?;

    let items = state
        .restaurants
        .iter()
        .map(|restaurant| restaurant_to_list_item(restaurant, directory.is_favorited(restaurant)))
        .collect::<Vec<RestaurantListItem>>();

    if as_json {
        return print_json(&items);
    }

    for item in &items {
        println!("{}", format_restaurant_line(item));
    }
    println!("{}", state.found_label());
    Ok(())
}

pub async fn run_neighborhoods(directory: &Directory) -> Result<(), CliError> {
    for neighborhood in directory.fetch_neighborhoods().await? {
        println!("{neighborhood}");
    }
    Ok(())
}

pub async fn run_cuisines(directory: &Directory) -> Result<(), CliError> {
    for cuisine in directory.fetch_cuisines().await? {
        println!("{cuisine}");
    }
    Ok(())
}
