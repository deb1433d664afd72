use crate::commands::common::Directory;
use crate::error::CliError;

pub fn run_favorite(directory: &Directory, restaurant_id: i64) -> Result<(), CliError> {
    if directory.toggle_favorite(restaurant_id)? {
        println!("Restaurant {restaurant_id} added to favorites");
    } else {
        println!("Restaurant {restaurant_id} removed from favorites");
    }
    Ok(())
}

pub async fn run_favorites(directory: &Directory) -> Result<(), CliError> {
    let ids = directory.favorites()?;
    if ids.is_empty() {
        println!("No favorite restaurants.");
        return Ok(());
    }

    // Names are a nicety; ids alone still answer the question offline.
    let restaurants = match directory.fetch_restaurants().await {
        Ok(restaurants) => restaurants,
        Err(error) => {
            tracing::debug!("Listing favorites without names: {error}");
            Vec::new()
        }
    };
    for id in ids {
        match restaurants.iter().find(|restaurant| restaurant.id == id) {
            Some(restaurant) => println!("{id:>4}  {}", restaurant.name),
            None => println!("{id:>4}"),
        }
    }
    Ok(())
}
