use restaurant_core::{Restaurant, Review};
use serde::Serialize;

use crate::commands::common::{format_review_lines, print_json, review_to_item, Directory, ReviewItem};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct RestaurantDetail<'a> {
    restaurant: &'a Restaurant,
    favorite: bool,
    image_url: Option<String>,
    reviews: Vec<ReviewItem>,
}

pub async fn run_show(directory: &Directory, id: i64, as_json: bool) -> Result<(), CliError> {
    let restaurant = directory.fetch_restaurant_by_id(id).await?;
    let reviews = directory.fetch_reviews_for_restaurant(id).await?;
    let favorite = directory.is_favorited(&restaurant);

    if as_json {
        return print_json(&RestaurantDetail {
            restaurant: &restaurant,
            favorite,
            image_url: restaurant.image_url(),
            reviews: reviews.iter().map(review_to_item).collect(),
        });
    }

    for line in format_restaurant_detail(&restaurant, favorite) {
        println!("{line}");
    }
    println!();
    print_reviews(&reviews);
    Ok(())
}

pub async fn run_reviews(
    directory: &Directory,
    restaurant_id: i64,
    as_json: bool,
) -> Result<(), CliError> {
    let reviews = directory.fetch_reviews_for_restaurant(restaurant_id).await?;
    if as_json {
        return print_json(&reviews.iter().map(review_to_item).collect::<Vec<_>>());
    }
    print_reviews(&reviews);
    Ok(())
}

pub fn format_restaurant_detail(restaurant: &Restaurant, favorite: bool) -> Vec<String> {
    let mut lines = vec![
        if favorite {
            format!("{} *", restaurant.name)
        } else {
            restaurant.name.clone()
        },
        format!("{} in {}", restaurant.cuisine_type, restaurant.neighborhood),
    ];
    if !restaurant.address.is_empty() {
        lines.push(restaurant.address.clone());
    }
    if let Some(image) = restaurant.image_url() {
        lines.push(format!("Photo: {image}"));
    }
    for (day, hours) in &restaurant.operating_hours {
        lines.push(format!("  {day:<10} {hours}"));
    }
    lines
}

fn print_reviews(reviews: &[Review]) {
    if reviews.is_empty() {
        println!("No reviews yet!");
        return;
    }
    for line in format_review_lines(reviews) {
        println!("{line}");
    }
}
