//! Presentation state owned by the front ends.

use crate::error::Result;
use crate::models::Restaurant;
use crate::remote::RemoteApi;
use crate::services::{Filter, RestaurantDirectory};

/// Outcome of the latest sync sweep, as shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Offline,
    Synced,
    Error,
}

/// The restaurant list a front end is currently showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseState {
    pub restaurants: Vec<Restaurant>,
    pub neighborhoods: Vec<String>,
    pub cuisines: Vec<String>,
    pub cuisine: Filter,
    pub neighborhood: Filter,
}

impl BrowseState {
    /// Load the filter options and the unfiltered list.
    pub async fn load<R: RemoteApi>(directory: &RestaurantDirectory<R>) -> Result<Self> {
        let mut state = Self {
            neighborhoods: directory.fetch_neighborhoods().await?,
            cuisines: directory.fetch_cuisines().await?,
            ..Self::default()
        };
        state.update(directory, Filter::All, Filter::All).await?;
        Ok(state)
    }

    /// Replace the shown restaurants with the ones matching both filters.
    pub async fn update<R: RemoteApi>(
        &mut self,
        directory: &RestaurantDirectory<R>,
        cuisine: Filter,
        neighborhood: Filter,
    ) -> Result<&[Restaurant]> {
        self.restaurants = directory
            .fetch_restaurants_by_cuisine_and_neighborhood(
                &cuisine.to_string(),
                &neighborhood.to_string(),
            )
            .await?;
        self.cuisine = cuisine;
        self.neighborhood = neighborhood;
        Ok(&self.restaurants)
    }

    /// "3 restaurants found" style summary of the current list.
    pub fn found_label(&self) -> String {
        match self.restaurants.len() {
            0 => "No restaurants found.".to_string(),
            1 => "1 restaurant found".to_string(),
            count => format!("{count} restaurants found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::db::LocalStore;
    use crate::favorites::Favorites;
    use crate::models::{LatLng, NewReview, Review};
    use crate::notice::TracingNotifier;

    struct StaticRemote(Vec<Restaurant>);

    impl RemoteApi for StaticRemote {
        async fn fetch_all(&self) -> Result<Vec<Restaurant>> {
            Ok(self.0.clone())
        }

        async fn fetch_reviews(&self, _restaurant_id: i64) -> Result<Vec<Review>> {
            Ok(Vec::new())
        }

        async fn post_review(
            &self,
            _review: &NewReview,
            _idempotency_key: Option<&str>,
        ) -> Result<Review> {
            Err(crate::Error::api(405, "read-only"))
        }
    }

    fn restaurant(id: i64, cuisine: &str, neighborhood: &str) -> Restaurant {
        Restaurant {
            id,
            name: format!("Restaurant {id}"),
            neighborhood: neighborhood.to_string(),
            cuisine_type: cuisine.to_string(),
            address: String::new(),
            latlng: LatLng { lat: 0.0, lng: 0.0 },
            photograph: None,
            operating_hours: BTreeMap::new(),
        }
    }

    async fn directory() -> RestaurantDirectory<StaticRemote> {
        RestaurantDirectory::new(
            StaticRemote(vec![
                restaurant(1, "Pizza", "Brooklyn"),
                restaurant(2, "Asian", "Queens"),
                restaurant(3, "Pizza", "Queens"),
            ]),
            LocalStore::open_in_memory().await.unwrap(),
            Favorites::in_memory(),
            Arc::new(TracingNotifier),
        )
    }

    #[tokio::test]
    async fn load_fills_options_and_list() {
        let directory = directory().await;
        let state = BrowseState::load(&directory).await.unwrap();

        assert_eq!(state.restaurants.len(), 3);
        assert_eq!(state.neighborhoods, vec!["Brooklyn", "Queens"]);
        assert_eq!(state.cuisines, vec!["Pizza", "Asian"]);
        assert_eq!(state.found_label(), "3 restaurants found");
    }

    #[tokio::test]
    async fn update_applies_filters() {
        let directory = directory().await;
        let mut state = BrowseState::load(&directory).await.unwrap();

        let shown = state
            .update(&directory, Filter::parse("Pizza"), Filter::parse("Queens"))
            .await
            .unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(state.found_label(), "1 restaurant found");
        assert_eq!(state.cuisine, Filter::Only("Pizza".to_string()));

        state
            .update(&directory, Filter::parse("Thai"), Filter::All)
            .await
            .unwrap();
        assert_eq!(state.found_label(), "No restaurants found.");
    }
}
