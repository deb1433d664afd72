//! Data access facade used by presentation code.

use std::fmt;
use std::sync::Arc;

use crate::db::LocalStore;
use crate::error::{Error, Result};
use crate::favorites::Favorites;
use crate::models::{NewReview, Restaurant, Review};
use crate::notice::{Notice, Notifier};
use crate::remote::RemoteApi;
use crate::sync::{sweep_pending_reviews, SyncReport};

/// Filter value meaning "no filter"
pub const ALL: &str = "all";

/// Cuisine or neighborhood filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Only(String),
}

impl Filter {
    /// `"all"` (or an empty value) disables the filter.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Only(value) => f.write_str(value),
        }
    }
}

/// Where a submitted review ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedTo {
    /// Accepted by the API; public
    Server,
    /// Stored locally with a pending id; public after the next sync sweep
    Local,
}

/// Result of [`RestaurantDirectory::add_review`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub review: Review,
    pub saved_to: SavedTo,
}

/// Single entry point for restaurant and review data.
///
/// Every read tries the remote API first and falls back to the local store;
/// an error reaches the caller only when both sources fail.
pub struct RestaurantDirectory<R> {
    remote: R,
    store: LocalStore,
    favorites: Favorites,
    notifier: Arc<dyn Notifier>,
}

impl<R: RemoteApi> RestaurantDirectory<R> {
    pub fn new(
        remote: R,
        store: LocalStore,
        favorites: Favorites,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            remote,
            store,
            favorites,
            notifier,
        }
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    /// All restaurants, from the API when reachable, else from the local store.
    pub async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>> {
        let remote_error = match self.remote.fetch_all().await {
            Ok(restaurants) => {
                if let Err(error) = self.store.put_restaurants(&restaurants).await {
                    tracing::warn!("Failed to cache restaurants locally: {error}");
                }
                return Ok(restaurants);
            }
            Err(error) => error,
        };

        tracing::warn!("Fetching restaurants failed, using local store: {remote_error}");
        match self.store.scan_restaurants().await {
            Ok(restaurants) if !restaurants.is_empty() => Ok(restaurants),
            Ok(_) => Err(self.fetch_failed(format!(
                "{remote_error}; no restaurants cached locally"
            ))),
            Err(local_error) => Err(self.fetch_failed(format!("{remote_error}; {local_error}"))),
        }
    }

    /// One restaurant by id.
    pub async fn fetch_restaurant_by_id(&self, id: i64) -> Result<Restaurant> {
        self.fetch_restaurants()
            .await?
            .into_iter()
            .find(|restaurant| restaurant.id == id)
            .ok_or_else(|| Error::NotFound(format!("restaurant {id}")))
    }

    pub async fn fetch_restaurants_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>> {
        self.fetch_restaurants_by_cuisine_and_neighborhood(cuisine, ALL)
            .await
    }

    pub async fn fetch_restaurants_by_neighborhood(
        &self,
        neighborhood: &str,
    ) -> Result<Vec<Restaurant>> {
        self.fetch_restaurants_by_cuisine_and_neighborhood(ALL, neighborhood)
            .await
    }

    /// Restaurants matching both filters; `"all"` disables either one.
    pub async fn fetch_restaurants_by_cuisine_and_neighborhood(
        &self,
        cuisine: &str,
        neighborhood: &str,
    ) -> Result<Vec<Restaurant>> {
        let cuisine = Filter::parse(cuisine);
        let neighborhood = Filter::parse(neighborhood);

        Ok(self
            .fetch_restaurants()
            .await?
            .into_iter()
            .filter(|restaurant| {
                cuisine.matches(&restaurant.cuisine_type)
                    && neighborhood.matches(&restaurant.neighborhood)
            })
            .collect())
    }

    /// Distinct neighborhoods in first-seen order.
    pub async fn fetch_neighborhoods(&self) -> Result<Vec<String>> {
        let restaurants = self.fetch_restaurants().await?;
        Ok(unique_in_order(
            restaurants.iter().map(|restaurant| restaurant.neighborhood.as_str()),
        ))
    }

    /// Distinct cuisines in first-seen order.
    pub async fn fetch_cuisines(&self) -> Result<Vec<String>> {
        let restaurants = self.fetch_restaurants().await?;
        Ok(unique_in_order(
            restaurants.iter().map(|restaurant| restaurant.cuisine_type.as_str()),
        ))
    }

    /// Reviews of one restaurant.
    ///
    /// Pending reviews are synced first; a failed sweep never blocks the read.
    pub async fn fetch_reviews_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<Review>> {
        if let Err(error) = self.sync_pending_reviews().await {
            tracing::warn!("Sync sweep failed before fetching reviews: {error}");
        }

        let remote_error = match self.remote.fetch_reviews(restaurant_id).await {
            Ok(reviews) => {
                self.cache_reviews(&reviews).await;
                return Ok(reviews);
            }
            Err(error) => error,
        };

        tracing::warn!(
            restaurant_id,
            "Fetching reviews failed, using local store: {remote_error}"
        );
        self.store
            .scan_reviews_by_restaurant(restaurant_id)
            .await
            .map_err(|local_error| self.fetch_failed(format!("{remote_error}; {local_error}")))
    }

    /// Submit a review, keeping it locally when the API is unreachable.
    ///
    /// A review the API refused, or whose echo could not be decoded, is not
    /// kept: replaying it would be refused again or publish a duplicate.
    pub async fn add_review(&self, draft: NewReview) -> Result<ReviewSubmission> {
        draft.validate()?;

        let remote_error = match self.remote.post_review(&draft, None).await {
            Ok(review) => {
                self.notifier
                    .notify(Notice::success("Your review has been added!"));
                return Ok(ReviewSubmission {
                    review,
                    saved_to: SavedTo::Server,
                });
            }
            Err(error) if error.is_network() => error,
            Err(error) => {
                tracing::error!("Review was not accepted by the API: {error}");
                self.notifier.notify(Notice::error(
                    "Your review could not be saved. Please try again.",
                ));
                return Err(error);
            }
        };

        tracing::warn!("Posting review failed, storing it locally: {remote_error}");
        match self.store.put_review(draft, None).await {
            Ok(review) => {
                self.notifier.notify(Notice::pending(
                    "Your review has been added, but it is not visible to the public yet. \
                     Connect to the internet to make it public.",
                ));
                Ok(ReviewSubmission {
                    review,
                    saved_to: SavedTo::Local,
                })
            }
            Err(local_error) => {
                tracing::error!("Review could not be stored locally: {local_error}");
                self.notifier.notify(Notice::error(
                    "Your review could not be saved. Please try again.",
                ));
                Err(local_error)
            }
        }
    }

    /// Run one sync sweep over pending reviews.
    pub async fn sync_pending_reviews(&self) -> Result<SyncReport> {
        sweep_pending_reviews(&self.store, &self.remote, self.notifier.as_ref()).await
    }

    /// Flip a restaurant's favorite flag; returns the new state.
    pub fn toggle_favorite(&self, restaurant_id: i64) -> Result<bool> {
        self.favorites.toggle(restaurant_id)
    }

    pub fn is_favorited(&self, restaurant: &Restaurant) -> bool {
        self.favorites.contains(restaurant.id)
    }

    /// Favorited restaurant ids in the order they were added.
    pub fn favorites(&self) -> Result<Vec<i64>> {
        self.favorites.list()
    }

    async fn cache_reviews(&self, reviews: &[Review]) {
        for review in reviews {
            match self
                .store
                .put_review(review.to_draft(), Some(review.id))
                .await
            {
                Ok(_) | Err(Error::DuplicateId(_)) => {}
                Err(error) if error.is_local_store() => {
                    tracing::warn!("Failed to cache reviews locally: {error}");
                    return;
                }
                Err(error) => tracing::warn!(id = %review.id, "Failed to cache review: {error}"),
            }
        }
    }

    fn fetch_failed(&self, detail: String) -> Error {
        tracing::error!("Both remote and local sources failed: {detail}");
        self.notifier
            .notify(Notice::error("Could not load data. Check your connection."));
        Error::Fetch(detail)
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        if !unique.iter().any(|seen| seen == value) {
            unique.push(value.to_string());
        }
    }
    unique
}
