//! Review model

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Lowest accepted star rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating
pub const MAX_RATING: u8 = 5;

/// Identifier of a review.
///
/// Positive ids are assigned by the server. Negative ids are placeholders for
/// reviews that have only been stored locally and still await a sync sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(i64);

impl ReviewId {
    /// Wrap a raw id.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Placeholder id for a review stored locally at `timestamp_ms`.
    pub const fn pending_at(timestamp_ms: i64) -> Self {
        Self(-timestamp_ms.saturating_abs())
    }

    /// Raw integer value.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True when the review has not reached the server yet.
    pub const fn is_pending(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReviewRecord")]
pub struct Review {
    pub id: ReviewId,
    pub restaurant_id: i64,
    pub name: String,
    pub rating: u8,
    pub comments: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

/// Review as the API sends it. The server keeps the posted `created_at` and
/// may add its own `createdAt`/`updatedAt`; either timestamp is accepted.
#[derive(Deserialize)]
struct ReviewRecord {
    id: ReviewId,
    #[serde(deserialize_with = "super::lenient_i64")]
    restaurant_id: i64,
    name: String,
    #[serde(deserialize_with = "lenient_rating")]
    rating: u8,
    comments: String,
    #[serde(default, deserialize_with = "super::lenient_i64")]
    created_at: i64,
    #[serde(default, rename = "createdAt", deserialize_with = "super::lenient_i64")]
    server_created_at: i64,
}

impl From<ReviewRecord> for Review {
    fn from(record: ReviewRecord) -> Self {
        let created_at = if record.created_at == 0 {
            record.server_created_at
        } else {
            record.created_at
        };
        Self {
            id: record.id,
            restaurant_id: record.restaurant_id,
            name: record.name,
            rating: record.rating,
            comments: record.comments,
            created_at,
        }
    }
}

impl Review {
    /// The review without its id, ready to be posted again.
    pub fn to_draft(&self) -> NewReview {
        NewReview {
            restaurant_id: self.restaurant_id,
            name: self.name.clone(),
            rating: self.rating,
            comments: self.comments.clone(),
            created_at: self.created_at,
        }
    }
}

/// A review that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub restaurant_id: i64,
    pub name: String,
    pub rating: u8,
    pub comments: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl NewReview {
    /// Create a draft stamped with the current time
    pub fn new(
        restaurant_id: i64,
        name: impl Into<String>,
        rating: u8,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            restaurant_id,
            name: name.into().trim().to_string(),
            rating,
            comments: comments.into().trim().to_string(),
            created_at: crate::util::unix_timestamp_millis(),
        }
    }

    /// Reject drafts the review form would not submit.
    pub fn validate(&self) -> Result<()> {
        if self.restaurant_id <= 0 {
            return Err(Error::InvalidInput(format!(
                "restaurant id must be positive, got {}",
                self.restaurant_id
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("reviewer name is required".into()));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(Error::InvalidInput(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {}",
                self.rating
            )));
        }
        if self.comments.trim().is_empty() {
            return Err(Error::InvalidInput("review comments are required".into()));
        }
        Ok(())
    }

    /// Attach an id to the draft.
    pub fn with_id(self, id: ReviewId) -> Review {
        Review {
            id,
            restaurant_id: self.restaurant_id,
            name: self.name,
            rating: self.rating,
            comments: self.comments,
            created_at: self.created_at,
        }
    }
}

fn lenient_rating<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = super::lenient_i64(deserializer)?;
    u8::try_from(value)
        .map_err(|_| serde::de::Error::custom(format!("rating out of range: {value}")))
}
