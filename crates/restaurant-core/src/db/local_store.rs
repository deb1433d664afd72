//! Restaurant and review collections on top of the local database

use std::path::Path;
use std::sync::Arc;

use libsql::{params, Connection};
use tokio::sync::{Mutex, MutexGuard};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{NewReview, Restaurant, Review, ReviewId};
use crate::util::unix_timestamp_millis;

/// Durable, indexed storage for restaurants and reviews.
///
/// Every operation runs under one lock on the connection, so each call is a
/// single transaction with respect to other callers. A store built with
/// [`LocalStore::unavailable`] stands in for hosts without persistent
/// storage.
#[derive(Clone)]
pub struct LocalStore {
    db: Option<Arc<Mutex<Database>>>,
}

impl LocalStore {
    /// Open (or create) the store at the given path.
    pub async fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::open(path).await?;
        Ok(Self::from_database(db))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::from_database(db))
    }

    /// Wrap an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Some(Arc::new(Mutex::new(db))),
        }
    }

    /// A store for hosts without persistent storage.
    pub const fn unavailable() -> Self {
        Self { db: None }
    }

    /// Whether a persistent database backs this store.
    pub const fn is_available(&self) -> bool {
        self.db.is_some()
    }

    async fn database(&self) -> Result<MutexGuard<'_, Database>> {
        match &self.db {
            Some(db) => Ok(db.lock().await),
            None => Err(Error::LocalStoreUnavailable(
                "no persistent local store in this environment".to_string(),
            )),
        }
    }

    /// Cache restaurants; ids already stored are left untouched.
    ///
    /// Returns the number of newly stored records. Without persistent storage
    /// this logs and stores nothing.
    pub async fn put_restaurants(&self, restaurants: &[Restaurant]) -> Result<usize> {
        if !self.is_available() {
            tracing::warn!("No persistent local store; skipping restaurant cache write");
            return Ok(0);
        }

        let db = self.database().await?;
        let conn = db.connection();

        conn.execute("BEGIN TRANSACTION", ()).await?;

        let mut stored = 0usize;
        for restaurant in restaurants {
            let body = match serde_json::to_string(restaurant) {
                Ok(body) => body,
                Err(e) => {
                    conn.execute("ROLLBACK", ()).await.ok();
                    return Err(e.into());
                }
            };
            match conn
                .execute(
                    "INSERT OR IGNORE INTO restaurants (id, body) VALUES (?, ?)",
                    params![restaurant.id, body],
                )
                .await
            {
                Ok(rows) => stored += usize::from(rows > 0),
                Err(e) => {
                    conn.execute("ROLLBACK", ()).await.ok();
                    return Err(e.into());
                }
            }
        }

        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        tracing::debug!(stored, total = restaurants.len(), "Cached restaurants");
        Ok(stored)
    }

    /// All cached restaurants in key order.
    pub async fn scan_restaurants(&self) -> Result<Vec<Restaurant>> {
        let db = self.database().await?;
        let mut rows = db
            .connection()
            .query("SELECT body FROM restaurants ORDER BY id ASC", ())
            .await?;

        let mut restaurants = Vec::new();
        while let Some(row) = rows.next().await? {
            let body: String = row.get(0)?;
            restaurants.push(serde_json::from_str(&body)?);
        }
        Ok(restaurants)
    }

    /// Insert one review.
    ///
    /// Without an explicit id the review is staged as pending: its id is the
    /// negated current timestamp, pushed below every stored id when that
    /// millisecond is taken so pending ids stay unique and ordered.
    pub async fn put_review(&self, draft: NewReview, id: Option<ReviewId>) -> Result<Review> {
        let db = self.database().await?;
        let conn = db.connection();

        let id = match id {
            Some(id) => {
                if review_exists(conn, id).await? {
                    return Err(Error::DuplicateId(id.get()));
                }
                id
            }
            None => next_pending_id(conn).await?,
        };

        let review = draft.with_id(id);
        let body = serde_json::to_string(&review)?;
        conn.execute(
            "INSERT INTO reviews (id, restaurant_id, body) VALUES (?, ?, ?)",
            params![review.id.get(), review.restaurant_id, body],
        )
        .await?;

        tracing::debug!(id = %review.id, restaurant_id = review.restaurant_id, "Stored review");
        Ok(review)
    }

    /// Reviews of one restaurant, looked up through the restaurant index.
    pub async fn scan_reviews_by_restaurant(&self, restaurant_id: i64) -> Result<Vec<Review>> {
        let db = self.database().await?;
        let mut rows = db
            .connection()
            .query(
                "SELECT body FROM reviews WHERE restaurant_id = ? ORDER BY id ASC",
                params![restaurant_id],
            )
            .await?;

        collect_reviews(&mut rows).await
    }

    /// All reviews in key order: pending (negative) ids first, newest first.
    pub async fn scan_reviews(&self) -> Result<Vec<Review>> {
        let db = self.database().await?;
        let mut rows = db
            .connection()
            .query("SELECT body FROM reviews ORDER BY id ASC", ())
            .await?;

        collect_reviews(&mut rows).await
    }

    /// Reviews still waiting for a sync sweep.
    pub async fn pending_reviews(&self) -> Result<Vec<Review>> {
        let db = self.database().await?;
        let mut rows = db
            .connection()
            .query("SELECT body FROM reviews WHERE id < 0 ORDER BY id ASC", ())
            .await?;

        collect_reviews(&mut rows).await
    }

    /// Remove one review.
    pub async fn delete_review(&self, id: ReviewId) -> Result<()> {
        let db = self.database().await?;
        let rows = db
            .connection()
            .execute("DELETE FROM reviews WHERE id = ?", params![id.get()])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(format!("review {id}")));
        }
        Ok(())
    }

    /// Swap a pending review for the copy the server created.
    ///
    /// Both writes share one transaction; a server copy that is already
    /// cached is kept.
    pub async fn replace_pending_review(&self, local_id: ReviewId, server: &Review) -> Result<()> {
        let body = serde_json::to_string(server)?;
        let db = self.database().await?;
        let conn = db.connection();

        conn.execute("BEGIN TRANSACTION", ()).await?;

        let deleted = match conn
            .execute("DELETE FROM reviews WHERE id = ?", params![local_id.get()])
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        };
        if deleted == 0 {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(Error::NotFound(format!("review {local_id}")));
        }

        if let Err(e) = conn
            .execute(
                "INSERT OR IGNORE INTO reviews (id, restaurant_id, body) VALUES (?, ?, ?)",
                params![server.id.get(), server.restaurant_id, body],
            )
            .await
        {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
        Ok(())
    }
}

async fn review_exists(conn: &Connection, id: ReviewId) -> Result<bool> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE id = ?)",
            params![id.get()],
        )
        .await?;

    Ok(match rows.next().await? {
        Some(row) => row.get::<i32>(0)? != 0,
        None => false,
    })
}

async fn next_pending_id(conn: &Connection) -> Result<ReviewId> {
    let candidate = ReviewId::pending_at(unix_timestamp_millis());

    let mut rows = conn
        .query("SELECT COALESCE(MIN(id), 0) FROM reviews", ())
        .await?;
    let lowest: i64 = match rows.next().await? {
        Some(row) => row.get(0)?,
        None => 0,
    };

    if lowest <= candidate.get() {
        Ok(ReviewId::new(lowest - 1))
    } else {
        Ok(candidate)
    }
}

async fn collect_reviews(rows: &mut libsql::Rows) -> Result<Vec<Review>> {
    let mut reviews = Vec::new();
    while let Some(row) = rows.next().await? {
        let body: String = row.get(0)?;
        reviews.push(serde_json::from_str(&body)?);
    }
    Ok(reviews)
}
