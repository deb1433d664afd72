//! Version-tagged response bucket stored in the `cache_entries` table

use std::path::Path;
use std::sync::Arc;

use libsql::params;
use tokio::sync::Mutex;

use super::CachedResponse;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::util::unix_timestamp_millis;

/// Name of the bucket for a cache version.
pub fn bucket_name(version: u32) -> String {
    format!("restaurants-app-{version}")
}

/// One named set of cached responses keyed by request path and query
#[derive(Clone)]
pub struct CacheBucket {
    db: Arc<Mutex<Database>>,
    name: String,
}

impl CacheBucket {
    pub async fn open_path(path: impl AsRef<Path>, version: u32) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?, version))
    }

    pub async fn open_in_memory(version: u32) -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?, version))
    }

    pub fn new(db: Database, version: u32) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            name: bucket_name(version),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored response for `key`, if any.
    pub async fn lookup(&self, key: &str) -> Result<Option<CachedResponse>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT status, content_type, body FROM cache_entries
                 WHERE bucket = ? AND request_key = ?",
                params![self.name.as_str(), key],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let status: i64 = row.get(0)?;
        Ok(Some(CachedResponse {
            status: u16::try_from(status)
                .map_err(|_| Error::LocalStore(format!("invalid cached status {status}")))?,
            content_type: row.get(1)?,
            body: row.get(2)?,
        }))
    }

    /// Store or replace the response for `key`.
    pub async fn put(&self, key: &str, response: &CachedResponse) -> Result<()> {
        self.put_all(&[(key.to_string(), response.clone())]).await
    }

    /// Store every entry or none of them.
    pub async fn put_all(&self, entries: &[(String, CachedResponse)]) -> Result<()> {
        let db = self.db.lock().await;
        let conn = db.connection();
        let stored_at = unix_timestamp_millis();

        conn.execute("BEGIN TRANSACTION", ()).await?;
        for (key, response) in entries {
            if let Err(e) = conn
                .execute(
                    "INSERT OR REPLACE INTO cache_entries
                        (bucket, request_key, status, content_type, body, stored_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    params![
                        self.name.as_str(),
                        key.as_str(),
                        i64::from(response.status),
                        response.content_type.as_str(),
                        response.body.clone(),
                        stored_at
                    ],
                )
                .await
            {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }
        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
        Ok(())
    }

    /// Request keys held by this bucket, sorted.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT request_key FROM cache_entries WHERE bucket = ? ORDER BY request_key",
                params![self.name.as_str()],
            )
            .await?;

        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(row.get::<String>(0)?);
        }
        Ok(keys)
    }
}
