//! Database migrations

use libsql::Connection;

use crate::error::Result;

/// Current schema version
pub const CURRENT_VERSION: i32 = 3;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version < 1 {
        migrate_v1(conn).await?;
    }
    if version < 2 {
        migrate_v2(conn).await?;
    }
    if version < 3 {
        migrate_v3(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
pub async fn get_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

/// Migration to version 1: restaurant collection
async fn migrate_v1(conn: &Connection) -> Result<()> {
    apply(
        conn,
        1,
        &[
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            "CREATE TABLE IF NOT EXISTS restaurants (
                id INTEGER PRIMARY KEY,
                body TEXT NOT NULL
            )",
            "INSERT INTO schema_version (version) VALUES (1)",
        ],
    )
    .await
}

/// Migration to version 2: review collection with restaurant index
async fn migrate_v2(conn: &Connection) -> Result<()> {
    apply(
        conn,
        2,
        &[
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                restaurant_id INTEGER NOT NULL,
                body TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_reviews_restaurant_id ON reviews(restaurant_id)",
            "INSERT INTO schema_version (version) VALUES (2)",
        ],
    )
    .await
}

/// Migration to version 3: offline response cache buckets
async fn migrate_v3(conn: &Connection) -> Result<()> {
    apply(
        conn,
        3,
        &[
            "CREATE TABLE IF NOT EXISTS cache_entries (
                bucket TEXT NOT NULL,
                request_key TEXT NOT NULL,
                status INTEGER NOT NULL,
                content_type TEXT NOT NULL DEFAULT '',
                body BLOB NOT NULL,
                stored_at INTEGER NOT NULL,
                PRIMARY KEY (bucket, request_key)
            )",
            "CREATE INDEX IF NOT EXISTS idx_cache_entries_bucket ON cache_entries(bucket)",
            "INSERT INTO schema_version (version) VALUES (3)",
        ],
    )
    .await
}

/// Run a migration's statements in one transaction.
async fn apply(conn: &Connection, version: i32, statements: &[&str]) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated local store to version {version}");
    Ok(())
}
