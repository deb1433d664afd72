//! Database connection management

use std::path::Path;

use libsql::{Builder, Connection, Database as LibSqlDatabase};

use super::migrations;
use crate::error::Result;

/// Database wrapper for a local libSQL connection
pub struct Database {
    _db: LibSqlDatabase,
    conn: Connection,
}

impl Database {
    /// Open a database at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy().to_string();
        let db = Builder::new_local(&path_str).build().await?;
        let conn = db.connect()?;

        let database = Self { _db: db, conn };
        database.configure().await?;
        database.migrate().await?;
        tracing::debug!("Opened local store at {}", path.display());
        Ok(database)
    }

    /// Open an in-memory database (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        let conn = db.connect()?;

        let database = Self { _db: db, conn };
        database.configure().await?;
        database.migrate().await?;
        Ok(database)
    }

    /// Configure `SQLite` for a single local writer
    async fn configure(&self) -> Result<()> {
        // journal_mode answers with a row, which libsql reports as an error on execute
        self.conn
            .execute("PRAGMA journal_mode = WAL;", ())
            .await
            .ok();
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        Ok(())
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        migrations::run(&self.conn).await
    }

    /// Current schema version of the opened database
    pub async fn schema_version(&self) -> Result<i32> {
        migrations::get_version(&self.conn).await
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CURRENT_VERSION;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), CURRENT_VERSION);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("restaurants.db");

        let db = Database::open(&db_path).await.unwrap();
        assert!(db_path.exists());
        assert_eq!(db.schema_version().await.unwrap(), CURRENT_VERSION);
    }

    #[tokio::test]
    async fn test_reopen_keeps_schema_version() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("restaurants.db");

        drop(Database::open(&db_path).await.unwrap());
        let reopened = Database::open(&db_path).await.unwrap();
        assert_eq!(reopened.schema_version().await.unwrap(), CURRENT_VERSION);
    }
}
