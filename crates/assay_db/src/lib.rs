//! Database gateway for the AssayFlow servers.
//!
//! This crate is the single access path to the assessment, catalog and
//! viewer stores. Each public method stands in for one logical stored
//! procedure of the hosted database; handlers never touch SQL directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use assay_db::{AssayDb, Result};
//!
//! let db = AssayDb::open("~/.assayflow/assayflow.sqlite3").await?;
//!
//! let platforms = db.select_platform_version("platform-version-uuid").await?;
//! let records = db.select_execution_record("exec-run-uuid").await?;
//! ```
//!
//! Write operations return `Ok(bool)`: `false` means the store reported an
//! application-level failure (e.g. no row to update), which callers turn
//! into an error response. Driver faults surface as [`DbError`].

mod error;
mod schema;
mod types;

// Method implementations organized by store
mod assessment;
mod catalog;
mod viewer;

pub use error::{DbError, Result};
pub use types::*;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Gateway to the AssayFlow database.
///
/// Connections come from a pool and are released on every path, success or
/// error, when the acquired handle drops.
#[derive(Clone)]
pub struct AssayDb {
    pool: SqlitePool,
}

impl AssayDb {
    /// Open or create a database at the given path.
    ///
    /// Creates all tables if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        info!(path = %path.display(), "Database opened");

        Ok(db)
    }

    /// Open an existing database (fails if not exists).
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DbError::NotFound(format!(
                "Database not found: {}",
                path.display()
            )));
        }

        let url = format!("sqlite:{}?mode=rw", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        Ok(Self { pool })
    }

    /// Get the underlying connection pool (escape hatch; test seeding).
    ///
    /// Prefer using the typed methods instead.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_database() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("test.db");

        let db = AssayDb::open(&db_path).await.unwrap();
        assert!(db_path.exists());

        db.close().await;
    }

    #[tokio::test]
    async fn test_open_existing_fails_if_not_exists() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("nonexistent.db");

        let result = AssayDb::open_existing(&db_path).await;
        assert!(result.is_err());
    }
}
