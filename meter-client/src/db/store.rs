use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::migrations;
use crate::error::StoreError;

pub const DB_NAME: &str = "MeterAppDB";
pub const DB_VERSION: i64 = 6;

/// Handle to the local database file.
///
/// Construct once at startup and hand clones to the repositories; all clones
/// share one connection pool. Call [`StoreClient::close`] on shutdown.
#[derive(Clone)]
pub struct StoreClient {
    pool: SqlitePool,
    path: PathBuf,
}

impl StoreClient {
    /// Opens (creating if needed) the database at `path` and brings its schema
    /// to [`DB_VERSION`].
    pub async fn open<P: AsRef<Path>>(path: P, max_connections: u32) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("cannot open {}: {e}", path.display())))?;

        migrations::upgrade(&pool, DB_VERSION).await?;

        tracing::info!(path = %path.display(), version = DB_VERSION, "store opened");

        Ok(Self { pool, path })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version currently stamped in the file.
    pub async fn version(&self) -> Result<i64, StoreError> {
        migrations::current_version(&self.pool).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!(path = %self.path.display(), "store closed");
    }
}
