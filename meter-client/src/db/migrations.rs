//! Schema versions of the local store.
//!
//! The version lives in SQLite's `user_version` header. Opening a file whose
//! version is behind [`DB_VERSION`](super::DB_VERSION) runs every registered
//! migration above that version, in order, inside one transaction.
//!
//! The only migration today recreates all three collections, so upgrading a
//! file drops every stored reading, bill and log entry. Register a new entry
//! here to change that policy.

use futures::future::BoxFuture;
use sqlx::{sqlite::SqlitePool, SqliteConnection};

use crate::error::StoreError;

pub type MigrationFn = fn(&mut SqliteConnection) -> BoxFuture<'_, Result<(), sqlx::Error>>;

pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub apply: MigrationFn,
}

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 6,
    description: "recreate readings, bills and logs with auto-increment keys (drops existing records)",
    apply: recreate_collections,
}];

const RECREATE_COLLECTIONS: &[&str] = &[
    "DROP TABLE IF EXISTS readings",
    "DROP TABLE IF EXISTS bills",
    "DROP TABLE IF EXISTS logs",
    r#"
    CREATE TABLE readings (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        code            TEXT    NOT NULL,
        installation_id TEXT    NOT NULL,
        branch_id       TEXT    NOT NULL,
        compteur        TEXT    NOT NULL,
        inx_dep         TEXT    NOT NULL,
        meter_value     TEXT,
        name            TEXT    NOT NULL,
        obs             TEXT    NOT NULL,
        usage           TEXT    NOT NULL,
        seq             TEXT    NOT NULL,
        reading_date    TEXT,
        flagged         INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX readings_by_installation ON readings (installation_id)",
    "CREATE INDEX readings_by_code ON readings (code)",
    "CREATE INDEX readings_by_branch ON readings (branch_id)",
    "CREATE INDEX readings_by_flagged ON readings (flagged)",
    r#"
    CREATE TABLE bills (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        code            TEXT    NOT NULL,
        branch_id       TEXT    NOT NULL,
        installation_id TEXT    NOT NULL,
        name            TEXT    NOT NULL,
        bill_lbp        REAL    NOT NULL,
        bill_usd        REAL    NOT NULL,
        payment_status  TEXT    NOT NULL,
        payment_date    TEXT
    )
    "#,
    "CREATE INDEX bills_by_installation ON bills (installation_id)",
    "CREATE INDEX bills_by_code ON bills (code)",
    "CREATE INDEX bills_by_branch ON bills (branch_id)",
    "CREATE INDEX bills_by_status ON bills (payment_status)",
    r#"
    CREATE TABLE logs (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        action    TEXT NOT NULL,
        details   TEXT NOT NULL,
        timestamp TEXT NOT NULL
    )
    "#,
    "CREATE INDEX logs_by_timestamp ON logs (timestamp)",
];

fn recreate_collections(conn: &mut SqliteConnection) -> BoxFuture<'_, Result<(), sqlx::Error>> {
    Box::pin(async move {
        for statement in RECREATE_COLLECTIONS.iter().copied() {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        Ok(())
    })
}

fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

pub async fn current_version(pool: &SqlitePool) -> Result<i64, StoreError> {
    sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(unavailable)
}

/// Brings the file at `pool` up to `target`.
///
/// Fails with [`StoreError::Unavailable`] when the file is newer than
/// `target`; an older binary never touches a newer schema.
pub async fn upgrade(pool: &SqlitePool, target: i64) -> Result<(), StoreError> {
    let current = current_version(pool).await?;

    if current > target {
        return Err(StoreError::Unavailable(format!(
            "store is at version {current}, newer than supported version {target}"
        )));
    }
    if current == target {
        return Ok(());
    }

    let mut tx = pool.begin().await.map_err(unavailable)?;

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current && m.version <= target)
    {
        tracing::warn!(
            from = current,
            to = migration.version,
            "applying store migration: {}",
            migration.description
        );
        (migration.apply)(&mut *tx).await.map_err(unavailable)?;
    }

    let stamp = format!("PRAGMA user_version = {target}");
    sqlx::query(&stamp)
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

    tx.commit().await.map_err(unavailable)?;

    Ok(())
}
