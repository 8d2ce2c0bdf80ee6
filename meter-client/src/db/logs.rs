use sqlx::{sqlite::SqliteRow, Row};
use time::OffsetDateTime;

use super::StoreClient;
use crate::domain::{iso_timestamp, LogEntry};
use crate::error::StoreError;

const COLLECTION: &str = "logs";

/// Append-only activity log.
#[derive(Clone)]
pub struct LogRepository {
    store: StoreClient,
}

fn entry_from_row(row: SqliteRow) -> Result<LogEntry, sqlx::Error> {
    Ok(LogEntry {
        id: row.try_get("id")?,
        action: row.try_get("action")?,
        details: row.try_get("details")?,
        timestamp: row.try_get("timestamp")?,
    })
}

impl LogRepository {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Appends an entry stamped with the current time.
    pub async fn add(&self, action: &str, details: &str) -> Result<LogEntry, StoreError> {
        self.add_at(action, details, OffsetDateTime::now_utc()).await
    }

    pub async fn add_at(
        &self,
        action: &str,
        details: &str,
        at: OffsetDateTime,
    ) -> Result<LogEntry, StoreError> {
        let timestamp = iso_timestamp(at);

        let result = sqlx::query("INSERT INTO logs (action, details, timestamp) VALUES (?, ?, ?)")
            .bind(action)
            .bind(details)
            .bind(&timestamp)
            .execute(self.store.pool())
            .await
            .map_err(StoreError::write(COLLECTION))?;

        tracing::debug!(action, "activity logged");

        Ok(LogEntry {
            id: Some(result.last_insert_rowid()),
            action: action.to_string(),
            details: details.to_string(),
            timestamp,
        })
    }

    /// Every entry, oldest first.
    pub async fn get_all(&self) -> Result<Vec<LogEntry>, StoreError> {
        sqlx::query("SELECT * FROM logs ORDER BY timestamp, id")
            .try_map(entry_from_row)
            .fetch_all(self.store.pool())
            .await
            .map_err(StoreError::read(COLLECTION))
    }

    pub async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM logs")
            .execute(self.store.pool())
            .await
            .map_err(StoreError::write(COLLECTION))?;

        tracing::info!("logs cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_store;
    use time::macros::datetime;

    #[tokio::test]
    async fn entries_come_back_in_timestamp_order() {
        let (_dir, store) = temp_store().await;
        let logs = LogRepository::new(store);

        logs.add_at("Payment", "\"Jane\" marked as PAID", datetime!(2024-05-02 10:00 UTC))
            .await
            .unwrap();
        logs.add_at("Update", "Meter for user \"John\" was logged as \"12\"", datetime!(2024-05-01 10:00 UTC))
            .await
            .unwrap();

        let all = logs.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].action, "Update");
        assert_eq!(all[0].timestamp, "2024-05-01T10:00:00.000Z");
        assert_eq!(all[1].action, "Payment");
    }

    #[tokio::test]
    async fn add_returns_stored_entry() {
        let (_dir, store) = temp_store().await;
        let logs = LogRepository::new(store);

        let entry = logs.add("Update", "details").await.unwrap();
        assert!(entry.id.is_some());
        assert!(entry.timestamp.ends_with('Z'));

        assert_eq!(logs.get_all().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn add_propagates_write_failure() {
        let (_dir, store) = temp_store().await;
        let logs = LogRepository::new(store.clone());
        store.close().await;

        let err = logs.add("Update", "details").await.unwrap_err();
        assert!(err.is_write_failure());
    }

    #[tokio::test]
    async fn clear_all_removes_entries() {
        let (_dir, store) = temp_store().await;
        let logs = LogRepository::new(store);
        logs.add("Update", "details").await.unwrap();

        logs.clear_all().await.unwrap();
        assert!(logs.get_all().await.unwrap().is_empty());
    }
}
