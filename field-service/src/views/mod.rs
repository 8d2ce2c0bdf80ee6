//! Controllers behind the four screens: overview, reading entry, bill
//! collection and the activity log.
//!
//! Edits are optimistic. The in-memory list changes first (`Pending`), then
//! the store is written. A failed write puts the record into `Reverting`,
//! restores the previous value and reports an error [`Notice`].

pub mod activity;
pub mod bills;
pub mod readings;

pub use activity::{ActivityKind, ActivityView};
pub use bills::BillsView;
pub use readings::{ReadingField, ReadingsView};

use std::collections::HashMap;
use std::fmt;

use meter_client::domain::{Bill, MeterReading};
use meter_client::{BillRepository, LogRepository, ReadingRepository, RecordRepository, StoreError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message for the user about the outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EditState {
    #[default]
    Clean,
    Pending,
    Reverting,
}

pub trait Keyed {
    fn key(&self) -> Option<i64>;
}

impl Keyed for MeterReading {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

impl Keyed for Bill {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Displayed records plus the edit state of each one.
pub struct OptimisticList<T> {
    items: Vec<T>,
    states: HashMap<i64, EditState>,
}

impl<T: Keyed + Clone> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            states: HashMap::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|i| i.key() == Some(id))
    }

    pub fn state(&self, id: i64) -> EditState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    fn replace(&mut self, record: T) -> Option<T> {
        let id = record.key()?;
        let slot = self.items.iter_mut().find(|i| i.key() == Some(id))?;
        Some(std::mem::replace(slot, record))
    }

    /// Shows `updated` in place of the stored record; returns the record it
    /// replaced.
    fn apply(&mut self, updated: T) -> Option<T> {
        let id = updated.key()?;
        let previous = self.replace(updated)?;
        self.states.insert(id, EditState::Pending);
        Some(previous)
    }

    fn settle(&mut self, id: i64) {
        self.states.remove(&id);
    }

    fn revert(&mut self, previous: T) {
        let Some(id) = previous.key() else { return };
        self.states.insert(id, EditState::Reverting);
        self.replace(previous);
        self.states.remove(&id);
    }
}

pub(crate) struct Edit<'a, T> {
    pub updated: T,
    pub log: Option<(&'a str, String)>,
    pub success: String,
    pub failure: &'a str,
}

/// Applies `edit` optimistically and writes it through `repo`, appending the
/// activity entry if one is given. Any failure restores the previous record
/// in memory; a failed log append also writes the previous record back.
pub(crate) async fn commit_edit<R>(
    repo: &R,
    logs: &LogRepository,
    list: &mut OptimisticList<R::Record>,
    edit: Edit<'_, R::Record>,
) -> Option<Notice>
where
    R: RecordRepository,
    R::Record: Keyed + Clone,
{
    let id = edit.updated.key()?;
    let previous = list.apply(edit.updated.clone())?;

    if let Err(e) = repo.update(&edit.updated).await {
        tracing::warn!(collection = repo.collection(), id, error = %e, "update failed, reverting");
        metrics::counter!("edit_reverted_total", "collection" => repo.collection()).increment(1);
        list.revert(previous);
        return Some(Notice::error(edit.failure));
    }

    if let Some((action, details)) = &edit.log {
        if let Err(e) = logs.add(action, details).await {
            tracing::warn!(collection = repo.collection(), id, error = %e, "activity log failed, rolling back");
            if let Err(e) = repo.update(&previous).await {
                tracing::error!(collection = repo.collection(), id, error = %e, "rollback write failed");
            }
            metrics::counter!("edit_reverted_total", "collection" => repo.collection()).increment(1);
            list.revert(previous);
            return Some(Notice::error(edit.failure));
        }
    }

    list.settle(id);
    metrics::counter!("edit_committed_total", "collection" => repo.collection()).increment(1);
    Some(Notice::success(edit.success))
}

/// Notice for an import whose rows are already committed. A failed reload
/// only leaves the displayed list stale.
pub(crate) fn imported_notice(imported: usize, noun: &str, reload: Result<(), StoreError>) -> Notice {
    match reload {
        Ok(()) => Notice::success(format!("Successfully imported {imported} {noun}")),
        Err(e) => {
            tracing::warn!(error = %e, "reload after import failed");
            Notice::success(format!(
                "Successfully imported {imported} {noun}, but reloading the list failed: {e}"
            ))
        }
    }
}

/// Erases every reading, bill and log entry, in that order.
pub async fn reset_all(
    readings: &ReadingRepository,
    bills: &BillRepository,
    logs: &LogRepository,
) -> Notice {
    let result = async {
        readings.clear_all().await?;
        bills.clear_all().await?;
        logs.clear_all().await
    }
    .await;

    match result {
        Ok(()) => {
            tracing::warn!("all local data cleared");
            Notice::success("All data cleared successfully")
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to clear data");
            Notice::error("Failed to clear data")
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use meter_client::StoreClient;
    use tempfile::TempDir;

    pub async fn temp_store() -> (TempDir, StoreClient) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StoreClient::open(dir.path().join("views.sqlite"), 1)
            .await
            .expect("open store");
        (dir, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::temp_store;

    fn reading(id: i64, name: &str) -> MeterReading {
        MeterReading {
            id: Some(id),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn optimistic_list_apply_and_revert() {
        let mut list = OptimisticList::new(vec![reading(1, "A"), reading(2, "B")]);

        let previous = list.apply(reading(2, "B2")).unwrap();
        assert_eq!(previous.name, "B");
        assert_eq!(list.state(2), EditState::Pending);
        assert_eq!(list.get(2).unwrap().name, "B2");

        list.revert(previous);
        assert_eq!(list.state(2), EditState::Clean);
        assert_eq!(list.get(2).unwrap().name, "B");
    }

    #[test]
    fn apply_ignores_unknown_or_unsaved_records() {
        let mut list = OptimisticList::new(vec![reading(1, "A")]);
        assert!(list.apply(reading(9, "X")).is_none());
        assert!(list.apply(MeterReading::default()).is_none());
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn import_notice_stays_successful_when_reload_fails() {
        assert_eq!(
            imported_notice(3, "readings", Ok(())),
            Notice::success("Successfully imported 3 readings")
        );

        let notice = imported_notice(2, "bills", Err(StoreError::Unavailable("pool closed".into())));
        assert!(!notice.is_error());
        assert!(notice.message.starts_with("Successfully imported 2 bills"));
        assert!(notice.message.contains("reloading the list failed"));
    }

    #[tokio::test]
    async fn reset_clears_every_collection() {
        let (_dir, store) = temp_store().await;
        let readings = ReadingRepository::new(store.clone());
        let bills = BillRepository::new(store.clone());
        let logs = LogRepository::new(store);

        readings.add_all(&[MeterReading::default()]).await.unwrap();
        bills.add_all(&[Bill::default()]).await.unwrap();
        logs.add("Update", "x").await.unwrap();

        let notice = reset_all(&readings, &bills, &logs).await;
        assert!(!notice.is_error());
        assert!(readings.get_all().await.unwrap().is_empty());
        assert!(bills.get_all().await.unwrap().is_empty());
        assert!(logs.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_reports_failure() {
        let (_dir, store) = temp_store().await;
        let readings = ReadingRepository::new(store.clone());
        let bills = BillRepository::new(store.clone());
        let logs = LogRepository::new(store.clone());
        store.close().await;

        let notice = reset_all(&readings, &bills, &logs).await;
        assert_eq!(notice, Notice::error("Failed to clear data"));
    }
}
