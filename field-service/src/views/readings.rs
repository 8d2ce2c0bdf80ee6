use std::path::Path;

use meter_client::domain::{iso_timestamp, MeterReading};
use meter_client::{LogRepository, ReadingRepository, RecordRepository, StoreError};
use time::OffsetDateTime;

use super::{commit_edit, imported_notice, Edit, EditState, Notice, OptimisticList};
use crate::pipeline::{Pipeline, RepositorySink};
use crate::search::{filter_readings, ReadingStatus, SearchQuery};
use crate::sinks::{reading_sheet, FileSink, SheetSink};
use crate::sources::FileSource;
use crate::transform::ReadingRowMapping;

/// Fields an agent edits on a reading card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingField {
    MeterValue,
    Obs,
}

pub struct ReadingsView {
    repo: ReadingRepository,
    logs: LogRepository,
    list: OptimisticList<MeterReading>,
}

impl ReadingsView {
    pub async fn load(repo: ReadingRepository, logs: LogRepository) -> Result<Self, StoreError> {
        let items = repo.get_all().await?;
        Ok(Self {
            repo,
            logs,
            list: OptimisticList::new(items),
        })
    }

    pub async fn reload(&mut self) -> Result<(), StoreError> {
        self.list = OptimisticList::new(self.repo.get_all().await?);
        Ok(())
    }

    pub fn readings(&self) -> &[MeterReading] {
        self.list.items()
    }

    pub fn state(&self, id: i64) -> EditState {
        self.list.state(id)
    }

    pub fn filtered(&self, query: &str, status: ReadingStatus) -> Vec<&MeterReading> {
        filter_readings(self.list.items(), &SearchQuery::parse(query), status)
    }

    /// Imports a route sheet and reloads the list.
    pub async fn import(&mut self, path: &Path) -> Notice {
        let result = async {
            let pipeline = Pipeline {
                source: FileSource::for_path(path)?,
                mapping: ReadingRowMapping,
                sink: RepositorySink::new(self.repo.clone()),
            };
            pipeline.run().await
        }
        .await;

        match result {
            Ok(report) => {
                let reload = self.reload().await;
                imported_notice(report.imported(), "readings", reload)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "reading import failed");
                Notice::error(format!("Import failed: {e}"))
            }
        }
    }

    pub async fn export(&self, target: &Path) -> Notice {
        if self.list.items().is_empty() {
            return Notice::error("No readings to export");
        }

        let result = async {
            FileSink::for_path(target)?
                .write_sheet(reading_sheet(self.list.items()))
                .await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(path = %target.display(), count = self.list.items().len(), "readings exported");
                Notice::success("Readings exported successfully")
            }
            Err(e) => Notice::error(format!("Export failed: {e}")),
        }
    }

    /// Records a field edit. Unknown ids and unchanged values are ignored.
    ///
    /// A non-empty meter value stamps `reading_date`; clearing it resets the
    /// date. Meter values are also written to the activity log.
    pub async fn set_field(&mut self, id: i64, field: ReadingField, value: &str) -> Option<Notice> {
        let current = self.list.get(id)?;

        let mut updated = current.clone();
        let log = match field {
            ReadingField::MeterValue => {
                if current.meter_value.as_deref().unwrap_or_default() == value {
                    return None;
                }
                updated.meter_value = Some(value.to_string());
                updated.reading_date =
                    (!value.is_empty()).then(|| iso_timestamp(OffsetDateTime::now_utc()));
                Some((
                    "Update",
                    format!("Meter for user \"{}\" was logged as \"{}\"", current.name, value),
                ))
            }
            ReadingField::Obs => {
                if current.obs == value {
                    return None;
                }
                updated.obs = value.to_string();
                None
            }
        };

        commit_edit(
            &self.repo,
            &self.logs,
            &mut self.list,
            Edit {
                updated,
                log,
                success: "Reading saved".to_string(),
                failure: "Failed to save reading",
            },
        )
        .await
    }

    pub async fn toggle_flag(&mut self, id: i64) -> Option<Notice> {
        let mut updated = self.list.get(id)?.clone();
        updated.flagged = !updated.flagged;
        let success = if updated.flagged {
            "Reading flagged"
        } else {
            "Flag cleared"
        };

        commit_edit(
            &self.repo,
            &self.logs,
            &mut self.list,
            Edit {
                updated,
                log: None,
                success: success.to_string(),
                failure: "Failed to save reading",
            },
        )
        .await
    }
}
