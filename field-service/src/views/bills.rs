use std::path::Path;

use meter_client::domain::{iso_timestamp, Bill, PaymentStatus};
use meter_client::{BillRepository, LogRepository, RecordRepository, StoreError};
use time::OffsetDateTime;

use super::{commit_edit, imported_notice, Edit, EditState, Notice, OptimisticList};
use crate::dashboard::collected_usd;
use crate::pipeline::{Pipeline, RepositorySink};
use crate::search::{filter_bills, BillStatus, SearchQuery};
use crate::sinks::{bill_sheet, FileSink, SheetSink};
use crate::sources::FileSource;
use crate::transform::BillRowMapping;

pub struct BillsView {
    repo: BillRepository,
    logs: LogRepository,
    list: OptimisticList<Bill>,
}

impl BillsView {
    pub async fn load(repo: BillRepository, logs: LogRepository) -> Result<Self, StoreError> {
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

    pub fn bills(&self) -> &[Bill] {
        self.list.items()
    }

    pub fn state(&self, id: i64) -> EditState {
        self.list.state(id)
    }

    pub fn filtered(&self, query: &str, status: BillStatus) -> Vec<&Bill> {
        filter_bills(self.list.items(), &SearchQuery::parse(query), status)
    }

    pub fn total_collected_usd(&self) -> f64 {
        collected_usd(self.list.items())
    }

    pub async fn import(&mut self, path: &Path) -> Notice {
        let result = async {
            let pipeline = Pipeline {
                source: FileSource::for_path(path)?,
                mapping: BillRowMapping,
                sink: RepositorySink::new(self.repo.clone()),
            };
            pipeline.run().await
        }
        .await;

        match result {
            Ok(report) => {
                let reload = self.reload().await;
                imported_notice(report.imported(), "bills", reload)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "bill import failed");
                Notice::error(format!("Import failed: {e}"))
            }
        }
    }

    pub async fn export(&self, target: &Path) -> Notice {
        if self.list.items().is_empty() {
            return Notice::error("No bills to export");
        }

        let result = async {
            FileSink::for_path(target)?
                .write_sheet(bill_sheet(self.list.items()))
                .await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(path = %target.display(), count = self.list.items().len(), "bills exported");
                Notice::success("Bills exported successfully")
            }
            Err(e) => Notice::error(format!("Export failed: {e}")),
        }
    }

    /// Flips paid/unpaid. Paying stamps the payment date; reverting to
    /// unpaid clears it.
    pub async fn toggle_payment(&mut self, id: i64) -> Option<Notice> {
        let current = self.list.get(id)?;

        let mut updated = current.clone();
        updated.payment_status = current.payment_status.toggled();
        updated.payment_date = match updated.payment_status {
            PaymentStatus::Paid => Some(iso_timestamp(OffsetDateTime::now_utc())),
            PaymentStatus::Unpaid => None,
        };

        let marked = match updated.payment_status {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Unpaid => "UNPAID",
        };
        let success = match updated.payment_status {
            PaymentStatus::Paid => "Marked as Paid",
            PaymentStatus::Unpaid => "Marked as Unpaid",
        };
        let details = format!("\"{}\" marked as {marked}", current.name);

        commit_edit(
            &self.repo,
            &self.logs,
            &mut self.list,
            Edit {
                updated,
                log: Some(("Payment", details)),
                success: success.to_string(),
                failure: "Failed to update status",
            },
        )
        .await
    }
}
