use async_trait::async_trait;
use meter_client::{RecordRepository, StoreError};

use crate::sheet::Sheet;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("could not map data. Found columns: {}. Expected: {}.", .found.join(", "), .expected.join(", "))]
    MappingFailed {
        found: Vec<String>,
        expected: Vec<String>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("export error: {0}")]
    Export(String),
}

/// Reads a whole sheet from somewhere.
#[async_trait]
pub trait Source: Send + Sync {
    async fn load(&self) -> Result<Sheet, PipelineError>;
}

/// Records mapped from a sheet, plus the sheet rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    pub records: Vec<T>,
    pub discarded_rows: Vec<usize>,
}

/// Pure translation of sheet rows into typed records.
///
/// Implementations fail with [`PipelineError::MappingFailed`] when no row
/// yields a record.
pub trait RowMapping: Send + Sync {
    type Output: Send + Sync + 'static;

    fn map_sheet(&self, sheet: &Sheet) -> Result<Mapped<Self::Output>, PipelineError>;
}

#[async_trait]
pub trait Sink<T>: Send + Sync {
    /// Persists every record or none of them; returns the assigned ids.
    async fn write(&self, records: Vec<T>) -> Result<Vec<i64>, PipelineError>;
}

/// Writes mapped records through a repository in a single `add_all`.
pub struct RepositorySink<R> {
    repo: R,
}

impl<R> RepositorySink<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> Sink<R::Record> for RepositorySink<R>
where
    R: RecordRepository,
{
    async fn write(&self, records: Vec<R::Record>) -> Result<Vec<i64>, PipelineError> {
        let ids = self.repo.add_all(&records).await?;
        metrics::counter!("import_records_stored_total", "collection" => self.repo.collection())
            .increment(ids.len() as u64);
        Ok(ids)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub sheet: String,
    pub ids: Vec<i64>,
    pub discarded_rows: Vec<usize>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.ids.len()
    }
}

pub struct Pipeline<S, M, K> {
    pub source: S,
    pub mapping: M,
    pub sink: K,
}

impl<S, M, K> Pipeline<S, M, K>
where
    S: Source,
    M: RowMapping,
    K: Sink<M::Output>,
{
    /// Load, map, then store. Nothing is written unless mapping succeeds.
    pub async fn run(self) -> Result<ImportReport, PipelineError> {
        let sheet = self.source.load().await?;

        let mapped = match self.mapping.map_sheet(&sheet) {
            Ok(m) => m,
            Err(e) => {
                metrics::counter!("import_mapping_failures_total").increment(1);
                return Err(e);
            }
        };

        for row in &mapped.discarded_rows {
            tracing::debug!(sheet = %sheet.name, row, "row discarded during import");
        }
        metrics::counter!("import_rows_discarded_total").increment(mapped.discarded_rows.len() as u64);

        let ids = self.sink.write(mapped.records).await?;

        tracing::info!(
            sheet = %sheet.name,
            imported = ids.len(),
            discarded = mapped.discarded_rows.len(),
            "import committed"
        );

        Ok(ImportReport {
            sheet: sheet.name,
            ids,
            discarded_rows: mapped.discarded_rows,
        })
    }
}
