use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::SheetSink;
use crate::pipeline::PipelineError;
use crate::sheet::Sheet;

pub struct DelimitedFileSink {
    path: PathBuf,
    delimiter: u8,
}

impl DelimitedFileSink {
    pub fn new<P: Into<PathBuf>>(path: P, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }
}

fn write_delimited(path: &Path, delimiter: u8, sheet: &Sheet) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?;

    for row in sheet.rows() {
        wtr.write_record(row.cells.iter().map(|c| c.to_text()))?;
    }
    wtr.flush()?;
    Ok(())
}

#[async_trait]
impl SheetSink for DelimitedFileSink {
    async fn write_sheet(&self, sheet: Sheet) -> Result<(), PipelineError> {
        let path = self.path.clone();
        let delimiter = self.delimiter;
        tokio::task::spawn_blocking(move || write_delimited(&path, delimiter, &sheet))
            .await
            .map_err(|e| PipelineError::Export(format!("writer task failed: {e}")))?
            .map_err(|e| PipelineError::Export(format!("failed to write {}: {e}", self.path.display())))
    }
}
