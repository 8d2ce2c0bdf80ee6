use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rust_xlsxwriter::{Workbook, XlsxError};

use super::SheetSink;
use crate::pipeline::PipelineError;
use crate::sheet::{Cell, Sheet};

/// Writes a single-sheet `.xlsx` workbook.
pub struct WorkbookFileSink {
    path: PathBuf,
}

impl WorkbookFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn write_workbook(path: &Path, sheet: &Sheet) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (r, row) in sheet.rows().iter().enumerate() {
            let r = r as u32;
            for (c, cell) in row.cells.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                }
            }
        }
    }
    workbook.save(path)
}

#[async_trait]
impl SheetSink for WorkbookFileSink {
    async fn write_sheet(&self, sheet: Sheet) -> Result<(), PipelineError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_workbook(&path, &sheet))
            .await
            .map_err(|e| PipelineError::Export(format!("workbook writer task failed: {e}")))?
            .map_err(|e| PipelineError::Export(format!("failed to write {}: {e}", self.path.display())))
    }
}
