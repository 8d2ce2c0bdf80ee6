use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};

use crate::pipeline::{PipelineError, Source};
use crate::sheet::{Cell, Sheet};

/// `.xlsx` / `.xls` / `.ods` workbook. Only the first sheet is read.
pub struct WorkbookFileSource {
    path: PathBuf,
}

impl WorkbookFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

fn read_first_sheet(path: &Path) -> Result<Sheet, PipelineError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        PipelineError::Source(format!("failed to open workbook {}: {e}", path.display()))
    })?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::Source(format!("workbook {} has no sheets", path.display())))?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| PipelineError::Source(format!("failed to read sheet '{name}': {e}")))?;

    // The range starts at the first used cell; pad back to A1 so positions hold.
    let (row0, col0) = range.start().unwrap_or((0, 0));
    let grid = range
        .rows()
        .map(|row| {
            std::iter::repeat(Cell::Empty)
                .take(col0 as usize)
                .chain(row.iter().map(cell_from_data))
                .collect()
        })
        .collect();

    Ok(Sheet::from_grid(name, grid, row0 as usize + 1))
}

#[async_trait]
impl Source for WorkbookFileSource {
    async fn load(&self) -> Result<Sheet, PipelineError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_first_sheet(&path))
            .await
            .map_err(|e| PipelineError::Source(format!("workbook reader task failed: {e}")))?
    }
}
