use std::path::PathBuf;

use async_trait::async_trait;

use crate::pipeline::{PipelineError, Source};
use crate::sheet::{Cell, Sheet};

/// Delimited text file (`,` for `.csv`, `|` for `.dat`) read as a one-sheet grid.
///
/// No header handling happens here; the first line is just row 1.
pub struct DelimitedFileSource {
    path: PathBuf,
    delimiter: u8,
}

impl DelimitedFileSource {
    pub fn new<P: Into<PathBuf>>(path: P, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }
}

/// Delimited files carry no cell types, so every non-empty field is text.
/// Mappings that need amounts parse them with [`Cell::to_number`].
fn field_cell(field: &str) -> Cell {
    if field.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(field.to_string())
    }
}

fn read_grid(path: &PathBuf, delimiter: u8) -> Result<Vec<Vec<Cell>>, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| PipelineError::Source(format!("failed to open {}: {e}", path.display())))?;

    let mut grid = Vec::new();
    for result in rdr.records() {
        let record =
            result.map_err(|e| PipelineError::Source(format!("failed to read record: {e}")))?;
        grid.push(record.iter().map(field_cell).collect());
    }
    Ok(grid)
}

#[async_trait]
impl Source for DelimitedFileSource {
    async fn load(&self) -> Result<Sheet, PipelineError> {
        let path = self.path.clone();
        let delimiter = self.delimiter;
        let grid = tokio::task::spawn_blocking(move || read_grid(&path, delimiter))
            .await
            .map_err(|e| PipelineError::Source(format!("reader task failed: {e}")))??;

        let name = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Sheet1".to_string());

        Ok(Sheet::from_grid(name, grid, 1))
    }
}
