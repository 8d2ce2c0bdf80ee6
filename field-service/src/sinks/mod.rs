pub mod delimited_file;
pub mod export;
pub mod workbook_file;

pub use delimited_file::DelimitedFileSink;
pub use export::{bill_sheet, export_file_name, reading_sheet};
pub use workbook_file::WorkbookFileSink;

use std::path::Path;

use async_trait::async_trait;

use crate::pipeline::PipelineError;
use crate::sheet::Sheet;

#[async_trait]
pub trait SheetSink: Send + Sync {
    async fn write_sheet(&self, sheet: Sheet) -> Result<(), PipelineError>;
}

/// Export target picked from a file's extension.
pub enum FileSink {
    Workbook(WorkbookFileSink),
    Delimited(DelimitedFileSink),
}

impl FileSink {
    pub fn for_path(path: &Path) -> Result<Self, PipelineError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" => Ok(Self::Workbook(WorkbookFileSink::new(path))),
            "csv" => Ok(Self::Delimited(DelimitedFileSink::new(path, b','))),
            "dat" => Ok(Self::Delimited(DelimitedFileSink::new(path, b'|'))),
            other => Err(PipelineError::Export(format!(
                "cannot export to '{other}' files ({})",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl SheetSink for FileSink {
    async fn write_sheet(&self, sheet: Sheet) -> Result<(), PipelineError> {
        match self {
            Self::Workbook(s) => s.write_sheet(sheet).await,
            Self::Delimited(s) => s.write_sheet(sheet).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Source;
    use crate::sheet::Cell;
    use crate::sources::FileSource;

    fn sample() -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        sheet.push_row(vec![Cell::text("Code"), Cell::text("Amount")]);
        sheet.push_row(vec![Cell::text("B1"), Cell::Number(1000.0)]);
        sheet.push_row(vec![Cell::text("B2"), Cell::Number(5.5)]);
        sheet
    }

    #[tokio::test]
    async fn workbook_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        FileSink::for_path(&path).unwrap().write_sheet(sample()).await.unwrap();
        let back = FileSource::for_path(&path).unwrap().load().await.unwrap();

        assert_eq!(back.name, "Sheet1");
        assert_eq!(back.rows(), sample().rows());
    }

    #[tokio::test]
    async fn csv_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        FileSink::for_path(&path).unwrap().write_sheet(sample()).await.unwrap();
        let back = FileSource::for_path(&path).unwrap().load().await.unwrap();

        let text = |sheet: &Sheet| -> Vec<Vec<String>> {
            sheet
                .rows()
                .iter()
                .map(|r| r.cells.iter().map(Cell::to_text).collect())
                .collect()
        };
        assert_eq!(text(&back), text(&sample()));
        assert_eq!(back.rows()[2].get(1).to_number(), 5.5);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            FileSink::for_path(Path::new("out.pdf")),
            Err(PipelineError::Export(_))
        ));
    }
}
