pub mod delimited_file;
pub mod workbook_file;

pub use delimited_file::DelimitedFileSource;
pub use workbook_file::WorkbookFileSource;

use std::path::Path;

use async_trait::async_trait;

use crate::pipeline::{PipelineError, Source};
use crate::sheet::Sheet;

/// Source picked from a file's extension.
pub enum FileSource {
    Workbook(WorkbookFileSource),
    Delimited(DelimitedFileSource),
}

impl FileSource {
    pub fn for_path(path: &Path) -> Result<Self, PipelineError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
                Ok(Self::Workbook(WorkbookFileSource::new(path)))
            }
            "csv" => Ok(Self::Delimited(DelimitedFileSource::new(path, b','))),
            "dat" => Ok(Self::Delimited(DelimitedFileSource::new(path, b'|'))),
            other => Err(PipelineError::Source(format!(
                "unsupported file type '{other}' for {}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl Source for FileSource {
    async fn load(&self) -> Result<Sheet, PipelineError> {
        match self {
            Self::Workbook(s) => s.load().await,
            Self::Delimited(s) => s.load().await,
        }
    }
}
