use meter_client::domain::LogEntry;
use meter_client::{LogRepository, StoreError};
use serde::Serialize;

/// Icon category for a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Payment,
    Update,
    Other,
}

impl ActivityKind {
    pub fn classify(action: &str) -> Self {
        let action = action.to_lowercase();
        if action.contains("payment") || action.contains("paid") {
            Self::Payment
        } else if action.contains("update") {
            Self::Update
        } else {
            Self::Other
        }
    }
}

/// Activity log, newest entry first.
pub struct ActivityView {
    entries: Vec<LogEntry>,
}

impl ActivityView {
    pub async fn load(logs: &LogRepository) -> Result<Self, StoreError> {
        let mut entries = logs.get_all().await?;
        entries.reverse();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn kinds(&self) -> impl Iterator<Item = (ActivityKind, &LogEntry)> {
        self.entries
            .iter()
            .map(|e| (ActivityKind::classify(&e.action), e))
    }
}
