/// Failures surfaced by the local store and its repositories.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("write to {collection} failed: {source}")]
    WriteFailed {
        collection: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("read from {collection} failed: {source}")]
    ReadFailed {
        collection: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("{collection} record has no id")]
    MissingId { collection: &'static str },
}

impl StoreError {
    pub(crate) fn write(collection: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::WriteFailed { collection, source }
    }

    pub(crate) fn read(collection: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::ReadFailed { collection, source }
    }

    /// True for errors raised by a failed write transaction.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::WriteFailed { .. })
    }
}
