use async_trait::async_trait;

use crate::domain::PaymentStatus;
use crate::error::StoreError;

/// Value looked up through a secondary index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for IndexValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for IndexValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<PaymentStatus> for IndexValue {
    fn from(v: PaymentStatus) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

/// Operations shared by the reading and bill collections.
///
/// Every mutating call runs in its own transaction. `update` overwrites by id
/// without checking that the id exists, so updating an unknown id inserts it.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    type Record: Send + Sync + 'static;
    type Index: Copy + Send + Sync + 'static;

    fn collection(&self) -> &'static str;

    /// Stores every record in one transaction, assigning ids where missing.
    /// Returns the ids in input order.
    async fn add_all(&self, records: &[Self::Record]) -> Result<Vec<i64>, StoreError>;

    /// Every record, ordered by id.
    async fn get_all(&self) -> Result<Vec<Self::Record>, StoreError>;

    async fn update(&self, record: &Self::Record) -> Result<(), StoreError>;

    async fn get_by_index(
        &self,
        index: Self::Index,
        value: IndexValue,
    ) -> Result<Vec<Self::Record>, StoreError>;

    async fn clear_all(&self) -> Result<(), StoreError>;
}
