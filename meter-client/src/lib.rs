pub mod db;
pub mod domain;
pub mod error;

pub use db::{
    BillIndex, BillRepository, IndexValue, LogRepository, ReadingIndex, ReadingRepository,
    RecordRepository, StoreClient,
};
pub use error::StoreError;
