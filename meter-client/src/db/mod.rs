mod bills;
mod logs;
pub mod migrations;
mod readings;
mod repository;
mod store;

pub use bills::{BillIndex, BillRepository};
pub use logs::LogRepository;
pub use readings::{ReadingIndex, ReadingRepository};
pub use repository::{IndexValue, RecordRepository};
pub use store::{StoreClient, DB_NAME, DB_VERSION};
