//! Row mappings from spreadsheet grids to domain records.

pub mod bills;
pub mod readings;

pub use bills::{BillRowMapping, BILL_COLUMNS};
pub use readings::{ReadingRowMapping, READING_HEADERS};
