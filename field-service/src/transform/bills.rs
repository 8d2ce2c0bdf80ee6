use meter_client::domain::{Bill, PaymentStatus};

use crate::pipeline::{Mapped, PipelineError, RowMapping};
use crate::sheet::{Cell, Sheet, SheetRow};

/// Positional layout of a bill sheet.
pub const BILL_COLUMNS: [&str; 6] = ["Code", "Branch", "Installation", "Name", "BillLBP", "BillUSD"];

const MIN_CELLS: usize = 3;

/// Maps a bill sheet by position: code, branch, installation, name, LBP, USD.
///
/// A leading header row is recognised by its first cell mentioning "code"
/// or "branch" and skipped. Rows with fewer than three cells are discarded.
#[derive(Clone, Copy, Default)]
pub struct BillRowMapping;

fn is_header(row: &SheetRow) -> bool {
    match row.get(0) {
        Cell::Text(s) => {
            let s = s.to_lowercase();
            s.contains("code") || s.contains("branch")
        }
        _ => false,
    }
}

fn text_or_empty(cell: &Cell) -> String {
    if cell.is_truthy() {
        cell.to_text()
    } else {
        String::new()
    }
}

fn number_or_zero(cell: &Cell) -> f64 {
    if cell.is_truthy() {
        cell.to_number()
    } else {
        0.0
    }
}

fn map_row(row: &SheetRow) -> Option<Bill> {
    if row.len() < MIN_CELLS {
        return None;
    }

    Some(Bill {
        id: None,
        code: text_or_empty(row.get(0)),
        branch_id: text_or_empty(row.get(1)),
        installation_id: text_or_empty(row.get(2)),
        name: text_or_empty(row.get(3)),
        bill_lbp: number_or_zero(row.get(4)),
        bill_usd: number_or_zero(row.get(5)),
        payment_status: PaymentStatus::Unpaid,
        payment_date: None,
    })
}

impl RowMapping for BillRowMapping {
    type Output = Bill;

    fn map_sheet(&self, sheet: &Sheet) -> Result<Mapped<Bill>, PipelineError> {
        let rows = sheet.rows();
        let (found, data_rows): (Vec<String>, &[SheetRow]) = match rows.first() {
            Some(first) if is_header(first) => (first.cells.iter().map(Cell::to_text).collect(), &rows[1..]),
            Some(first) => (first.cells.iter().map(Cell::to_text).collect(), rows),
            None => (Vec::new(), rows),
        };

        let mut mapped = Mapped {
            records: Vec::with_capacity(data_rows.len()),
            discarded_rows: Vec::new(),
        };
        for row in data_rows {
            match map_row(row) {
                Some(b) => mapped.records.push(b),
                None => mapped.discarded_rows.push(row.number),
            }
        }

        if mapped.records.is_empty() {
            return Err(PipelineError::MappingFailed {
                found,
                expected: BILL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            });
        }

        Ok(mapped)
    }
}
