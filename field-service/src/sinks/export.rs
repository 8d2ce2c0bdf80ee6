use meter_client::domain::{iso_date, Bill, MeterReading};
use time::OffsetDateTime;

use crate::sheet::{Cell, Sheet};
use crate::transform::{BILL_COLUMNS, READING_HEADERS};

pub const EXPORT_SHEET_NAME: &str = "Sheet1";

fn text_or_empty(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::text(s)
    }
}

fn header_row(names: &[&str]) -> Vec<Cell> {
    names.iter().map(|n| Cell::text(*n)).collect()
}

/// Readings laid out under the same headers the route sheet is imported with.
pub fn reading_sheet(readings: &[MeterReading]) -> Sheet {
    let mut sheet = Sheet::new(EXPORT_SHEET_NAME);
    sheet.push_row(header_row(&READING_HEADERS));

    for r in readings {
        sheet.push_row(vec![
            text_or_empty(&r.code),
            text_or_empty(&r.installation_id),
            text_or_empty(&r.branch_id),
            text_or_empty(&r.compteur),
            text_or_empty(&r.inx_dep),
            text_or_empty(r.meter_value.as_deref().unwrap_or_default()),
            text_or_empty(&r.name),
            text_or_empty(&r.obs),
            text_or_empty(&r.usage),
            text_or_empty(&r.seq),
        ]);
    }

    sheet
}

/// Bills in import column order, followed by their payment state. Amounts
/// stay numeric so the file imports back unchanged.
pub fn bill_sheet(bills: &[Bill]) -> Sheet {
    let mut sheet = Sheet::new(EXPORT_SHEET_NAME);
    let mut header = header_row(&BILL_COLUMNS);
    header.push(Cell::text("PaymentStatus"));
    header.push(Cell::text("PaymentDate"));
    sheet.push_row(header);

    for b in bills {
        sheet.push_row(vec![
            text_or_empty(&b.code),
            text_or_empty(&b.branch_id),
            text_or_empty(&b.installation_id),
            text_or_empty(&b.name),
            Cell::Number(b.bill_lbp),
            Cell::Number(b.bill_usd),
            Cell::text(b.payment_status.as_str()),
            text_or_empty(b.payment_date.as_deref().unwrap_or_default()),
        ]);
    }

    sheet
}

/// `<prefix>_export_<YYYY-MM-DD>.<ext>`
pub fn export_file_name(prefix: &str, at: OffsetDateTime, ext: &str) -> String {
    format!("{prefix}_export_{}.{ext}", iso_date(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_client::domain::PaymentStatus;
    use time::macros::datetime;

    #[test]
    fn reading_sheet_uses_import_headers() {
        let sheet = reading_sheet(&[MeterReading {
            code: "M001".to_string(),
            installation_id: "INST001".to_string(),
            meter_value: None,
            name: "John Doe".to_string(),
            ..Default::default()
        }]);

        let header: Vec<String> = sheet.rows()[0].cells.iter().map(Cell::to_text).collect();
        assert_eq!(header, READING_HEADERS);
        let row = &sheet.rows()[1];
        assert_eq!(row.get(0), &Cell::text("M001"));
        assert_eq!(row.get(5), &Cell::Empty);
        assert_eq!(row.get(6), &Cell::text("John Doe"));
    }

    #[test]
    fn bill_sheet_keeps_amounts_numeric() {
        let sheet = bill_sheet(&[Bill {
            id: Some(3),
            code: "B1".to_string(),
            branch_id: "BR1".to_string(),
            installation_id: "INST1".to_string(),
            name: "Name".to_string(),
            bill_lbp: 1000.0,
            bill_usd: 5.5,
            payment_status: PaymentStatus::Paid,
            payment_date: Some("2024-01-01T00:00:00.000Z".to_string()),
        }]);

        assert_eq!(sheet.name, "Sheet1");
        let row = &sheet.rows()[1];
        assert_eq!(row.get(4), &Cell::Number(1000.0));
        assert_eq!(row.get(5), &Cell::Number(5.5));
        assert_eq!(row.get(6), &Cell::text("paid"));
    }

    #[test]
    fn file_name_carries_utc_date() {
        let at = datetime!(2024-07-09 23:30 UTC);
        assert_eq!(
            export_file_name("readings", at, "xlsx"),
            "readings_export_2024-07-09.xlsx"
        );
    }
}
