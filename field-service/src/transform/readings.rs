use meter_client::domain::MeterReading;

use crate::pipeline::{Mapped, PipelineError, RowMapping};
use crate::sheet::{Cell, Sheet, SheetRow};

/// Header names of a reading route sheet, in export order.
pub const READING_HEADERS: [&str; 10] = [
    "Code",
    "Installation",
    "Branch",
    "Compteur",
    "Inx-Dep",
    "Meter Values",
    "Name",
    "OBS",
    "Usage",
    "SEQ",
];

/// Maps a route sheet by header name. The first row is the header row.
///
/// Missing columns read as empty text. Rows with neither an installation nor
/// a name are discarded.
#[derive(Clone, Copy, Default)]
pub struct ReadingRowMapping;

struct Header(Vec<String>);

impl Header {
    fn get<'r>(&self, row: &'r SheetRow, name: &str) -> &'r Cell {
        // A name missing from the header reads past the row end, i.e. empty.
        let idx = self.0.iter().position(|h| h == name).unwrap_or(usize::MAX);
        row.get(idx)
    }
}

fn map_row(header: &Header, row: &SheetRow) -> Option<MeterReading> {
    let text = |name: &str| header.get(row, name).to_text();

    let meter_value = header.get(row, "Meter Values");
    let reading = MeterReading {
        id: None,
        code: text("Code"),
        installation_id: text("Installation"),
        branch_id: text("Branch"),
        compteur: text("Compteur"),
        inx_dep: text("Inx-Dep"),
        meter_value: meter_value.is_truthy().then(|| meter_value.to_text()),
        name: text("Name"),
        obs: text("OBS"),
        usage: text("Usage"),
        seq: text("SEQ"),
        reading_date: None,
        flagged: false,
    };

    (!reading.installation_id.is_empty() || !reading.name.is_empty()).then_some(reading)
}

impl RowMapping for ReadingRowMapping {
    type Output = MeterReading;

    fn map_sheet(&self, sheet: &Sheet) -> Result<Mapped<MeterReading>, PipelineError> {
        let (header_row, data_rows) = match sheet.rows().split_first() {
            Some((h, rest)) => (Some(h), rest),
            None => (None, &[][..]),
        };
        let header = Header(
            header_row
                .map(|h| h.cells.iter().map(Cell::to_text).collect())
                .unwrap_or_default(),
        );

        let mut mapped = Mapped {
            records: Vec::with_capacity(data_rows.len()),
            discarded_rows: Vec::new(),
        };
        for row in data_rows {
            match map_row(&header, row) {
                Some(r) => mapped.records.push(r),
                None => mapped.discarded_rows.push(row.number),
            }
        }

        if mapped.records.is_empty() {
            return Err(PipelineError::MappingFailed {
                found: header.0.into_iter().filter(|h| !h.is_empty()).collect(),
                expected: READING_HEADERS.iter().map(|h| h.to_string()).collect(),
            });
        }

        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        let mut grid = vec![READING_HEADERS.iter().map(|h| Cell::text(*h)).collect()];
        grid.extend(rows);
        Sheet::from_grid("Readings", grid, 1)
    }

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    #[test]
    fn maps_every_named_column() {
        let sheet = route_sheet(vec![vec![
            t("M001"),
            t("INST001"),
            t("B001"),
            t("C123456"),
            Cell::Number(1000.0),
            Cell::Number(1234.0),
            t("John Doe"),
            t("dog"),
            t("Residential"),
            Cell::Number(1.0),
        ]]);

        let mapped = ReadingRowMapping.map_sheet(&sheet).unwrap();
        assert_eq!(
            mapped.records,
            vec![MeterReading {
                id: None,
                code: "M001".to_string(),
                installation_id: "INST001".to_string(),
                branch_id: "B001".to_string(),
                compteur: "C123456".to_string(),
                inx_dep: "1000".to_string(),
                meter_value: Some("1234".to_string()),
                name: "John Doe".to_string(),
                obs: "dog".to_string(),
                usage: "Residential".to_string(),
                seq: "1".to_string(),
                reading_date: None,
                flagged: false,
            }]
        );
    }

    #[test]
    fn column_order_does_not_matter_and_missing_columns_are_empty() {
        let sheet = Sheet::from_grid(
            "Readings",
            vec![
                vec![t("Name"), t("Installation"), t("Code")],
                vec![t("Jane Smith"), t("INST002"), t("M002")],
            ],
            1,
        );

        let r = &ReadingRowMapping.map_sheet(&sheet).unwrap().records[0];
        assert_eq!(r.name, "Jane Smith");
        assert_eq!(r.installation_id, "INST002");
        assert_eq!(r.code, "M002");
        assert_eq!(r.compteur, "");
        assert_eq!(r.meter_value, None);
    }

    #[test]
    fn falsy_meter_value_is_none() {
        let sheet = route_sheet(vec![vec![
            t("M001"),
            t("INST001"),
            t("B001"),
            t("C1"),
            t("10"),
            Cell::Number(0.0),
            t("A"),
        ]]);

        let r = &ReadingRowMapping.map_sheet(&sheet).unwrap().records[0];
        assert_eq!(r.meter_value, None);
    }

    #[test]
    fn rows_without_installation_or_name_are_discarded() {
        let sheet = route_sheet(vec![
            vec![t("M001"), t("INST001")],
            vec![t("M002"), Cell::Empty, t("B001")],
            vec![t("M003"), Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, t("Only Name")],
        ]);

        let mapped = ReadingRowMapping.map_sheet(&sheet).unwrap();
        let codes: Vec<_> = mapped.records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["M001", "M003"]);
        assert_eq!(mapped.discarded_rows, vec![3]);
    }

    #[test]
    fn unknown_headers_fail_with_found_columns() {
        let sheet = Sheet::from_grid(
            "Readings",
            vec![vec![t("Foo"), t("Bar")], vec![t("1"), t("2")]],
            1,
        );

        match ReadingRowMapping.map_sheet(&sheet) {
            Err(PipelineError::MappingFailed { found, expected }) => {
                assert_eq!(found, vec!["Foo", "Bar"]);
                assert_eq!(expected.len(), 10);
            }
            other => panic!("expected MappingFailed, got {other:?}"),
        }
    }

    #[test]
    fn header_only_sheet_fails() {
        let sheet = route_sheet(Vec::new());
        assert!(matches!(
            ReadingRowMapping.map_sheet(&sheet),
            Err(PipelineError::MappingFailed { .. })
        ));

        let empty = Sheet::new("Empty");
        assert!(matches!(
            ReadingRowMapping.map_sheet(&empty),
            Err(PipelineError::MappingFailed { .. })
        ));
    }
}
