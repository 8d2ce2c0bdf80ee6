//! In-memory grid read from (or written to) a spreadsheet file.
//!
//! Cell coercions are deliberately lenient: text rendering never fails and
//! numeric coercion falls back to `0.0` instead of rejecting a row.

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text<S: Into<String>>(s: S) -> Self {
        Self::Text(s.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Falsy cells are empty, empty text, `0`, NaN and `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
        }
    }

    /// Text form of the cell. Whole numbers print without a fractional part.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) if *n == 0.0 => "0".to_string(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Numeric form of the cell; anything that does not parse is `0.0`.
    pub fn to_number(&self) -> f64 {
        let n = match self {
            Self::Empty => 0.0,
            Self::Number(n) => *n,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(0.0)
                }
            }
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }
}

/// One non-blank row with its 1-based row number in the source sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub number: usize,
    pub cells: Vec<Cell>,
}

impl SheetRow {
    /// Cell at `idx`; out-of-range reads as [`Cell::Empty`].
    pub fn get(&self, idx: usize) -> &Cell {
        self.cells.get(idx).unwrap_or(&EMPTY)
    }

    /// Number of cells up to and including the last non-blank one.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<SheetRow>,
}

impl Sheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Builds a sheet from a raw grid whose first row is sheet row
    /// `first_row_number`. Trailing blank cells are trimmed and blank rows
    /// dropped.
    pub fn from_grid<S: Into<String>>(name: S, grid: Vec<Vec<Cell>>, first_row_number: usize) -> Self {
        let rows = grid
            .into_iter()
            .enumerate()
            .filter_map(|(i, mut cells)| {
                while cells.last().is_some_and(Cell::is_blank) {
                    cells.pop();
                }
                (!cells.is_empty()).then(|| SheetRow {
                    number: first_row_number + i,
                    cells,
                })
            })
            .collect();

        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) {
        let number = self.rows.last().map_or(1, |r| r.number + 1);
        self.rows.push(SheetRow { number, cells });
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
