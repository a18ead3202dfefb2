// ============================================================
// SHEET
// ============================================================
// In-memory table produced by projecting rows through a column mapping

use super::{CellValue, ColumnMapping, RowRecord};

/// Column width ceiling in character units
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Padding added to the widest cell of a column
pub const COLUMN_WIDTH_PADDING: usize = 2;

/// A single table: display headers plus rows of cells in header order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Project rows onto the mapping, relabelling keys to headers.
    ///
    /// Fields not named by the mapping are dropped; mapped keys missing from a
    /// row become empty cells.
    pub fn project(rows: &[RowRecord], mapping: &[ColumnMapping]) -> Self {
        let headers = mapping.iter().map(|column| column.header.clone()).collect();

        let rows = rows
            .iter()
            .map(|row| {
                mapping
                    .iter()
                    .map(|column| row.get(&column.key).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of each column: `min(max(header, widest cell) + 2, 50)`
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let widest_cell = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(CellValue::display_len)
                    .max()
                    .unwrap_or(0);
                let widest = header.chars().count().max(widest_cell);
                (widest + COLUMN_WIDTH_PADDING).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }
}
