use serde::{Deserialize, Serialize};

use crate::error::{PageError, PageResult};

/// Column headers of the written CSV, in field order.
pub const CSV_HEADERS: [&str; 3] = ["rank", "suburb", "median_value_aud"];

// ── Row ───────────────────────────────────────────────────────────────────────

/// One ranked suburb as it appears on the listing, text kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub rank: String,
    pub suburb: String,
    pub median_value_aud: String,
}

impl Row {
    pub fn new(
        rank: impl Into<String>,
        suburb: impl Into<String>,
        median_value_aud: impl Into<String>,
    ) -> Self {
        Self {
            rank: rank.into(),
            suburb: suburb.into(),
            median_value_aud: median_value_aud.into(),
        }
    }

    /// Build a row from extracted cell text. `index` is the row's position in
    /// the data table, used only for the error.
    pub fn from_cells(index: usize, cells: Vec<String>) -> PageResult<Self> {
        let n = cells.len();
        let [rank, suburb, median_value_aud]: [String; 3] = cells
            .try_into()
            .map_err(|_| PageError::MalformedRow { row: index, cells: n })?;

        Ok(Self { rank, suburb, median_value_aud })
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Rows in page order, then in-page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl From<Vec<Row>> for Dataset {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}
