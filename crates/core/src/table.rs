//! Table store abstractions.
//!
//! The loader never talks to a concrete spreadsheet. It works against the [`Table`] and
//! [`TableStore`] traits, which model the host store: named tables holding a grid of string
//! cells plus one free-text note on the anchor cell (A1).
//!
//! [`Workbook`] and [`Worksheet`] are the in-memory implementation used by the binaries (via the
//! file-backed store) and by tests.

use crate::csv::Row;
use crate::{LoadError, LoadResult};
use sheetload_types::{CellPosition, TableName};

/// A single named table.
pub trait Table {
    fn name(&self) -> &TableName;

    /// 1-based index of the last row holding a non-empty cell, or 0 for an empty table.
    fn last_row(&self) -> usize;

    /// Reads the populated extent as a rectangular matrix.
    fn values(&self) -> LoadResult<Vec<Row>>;

    /// Removes all cell content. The anchor note is kept.
    fn clear(&mut self) -> LoadResult<()>;

    /// Writes `values` with its top-left cell at `origin`, growing the table as needed.
    fn write_range(&mut self, origin: CellPosition, values: &[Row]) -> LoadResult<()>;

    fn anchor_note(&self) -> LoadResult<Option<String>>;

    fn set_anchor_note(&mut self, note: &str) -> LoadResult<()>;
}

/// A collection of named tables.
pub trait TableStore {
    type Table: Table;

    /// Table names in workbook order.
    fn table_names(&self) -> Vec<TableName>;

    fn table(&self, name: &TableName) -> Option<&Self::Table>;

    fn table_mut(&mut self, name: &TableName) -> Option<&mut Self::Table>;

    /// Creates an empty table.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::TableExists` if a table with this name is already present.
    fn create_table(&mut self, name: &TableName) -> LoadResult<&mut Self::Table>;

    /// Returns the named table, creating it when missing.
    fn table_or_create(&mut self, name: &TableName) -> LoadResult<&mut Self::Table> {
        if self.table(name).is_none() {
            tracing::info!(table = %name, "creating table");
            return self.create_table(name);
        }
        self.table_mut(name)
            .ok_or_else(|| LoadError::TableNotFound(name.to_string()))
    }
}

/// In-memory table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Worksheet {
    name: TableName,
    #[serde(default)]
    cells: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl Worksheet {
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            cells: Vec::new(),
            note: None,
        }
    }

    /// Creates a worksheet pre-filled with `rows` from A1.
    pub fn with_rows(name: TableName, rows: Vec<Row>) -> Self {
        Self {
            name,
            cells: rows,
            note: None,
        }
    }
}

impl Table for Worksheet {
    fn name(&self) -> &TableName {
        &self.name
    }

    fn last_row(&self) -> usize {
        self.cells
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
            .map_or(0, |idx| idx + 1)
    }

    fn values(&self) -> LoadResult<Vec<Row>> {
        let mut rows = self.cells[..self.last_row()].to_vec();
        let width = crate::csv::max_width(&rows);
        crate::csv::pad_rows(&mut rows, width);
        Ok(rows)
    }

    fn clear(&mut self) -> LoadResult<()> {
        self.cells.clear();
        Ok(())
    }

    fn write_range(&mut self, origin: CellPosition, values: &[Row]) -> LoadResult<()> {
        let first_row = origin.row() - 1;
        let first_col = origin.column() - 1;

        if self.cells.len() < first_row + values.len() {
            self.cells.resize_with(first_row + values.len(), Vec::new);
        }

        for (offset, source) in values.iter().enumerate() {
            let target = &mut self.cells[first_row + offset];
            if target.len() < first_col + source.len() {
                target.resize(first_col + source.len(), String::new());
            }
            target[first_col..first_col + source.len()].clone_from_slice(source);
        }

        Ok(())
    }

    fn anchor_note(&self) -> LoadResult<Option<String>> {
        Ok(self.note.clone())
    }

    fn set_anchor_note(&mut self, note: &str) -> LoadResult<()> {
        self.note = Some(note.to_owned());
        Ok(())
    }
}

/// In-memory collection of worksheets, kept in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Workbook {
    #[serde(default)]
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pre-built worksheet, replacing any existing table with the same name.
    pub fn insert(&mut self, worksheet: Worksheet) {
        match self
            .worksheets
            .iter_mut()
            .find(|ws| ws.name == worksheet.name)
        {
            Some(existing) => *existing = worksheet,
            None => self.worksheets.push(worksheet),
        }
    }
}

impl TableStore for Workbook {
    type Table = Worksheet;

    fn table_names(&self) -> Vec<TableName> {
        self.worksheets.iter().map(|ws| ws.name.clone()).collect()
    }

    fn table(&self, name: &TableName) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| &ws.name == name)
    }

    fn table_mut(&mut self, name: &TableName) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|ws| &ws.name == name)
    }

    fn create_table(&mut self, name: &TableName) -> LoadResult<&mut Worksheet> {
        if self.table(name).is_some() {
            return Err(LoadError::TableExists(name.to_string()));
        }
        self.worksheets.push(Worksheet::new(name.clone()));
        let idx = self.worksheets.len() - 1;
        Ok(&mut self.worksheets[idx])
    }
}
