//! Shared value types for SheetLoad.
//!
//! These types are used by the core loader, the workbook store and the binaries. They carry
//! their invariants from construction onwards so downstream code never re-validates them.

use std::str::FromStr;

/// Errors that can occur when constructing validated values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypesError {
    /// The table name was empty or contained only whitespace
    #[error("table name cannot be empty")]
    EmptyTableName,

    /// The load mode was neither `append` nor `overwrite`
    #[error("unknown data load mode: {0}")]
    UnknownLoadPolicy(String),

    /// Cell coordinates are 1-based
    #[error("cell position must be 1-based (got row {row}, column {column})")]
    ZeroCellPosition { row: usize, column: usize },
}

/// The name of a table (worksheet) within a workbook.
///
/// Names are trimmed on construction and must contain at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableName(String);

impl TableName {
    /// Creates a new `TableName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::EmptyTableName` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyTableName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for TableName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TableName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TableName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// How decoded report rows are reconciled with a table's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Keep existing rows and write below them, skipping the incoming header row
    /// when the table already has content.
    Append,
    /// Clear the table and write from the first cell.
    #[default]
    Overwrite,
}

impl LoadPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPolicy::Append => "append",
            LoadPolicy::Overwrite => "overwrite",
        }
    }
}

impl std::fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadPolicy {
    type Err = TypesError;

    /// Parses a load mode case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(LoadPolicy::Append),
            "overwrite" => Ok(LoadPolicy::Overwrite),
            other => Err(TypesError::UnknownLoadPolicy(other.to_owned())),
        }
    }
}

/// A 1-based cell coordinate within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    row: usize,
    column: usize,
}

impl CellPosition {
    /// The top-left cell, which also carries the table's anchor note.
    pub const ORIGIN: CellPosition = CellPosition { row: 1, column: 1 };

    pub fn new(row: usize, column: usize) -> Result<Self, TypesError> {
        if row == 0 || column == 0 {
            return Err(TypesError::ZeroCellPosition { row, column });
        }
        Ok(Self { row, column })
    }

    /// First column of the given 1-based row.
    pub fn row_start(row: usize) -> Result<Self, TypesError> {
        Self::new(row, 1)
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }
}
