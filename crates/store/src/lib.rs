//! SheetLoad Workbook Storage
//!
//! This crate persists a [`Workbook`](sheetload_core::Workbook) to a single JSON file so the
//! binaries have a durable table store between runs.
//!
//! ## File Format
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "saved_at": "2024-05-01T10:00:00Z",
//!   "worksheets": [
//!     { "name": "Sales", "cells": [["id", "name"], ["1", "Smith"]], "note": "Update Mode: ..." }
//!   ]
//! }
//! ```
//!
//! Saves are written to a sibling temporary file first and then renamed over the target, so a
//! crash mid-save leaves the previous file intact.
//!
//! ## Example Usage
//!
//! ```no_run
//! use sheetload_store::WorkbookFile;
//! use sheetload_core::{TableName, TableStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut book = WorkbookFile::open("workbook.json")?;
//! book.table_or_create(&TableName::new("Sales")?)?;
//! book.save()?;
//! # Ok(())
//! # }
//! ```

mod workbook_file;

pub use workbook_file::{WorkbookFile, WORKBOOK_FORMAT_VERSION};

/// Errors that can occur while reading or writing a workbook file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Path is unusable as a workbook file (for example, a directory)
    #[error("Invalid workbook path: {0}")]
    InvalidPath(String),

    /// The file was written by an unknown format version
    #[error("Unsupported workbook format version: {0}")]
    UnsupportedFormat(u32),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid workbook JSON
    #[error("Invalid workbook JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;
