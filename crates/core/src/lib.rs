//! # SheetLoad Core
//!
//! Core logic for fetching tagged CSV reports and loading them into workbook tables.
//!
//! A report payload is decoded in three steps:
//! - [`sections`] splits the raw body into confirmation, history, note and report sections
//! - [`csv`] parses the report section into rows of cells
//! - [`loader`] reconciles the rows with a target table under a [`LoadPolicy`]
//!
//! [`pipeline`] strings these together with the [`fetch`] collaborator, the [`history`] audit
//! table and [`settings`] read from the workbook.
//!
//! **No I/O of its own**: HTTP goes through [`fetch::Fetcher`] and tables through
//! [`table::TableStore`]. File persistence lives in `sheetload-store`.

pub mod config;
pub mod constants;
pub mod csv;
pub mod error;
pub mod fetch;
pub mod history;
pub mod loader;
pub mod pipeline;
pub mod sections;
pub mod settings;
pub mod table;

pub use error::{LoadError, LoadResult};
pub use pipeline::{Decision, LoadReport, ReportService, RunOutcome, TableLoad};
pub use sections::{decode_sections, DecodedSections};
pub use settings::Settings;
pub use sheetload_types::{CellPosition, LoadPolicy, TableName};
pub use table::{Table, TableStore, Workbook, Worksheet};
