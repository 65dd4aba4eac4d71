//! JSON-file-backed workbook.
//!
//! [`WorkbookFile`] owns an in-memory [`Workbook`] plus the path it was loaded from. All table
//! operations happen in memory through [`TableStore`]; nothing reaches disk until
//! [`WorkbookFile::save`] is called.

use crate::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use sheetload_core::{LoadResult, TableName, TableStore, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};

/// Current on-disk format version.
pub const WORKBOOK_FORMAT_VERSION: u32 = 1;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct WorkbookDocument {
    format_version: u32,
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    workbook: Workbook,
}

/// A workbook loaded from, and saved back to, a JSON file.
#[derive(Debug)]
pub struct WorkbookFile {
    path: PathBuf,
    workbook: Workbook,
    saved_at: Option<DateTime<Utc>>,
}

impl WorkbookFile {
    /// Opens the workbook at `path`, starting an empty one if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the path is a directory, the file cannot be read, or its content
    /// is not a supported workbook document.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if path.is_dir() {
            return Err(StoreError::InvalidPath(format!(
                "Path is a directory: {}",
                path.display()
            )));
        }

        if !path.exists() {
            tracing::debug!(path = %path.display(), "starting new workbook");
            return Ok(Self {
                path,
                workbook: Workbook::new(),
                saved_at: None,
            });
        }

        let contents = fs::read_to_string(&path)?;
        let document: WorkbookDocument = serde_json::from_str(&contents)?;
        if document.format_version != WORKBOOK_FORMAT_VERSION {
            return Err(StoreError::UnsupportedFormat(document.format_version));
        }

        Ok(Self {
            path,
            workbook: document.workbook,
            saved_at: Some(document.saved_at),
        })
    }

    /// Writes the workbook to its path, creating parent directories as needed.
    ///
    /// Returns the timestamp recorded in the file.
    pub fn save(&mut self) -> StoreResult<DateTime<Utc>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let saved_at = Utc::now();
        let document = WorkbookDocument {
            format_version: WORKBOOK_FORMAT_VERSION,
            saved_at,
            workbook: self.workbook.clone(),
        };
        let json = serde_json::to_vec_pretty(&document)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::info!(path = %self.path.display(), "workbook saved");
        self.saved_at = Some(saved_at);
        Ok(saved_at)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the workbook was last written, if it has ever been saved.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TableStore for WorkbookFile {
    type Table = Worksheet;

    fn table_names(&self) -> Vec<TableName> {
        self.workbook.table_names()
    }

    fn table(&self, name: &TableName) -> Option<&Worksheet> {
        self.workbook.table(name)
    }

    fn table_mut(&mut self, name: &TableName) -> Option<&mut Worksheet> {
        self.workbook.table_mut(name)
    }

    fn create_table(&mut self, name: &TableName) -> LoadResult<&mut Worksheet> {
        self.workbook.create_table(name)
    }
}
