//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the services. Nothing in
//! the core reads environment variables during a run; the binaries read them and hand the raw
//! values to the parsing helpers below.

use crate::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SETTINGS_TABLE, DEFAULT_WORKBOOK_PATH};
use crate::{LoadError, LoadResult};
use sheetload_types::TableName;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    workbook_path: PathBuf,
    settings_table: TableName,
    user_email: String,
    http_timeout: Duration,
}

impl CoreConfig {
    pub fn new(
        workbook_path: PathBuf,
        settings_table: TableName,
        user_email: String,
        http_timeout: Duration,
    ) -> LoadResult<Self> {
        if workbook_path.as_os_str().is_empty() {
            return Err(LoadError::InvalidInput(
                "workbook path cannot be empty".into(),
            ));
        }

        if http_timeout.is_zero() {
            return Err(LoadError::InvalidInput(
                "HTTP timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            workbook_path,
            settings_table,
            user_email: user_email.trim().to_owned(),
            http_timeout,
        })
    }

    /// Builds a configuration from optional raw values, applying defaults for anything unset.
    pub fn from_env_values(
        workbook_path: Option<String>,
        settings_table: Option<String>,
        user_email: Option<String>,
        http_timeout_secs: Option<String>,
    ) -> LoadResult<Self> {
        let workbook_path = non_blank(workbook_path)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK_PATH));
        let settings_table = settings_table_from_env_value(settings_table)?;
        let http_timeout = http_timeout_from_env_value(http_timeout_secs)?;

        Self::new(
            workbook_path,
            settings_table,
            user_email.unwrap_or_default(),
            http_timeout,
        )
    }

    pub fn workbook_path(&self) -> &Path {
        &self.workbook_path
    }

    pub fn settings_table(&self) -> &TableName {
        &self.settings_table
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the settings table name from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default settings table.
pub fn settings_table_from_env_value(value: Option<String>) -> LoadResult<TableName> {
    let value = non_blank(value).unwrap_or_else(|| DEFAULT_SETTINGS_TABLE.to_owned());
    Ok(TableName::new(value)?)
}

/// Parse the HTTP timeout (whole seconds) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn http_timeout_from_env_value(value: Option<String>) -> LoadResult<Duration> {
    let Some(value) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
    };

    let secs = value.parse::<u64>().map_err(|_| {
        LoadError::InvalidInput(format!(
            "HTTP timeout must be a whole number of seconds (got '{value}')"
        ))
    })?;

    Ok(Duration::from_secs(secs))
}
