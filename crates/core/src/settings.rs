//! Run settings read from the workbook.
//!
//! Settings live in a two-column key/value table ("Developer Settings" by default). Keys written
//! as `Params[name]` are request parameters; a handful of parameter names are interpreted by the
//! loader itself:
//!
//! | Parameter           | Meaning                                       |
//! |---------------------|-----------------------------------------------|
//! | `data_server_url`   | endpoint to POST to                           |
//! | `target_tabs`       | comma-separated target table names            |
//! | `data_load_mode`    | `append` or `overwrite` (default `overwrite`) |
//! | `prompt_for_gemini` | forwarded under its lowercase name            |
//!
//! Every other key, bracketed or not, is forwarded to the server in the JSON request body.

use crate::table::{Table, TableStore};
use crate::{LoadError, LoadResult};
use sheetload_types::{LoadPolicy, TableName};
use std::collections::BTreeMap;

const PARAM_PREFIX: &str = "Params[";
const PARAMS_TABLE_SUFFIX: &str = ".params_table";

/// Parameters resolved from the settings table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// Endpoint URL, empty when not configured.
    pub url: String,
    pub target_tables: Vec<TableName>,
    pub policy: LoadPolicy,
    /// Parameters sent as the JSON request body.
    pub params: BTreeMap<String, String>,
}

impl Settings {
    /// Reads settings from the key/value table `settings_table` in `store`.
    ///
    /// `email` is added as the `email` parameter. When a `*.params_table` parameter names an
    /// existing table, `inline_table` is asked whether that table's content should replace the
    /// value; if it agrees, the table is serialised as quoted CSV.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::TableNotFound` if the settings table is missing and
    /// `LoadError::Types` if the load mode is not recognised.
    pub fn from_store<S, F>(
        store: &S,
        settings_table: &TableName,
        email: &str,
        mut inline_table: F,
    ) -> LoadResult<Self>
    where
        S: TableStore,
        F: FnMut(&str, &TableName) -> bool,
    {
        let table = store
            .table(settings_table)
            .ok_or_else(|| LoadError::TableNotFound(settings_table.to_string()))?;
        let table_names = store.table_names();

        let mut settings = Settings::default();

        for row in table.values()? {
            let mut cells = row.iter();
            let key = cells.next().map(|k| k.trim()).unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            let value = cells.next().map(|v| v.trim()).unwrap_or_default().to_owned();

            let Some(param) = key
                .strip_prefix(PARAM_PREFIX)
                .map(|rest| rest.strip_suffix(']').unwrap_or(rest))
            else {
                settings.params.insert(key.to_owned(), value);
                continue;
            };

            match param.to_lowercase().as_str() {
                "data_server_url" => {
                    settings.url = value;
                    continue;
                }
                "target_tabs" => {
                    settings.target_tables = parse_target_tables(&value);
                    continue;
                }
                "data_load_mode" => {
                    if !value.is_empty() {
                        settings.policy = value.parse()?;
                    }
                    continue;
                }
                "prompt_for_gemini" => {
                    settings.params.insert("prompt_for_gemini".to_owned(), value);
                    continue;
                }
                _ => {}
            }

            if param.ends_with(PARAMS_TABLE_SUFFIX) {
                let referenced = TableName::new(&value)
                    .ok()
                    .filter(|name| table_names.contains(name));
                if let Some(name) = referenced {
                    if inline_table(param, &name) {
                        if let Some(source) = store.table(&name) {
                            tracing::debug!(param, table = %name, "inlining params table");
                            settings
                                .params
                                .insert(param.to_owned(), quoted_csv(&source.values()?));
                            continue;
                        }
                    }
                }
            }

            settings.params.insert(param.to_owned(), value);
        }

        settings.params.insert("email".to_owned(), email.to_owned());
        Ok(settings)
    }

    /// Checks the settings are complete enough to fetch a report.
    pub fn validate(&self) -> LoadResult<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(LoadError::InvalidInput(
                "URL is missing. Please provide a valid URL in the Developer Settings sheet."
                    .into(),
            ));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(LoadError::InvalidInput("Invalid URL format.".into()));
        }

        if self.target_tables.is_empty() {
            return Err(LoadError::InvalidInput(
                "Missing TargetTabs. Please provide TargetTabs.".into(),
            ));
        }

        Ok(())
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Splits a comma-separated list of table names, dropping blanks.
pub fn parse_target_tables(value: &str) -> Vec<TableName> {
    value
        .split(',')
        .filter_map(|name| TableName::new(name).ok())
        .collect()
}

/// Serialises rows as CSV with every cell wrapped in double quotes.
///
/// Embedded quotes are not escaped; the server expects the cells verbatim.
fn quoted_csv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| format!("\"{cell}\""))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
