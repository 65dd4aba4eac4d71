//! Execution history table.
//!
//! When a payload carries an execution-history block, one audit row is appended to the
//! "Execution History" table describing who ran what, where the data went, and the server's
//! summary fields (invocation time, duration, rows fetched, API call count).

use crate::constants::{HISTORY_HEADERS, HISTORY_TABLE_NAME};
use crate::csv::Row;
use crate::table::{Table, TableStore};
use crate::{LoadError, LoadResult};
use sheetload_types::{CellPosition, LoadPolicy, TableName};

/// Who ran a fetch and where its data is going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext<'a> {
    pub target_tables: &'a [TableName],
    pub policy: LoadPolicy,
    pub email: &'a str,
    pub run_id: &'a str,
}

/// Splits a history block into its comma-separated, trimmed fields.
pub fn parse_history_fields(block: &str) -> Vec<String> {
    block.split(',').map(|field| field.trim().to_owned()).collect()
}

/// Builds the history row for one run.
pub fn history_row(context: &RunContext<'_>, block: &str) -> Row {
    let targets = context
        .target_tables
        .iter()
        .map(TableName::as_str)
        .collect::<Vec<_>>()
        .join("; ");

    let mut row = vec![
        targets,
        context.policy.to_string(),
        context.email.to_owned(),
        context.run_id.to_owned(),
    ];
    row.extend(parse_history_fields(block));
    row
}

/// Appends the history row for `block` to the history table, creating the table with its header
/// row when it does not exist yet. Returns the 1-based row the record was written to.
pub fn append_history<S: TableStore>(
    store: &mut S,
    context: &RunContext<'_>,
    block: &str,
) -> LoadResult<usize> {
    let name = TableName::new(HISTORY_TABLE_NAME)?;

    if store.table(&name).is_none() {
        tracing::info!("creating '{}' table", HISTORY_TABLE_NAME);
        let headers: Row = HISTORY_HEADERS.iter().map(|h| h.to_string()).collect();
        store
            .create_table(&name)?
            .write_range(CellPosition::ORIGIN, &[headers])?;
    }

    let table = store
        .table_mut(&name)
        .ok_or_else(|| LoadError::TableNotFound(name.to_string()))?;

    let target_row = table.last_row() + 1;
    table.write_range(CellPosition::row_start(target_row)?, &[history_row(context, block)])?;

    tracing::info!(run_id = context.run_id, row = target_row, "history table updated");
    Ok(target_row)
}
