//! Table loading.
//!
//! Reconciles decoded report rows with a table's current extent under a [`LoadPolicy`]:
//!
//! - `overwrite` clears the table and writes from A1;
//! - `append` writes below the last populated row, dropping the incoming header row when the
//!   table already has content.
//!
//! Every row is padded to the width of the widest row so the write is rectangular. When the
//! payload carries a note, it is prepended to the anchor note so earlier entries stay below it.

use crate::constants::NOTE_SEPARATOR_WIDTH;
use crate::csv::{max_width, pad_rows, Row};
use crate::table::Table;
use crate::LoadResult;
use sheetload_types::{CellPosition, LoadPolicy};

/// The exact write a load will perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    /// Whether the table is cleared before writing.
    pub clear_first: bool,
    /// Top-left cell of the write.
    pub origin: CellPosition,
    /// Column count of the write; 0 when there is nothing to write.
    pub width: usize,
    /// Rows padded to `width`.
    pub rows: Vec<Row>,
}

impl WritePlan {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }
}

/// Computes the write plan for `rows` against a table whose last populated row is `last_row`.
pub fn plan_write(
    mut rows: Vec<Row>,
    policy: LoadPolicy,
    last_row: usize,
) -> LoadResult<WritePlan> {
    let (clear_first, origin) = match policy {
        LoadPolicy::Append if last_row > 0 => {
            if !rows.is_empty() {
                rows.remove(0);
            }
            (false, CellPosition::row_start(last_row + 1)?)
        }
        LoadPolicy::Append => (false, CellPosition::ORIGIN),
        LoadPolicy::Overwrite => (true, CellPosition::ORIGIN),
    };

    let width = max_width(&rows);
    pad_rows(&mut rows, width);

    tracing::debug!(
        %policy,
        clear_first,
        origin_row = origin.row(),
        rows = rows.len(),
        width,
        "planned table write"
    );

    Ok(WritePlan {
        clear_first,
        origin,
        width,
        rows,
    })
}

/// Builds the anchor note for a load, placing `note` above the `previous` history.
pub fn compose_anchor_note(policy: LoadPolicy, note: &str, previous: Option<&str>) -> String {
    let separator = "-".repeat(NOTE_SEPARATOR_WIDTH);
    format!(
        "Update Mode: {policy}\n\n{note}\n{separator}\n{}",
        previous.unwrap_or("")
    )
    .trim()
    .to_owned()
}

/// Applies a write plan to `table`, returning the number of rows written.
///
/// An overwrite clears the table before anything else, so a failed write leaves it empty. An
/// append issues a single write, so a failed write leaves it untouched.
pub fn apply_plan<T: Table + ?Sized>(table: &mut T, plan: &WritePlan) -> LoadResult<usize> {
    if plan.clear_first {
        table.clear()?;
    }

    if plan.is_empty() {
        return Ok(0);
    }

    table.write_range(plan.origin, &plan.rows)?;
    Ok(plan.row_count())
}

/// Loads decoded rows into `table` and records `note` on the anchor cell.
///
/// A missing or empty note leaves the anchor note unchanged. Returns the number of rows written.
pub fn populate_table<T: Table + ?Sized>(
    table: &mut T,
    rows: Vec<Row>,
    policy: LoadPolicy,
    note: Option<&str>,
) -> LoadResult<usize> {
    let plan = plan_write(rows, policy, table.last_row())?;
    let written = apply_plan(table, &plan)?;

    if let Some(note) = note.filter(|n| !n.is_empty()) {
        let previous = table.anchor_note()?;
        let updated = compose_anchor_note(policy, note, previous.as_deref());
        table.set_anchor_note(&updated)?;
    }

    tracing::info!(
        table = %table.name(),
        %policy,
        rows = written,
        start_row = plan.origin.row(),
        "loaded report rows"
    );

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Worksheet;
    use crate::LoadError;
    use sheetload_types::TableName;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sheet_with(rows: usize) -> Worksheet {
        let data = (1..=rows).map(|i| row(&[format!("r{i}").as_str(), "x"])).collect();
        Worksheet::with_rows(TableName::new("Report").unwrap(), data)
    }

    #[test]
    fn test_append_to_populated_table_skips_header() {
        let rows = vec![row(&["h1", "h2"]), row(&["a", "b"]), row(&["c", "d"])];
        let plan = plan_write(rows, LoadPolicy::Append, 5).unwrap();

        assert!(!plan.clear_first);
        assert_eq!(plan.origin, CellPosition::row_start(6).unwrap());
        assert_eq!(plan.rows, vec![row(&["a", "b"]), row(&["c", "d"])]);
    }

    #[test]
    fn test_append_to_empty_table_keeps_header() {
        let rows = vec![row(&["h1"]), row(&["a"])];
        let plan = plan_write(rows, LoadPolicy::Append, 0).unwrap();

        assert_eq!(plan.origin, CellPosition::ORIGIN);
        assert_eq!(plan.row_count(), 2);
    }

    #[test]
    fn test_overwrite_clears_and_starts_at_origin() {
        let plan = plan_write(vec![row(&["a"])], LoadPolicy::Overwrite, 40).unwrap();
        assert!(plan.clear_first);
        assert_eq!(plan.origin, CellPosition::ORIGIN);
    }

    #[test]
    fn test_plan_pads_ragged_rows() {
        let rows = vec![row(&["a", "b", "c"]), row(&["d"])];
        let plan = plan_write(rows, LoadPolicy::Overwrite, 0).unwrap();
        assert_eq!(plan.width, 3);
        assert_eq!(plan.rows, vec![row(&["a", "b", "c"]), row(&["d", "", ""])]);
    }

    #[test]
    fn test_compose_anchor_note_prepends_history() {
        let note = compose_anchor_note(LoadPolicy::Append, "Y", Some("X"));
        assert_eq!(
            note,
            "Update Mode: append\n\nY\n--------------------------------------------------\nX"
        );
    }

    #[test]
    fn test_compose_anchor_note_without_previous_is_trimmed() {
        let note = compose_anchor_note(LoadPolicy::Overwrite, "Y", None);
        assert!(note.ends_with(&"-".repeat(50)));
        assert!(note.starts_with("Update Mode: overwrite\n\nY\n"));
    }

    #[test]
    fn test_populate_append_writes_two_rows_at_row_six() {
        let mut sheet = sheet_with(5);
        let rows = vec![row(&["h1", "h2"]), row(&["a", "b"]), row(&["c", "d"])];

        let written = populate_table(&mut sheet, rows, LoadPolicy::Append, None).unwrap();

        assert_eq!(written, 2);
        assert_eq!(sheet.last_row(), 7);
        let values = sheet.values().unwrap();
        assert_eq!(values[4], row(&["r5", "x"]));
        assert_eq!(values[5], row(&["a", "b"]));
        assert_eq!(values[6], row(&["c", "d"]));
    }

    #[test]
    fn test_populate_overwrite_replaces_prior_content() {
        let mut sheet = sheet_with(5);
        let rows = vec![row(&["h"]), row(&["v"])];

        let written = populate_table(&mut sheet, rows, LoadPolicy::Overwrite, None).unwrap();

        assert_eq!(written, 2);
        assert_eq!(sheet.values().unwrap(), vec![row(&["h"]), row(&["v"])]);
    }

    #[test]
    fn test_populate_with_no_rows_is_a_noop_write() {
        let mut sheet = sheet_with(2);
        let written = populate_table(&mut sheet, Vec::new(), LoadPolicy::Append, None).unwrap();
        assert_eq!(written, 0);
        assert_eq!(sheet.last_row(), 2);
    }

    #[test]
    fn test_populate_overwrite_with_no_rows_still_clears() {
        let mut sheet = sheet_with(2);
        let written =
            populate_table(&mut sheet, Vec::new(), LoadPolicy::Overwrite, None).unwrap();
        assert_eq!(written, 0);
        assert_eq!(sheet.last_row(), 0);
    }

    #[test]
    fn test_populate_chains_anchor_notes() {
        let mut sheet = sheet_with(0);
        populate_table(&mut sheet, vec![row(&["a"])], LoadPolicy::Overwrite, Some("X")).unwrap();
        populate_table(&mut sheet, vec![row(&["a"])], LoadPolicy::Append, Some("Y")).unwrap();

        let note = sheet.anchor_note().unwrap().unwrap();
        assert!(note.starts_with("Update Mode: append\n\nY\n"));
        assert!(note.ends_with(&format!("Update Mode: overwrite\n\nX\n{}", "-".repeat(50))));
    }

    #[test]
    fn test_populate_ignores_empty_note() {
        let mut sheet = sheet_with(1);
        populate_table(&mut sheet, vec![row(&["a"])], LoadPolicy::Append, Some("")).unwrap();
        assert_eq!(sheet.anchor_note().unwrap(), None);
    }

    /// Table whose writes always fail, for checking what state a failed load leaves behind.
    struct FailingWrites(Worksheet);

    impl Table for FailingWrites {
        fn name(&self) -> &TableName {
            self.0.name()
        }
        fn last_row(&self) -> usize {
            self.0.last_row()
        }
        fn values(&self) -> LoadResult<Vec<Row>> {
            self.0.values()
        }
        fn clear(&mut self) -> LoadResult<()> {
            self.0.clear()
        }
        fn write_range(&mut self, _origin: CellPosition, _values: &[Row]) -> LoadResult<()> {
            Err(LoadError::Store("write rejected".into()))
        }
        fn anchor_note(&self) -> LoadResult<Option<String>> {
            self.0.anchor_note()
        }
        fn set_anchor_note(&mut self, note: &str) -> LoadResult<()> {
            self.0.set_anchor_note(note)
        }
    }

    #[test]
    fn test_failed_append_leaves_table_untouched() {
        let mut table = FailingWrites(sheet_with(3));
        let before = table.values().unwrap();

        let result = populate_table(
            &mut table,
            vec![row(&["h"]), row(&["a"])],
            LoadPolicy::Append,
            Some("n"),
        );

        assert!(matches!(result, Err(LoadError::Store(_))));
        assert_eq!(table.values().unwrap(), before);
        assert_eq!(table.anchor_note().unwrap(), None);
    }

    #[test]
    fn test_failed_overwrite_leaves_table_cleared() {
        let mut table = FailingWrites(sheet_with(3));

        let result = populate_table(&mut table, vec![row(&["a"])], LoadPolicy::Overwrite, None);

        assert!(result.is_err());
        assert_eq!(table.last_row(), 0);
    }
}
