//! Constants used throughout the SheetLoad core crate.
//!
//! Wire tags are literal and case-sensitive.

use crate::sections::SectionTag;

/// Tags around the prompt the server wants confirmed before it runs the report.
pub const CONFIRMATION_TAG: SectionTag =
    SectionTag::new("#CONFIRMATION_MSG_START#", "#CONFIRMATION_MSG_END#");

/// Tags around the comma-separated execution summary for the history table.
pub const EXECUTION_HISTORY_TAG: SectionTag =
    SectionTag::new("#EXECUTION_HISTORY_START#", "#EXECUTION_HISTORY_END#");

/// Tags around the note attached to the anchor cell of each target table.
pub const ANCHOR_NOTE_TAG: SectionTag = SectionTag::new("#A1_NOTE_START#", "#A1_NOTE_END#");

/// Tags around the CSV report body.
pub const REPORT_DATA_TAG: SectionTag =
    SectionTag::new("#REPORT_DATA_START#", "#REPORT_DATA_END#");

/// Number of dashes between successive anchor note entries.
pub const NOTE_SEPARATOR_WIDTH: usize = 50;

/// Name of the table that collects one row per fetch carrying a history block.
pub const HISTORY_TABLE_NAME: &str = "Execution History";

/// Header row written when the history table is first created.
pub const HISTORY_HEADERS: &[&str] = &[
    "Target Tabs",
    "Data Load Mode",
    "Email",
    "Run ID",
    "Invoked at",
    "Time Taken (Seconds)",
    "Rows fetched",
    "API Calls Counts",
];

/// Default name of the key/value table holding run parameters.
pub const DEFAULT_SETTINGS_TABLE: &str = "Developer Settings";

/// Default workbook file used by the binaries.
pub const DEFAULT_WORKBOOK_PATH: &str = "workbook.json";

/// Default HTTP timeout applied by the runtime binary.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Parameter set on the re-fetch after the user accepts a confirmation prompt.
pub const CONFIRM_API_HITS_PARAM: &str = "confirm_api_hits";

/// Parameter carrying the per-attempt run identifier.
pub const RUN_ID_PARAM: &str = "runid";
