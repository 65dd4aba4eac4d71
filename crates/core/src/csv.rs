//! CSV grammar for report bodies.
//!
//! The dialect is close to RFC 4180 with a few deliberate differences:
//! - every cell is trimmed when it is emitted, quoted or not. A byte order mark counts as
//!   whitespace;
//! - a quote may open anywhere in a cell, not only at its start;
//! - `\r` is ordinary content. Trimming removes it at the end of a cell, so it only survives
//!   inside the interior of a quoted field;
//! - rows are not normalised to a common width.

/// A decoded row of cells.
pub type Row = Vec<String>;

/// Parses `text` into rows of cells in a single pass.
pub fn parse_csv(text: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut row: Row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                row.push(trim_text(&cell).to_owned());
                cell.clear();
            }
            '\n' if !in_quotes => {
                row.push(trim_text(&cell).to_owned());
                cell.clear();
                rows.push(std::mem::take(&mut row));
            }
            _ => cell.push(ch),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(trim_text(&cell).to_owned());
        rows.push(row);
    }

    rows
}

/// Trims whitespace and U+FEFF from both ends of `text`.
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Width of the widest row, or 0 when there are no rows.
pub fn max_width(rows: &[Row]) -> usize {
    rows.iter().map(Vec::len).max().unwrap_or(0)
}

/// Pads every row with empty cells up to `width`. Rows are never truncated.
pub fn pad_rows(rows: &mut [Row], width: usize) {
    for row in rows.iter_mut() {
        if row.len() < width {
            row.resize(width, String::new());
        }
    }
}
