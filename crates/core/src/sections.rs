//! Section extraction for report payloads.
//!
//! A payload is plain text that may carry up to four tagged sections in any textual order.
//! Sections are pulled out one tag pair at a time; each extraction works on the text left over
//! by the previous one, so the whole decode is a fold over the tag pairs threading the residual.

use crate::constants::{ANCHOR_NOTE_TAG, CONFIRMATION_TAG, EXECUTION_HISTORY_TAG, REPORT_DATA_TAG};
use crate::csv::trim_text;

/// A literal start/end marker pair delimiting one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTag {
    pub start: &'static str,
    pub end: &'static str,
}

impl SectionTag {
    pub const fn new(start: &'static str, end: &'static str) -> Self {
        Self { start, end }
    }
}

/// Result of extracting one tag pair from a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Trimmed text between the tags, or `None` if the pair was absent or malformed.
    pub content: Option<String>,
    /// Text left for the next extraction.
    pub residual: String,
}

/// The logical parts of a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedSections {
    pub confirmation_message: Option<String>,
    pub history_block: Option<String>,
    pub note: Option<String>,
    pub report_body: String,
}

/// Extracts the section delimited by `tag` from `text`.
///
/// Only the first occurrence of each tag is considered. When either tag is missing, or the end
/// tag does not begin after the whole start tag, nothing is extracted and `text` is returned
/// unchanged as the residual.
pub fn extract_section(text: &str, tag: SectionTag) -> Extraction {
    let located = text
        .find(tag.start)
        .zip(text.find(tag.end))
        .filter(|(start_idx, end_idx)| *end_idx >= start_idx + tag.start.len());

    let Some((start_idx, end_idx)) = located else {
        return Extraction {
            content: None,
            residual: text.to_owned(),
        };
    };

    let content = trim_text(&text[start_idx + tag.start.len()..end_idx]).to_owned();
    let mut residual = String::with_capacity(text.len());
    residual.push_str(&text[..start_idx]);
    residual.push_str(&text[end_idx + tag.end.len()..]);

    Extraction {
        content: Some(content),
        residual: trim_text(&residual).to_owned(),
    }
}

/// Splits a raw payload into its confirmation, history, note and report sections.
///
/// Extraction order is fixed: confirmation, history, note, report. When the report tags are
/// absent the report body is whatever text remains, trimmed.
pub fn decode_sections(raw: &str) -> DecodedSections {
    let mut residual = raw.to_owned();
    let mut take = |tag: SectionTag| {
        let extraction = extract_section(&residual, tag);
        residual = extraction.residual;
        extraction.content
    };

    let confirmation_message = take(CONFIRMATION_TAG);
    let history_block = take(EXECUTION_HISTORY_TAG);
    let note = take(ANCHOR_NOTE_TAG);
    let report = take(REPORT_DATA_TAG);

    // Empty report tags still win over the residual.
    let report_body = match report {
        Some(body) => body,
        None => trim_text(&residual).to_owned(),
    };

    tracing::debug!(
        confirmation = confirmation_message.is_some(),
        history = history_block.is_some(),
        note = note.is_some(),
        report_bytes = report_body.len(),
        "decoded payload sections"
    );

    DecodedSections {
        confirmation_message,
        history_block,
        note,
        report_body,
    }
}
