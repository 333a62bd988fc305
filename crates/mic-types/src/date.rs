//! Date parsing for MIC date fields.
//!
//! Dates are stored on records as the raw dataset text. [`parse_date`]
//! turns that text into a calendar date according to the revision's
//! pattern.

use std::fmt;

use chrono::NaiveDate;

use crate::SchemaRevision;

/// Legacy sentinel meaning "some time before the given month".
pub const BEFORE_PREFIX: &str = "BEFORE ";

/// Error returned when a raw date does not match the revision's pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    value: String,
    revision: SchemaRevision,
}

impl DateParseError {
    fn new(value: &str, revision: SchemaRevision) -> Self {
        Self {
            value: value.to_string(),
            revision,
        }
    }

    /// The raw text that failed to parse.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The revision whose pattern was applied.
    pub fn revision(&self) -> SchemaRevision {
        self.revision
    }
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} date: '{}' (expected {})",
            self.revision,
            self.value,
            self.revision.date_format()
        )
    }
}

impl std::error::Error for DateParseError {}

/// Parses a raw dataset date.
///
/// - [`SchemaRevision::Extended`]: `YYYYMMDD`.
/// - [`SchemaRevision::Legacy`]: `MONTH YYYY` (month name in any case),
///   resolved to the first day of the month. A leading `BEFORE ` is
///   stripped first; the sentinel only exists in this revision.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use mic_types::{parse_date, SchemaRevision};
///
/// assert_eq!(
///     parse_date("20100726", SchemaRevision::Extended).unwrap(),
///     NaiveDate::from_ymd_opt(2010, 7, 26).unwrap()
/// );
/// assert_eq!(
///     parse_date("BEFORE JUNE 2005", SchemaRevision::Legacy).unwrap(),
///     NaiveDate::from_ymd_opt(2005, 6, 1).unwrap()
/// );
/// assert!(parse_date("JULY 2010", SchemaRevision::Extended).is_err());
/// ```
pub fn parse_date(raw: &str, revision: SchemaRevision) -> Result<NaiveDate, DateParseError> {
    let value = raw.trim();

    let parsed = match revision {
        SchemaRevision::Extended => {
            if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DateParseError::new(raw, revision));
            }
            NaiveDate::parse_from_str(value, "%Y%m%d")
        }
        SchemaRevision::Legacy => {
            let value = strip_before_prefix(value);
            NaiveDate::parse_from_str(&format!("1 {}", value), "%d %B %Y")
        }
    };

    parsed.map_err(|_| DateParseError::new(raw, revision))
}

fn strip_before_prefix(value: &str) -> &str {
    match value.get(..BEFORE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEFORE_PREFIX) => {
            value[BEFORE_PREFIX.len()..].trim_start()
        }
        _ => value,
    }
}
