//! MIC dataset parser.
//!
//! Provides a streaming parser for the comma-separated, double-quoted MIC
//! dataset. Fields are split on commas outside quoted spans and one layer of
//! surrounding quotes is removed; doubled quotes inside a field are kept as
//! they are.
//!
//! Lines are decoded as UTF-8 with invalid bytes replaced by U+FFFD, so a
//! stray byte affects only the text of its own row.

use std::borrow::Cow;
use std::io::BufRead;
use std::time::Instant;

use csv::StringRecord;
use mic_types::{Mic, MicBuildError, MicBuilder, SchemaRevision};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::types::{LoaderConfig, MicError, MicResult, ParseStats, RowError, RowErrorPolicy};

const BOM: char = '\u{feff}';

/// Records parsed from one dataset, with statistics.
#[derive(Debug, Clone)]
pub struct ParsedDataset {
    /// Records in source order.
    pub records: Vec<Mic>,
    /// Parse statistics.
    pub stats: ParseStats,
    /// Revision the records were parsed under.
    pub revision: SchemaRevision,
}

/// Splits one line into fields.
///
/// A comma separates fields only when it is outside a double-quoted span.
/// Each field loses one layer of surrounding quotes, if present.
///
/// Unlike `csv::Reader`, doubled quotes are not unescaped: `""` stays as
/// two quote characters. The fields are returned as a `StringRecord`.
///
/// # Examples
///
/// ```
/// use mic_loader::split_columns;
///
/// let fields = split_columns(r#"A,"B,C",D"#);
/// assert_eq!(fields.len(), 3);
/// assert_eq!(&fields[1], "B,C");
/// ```
pub fn split_columns(line: &str) -> StringRecord {
    let mut record = StringRecord::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, byte) in line.bytes().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                record.push_field(strip_quotes(&line[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    record.push_field(strip_quotes(&line[start..]));

    record
}

/// Removes one layer of surrounding double quotes.
fn strip_quotes(field: &str) -> &str {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        &field[1..field.len() - 1]
    } else {
        field
    }
}

/// Parses one data line into a record.
///
/// `line_no` is only used for error reporting.
///
/// # Errors
/// Returns a [`RowError`] if the line does not have exactly the revision's
/// column count or the MIC column is blank.
pub fn parse_line(line: &str, line_no: usize, revision: SchemaRevision) -> Result<Mic, RowError> {
    let columns = split_columns(line);

    if columns.len() != revision.column_count() {
        return Err(RowError::ColumnCount {
            line: line_no,
            expected: revision.column_count(),
            found: columns.len(),
        });
    }

    from_record(&columns, revision).map_err(|source| RowError::InvalidRecord {
        line: line_no,
        source,
    })
}

/// Maps positional columns onto a record.
///
/// Missing trailing columns read as empty text.
pub fn from_record(record: &StringRecord, revision: SchemaRevision) -> Result<Mic, MicBuildError> {
    let col = |i: usize| record.get(i).unwrap_or("");

    let builder = match revision {
        SchemaRevision::Legacy => MicBuilder::new(revision, col(2))
            .country(col(0))
            .country_code(col(1))
            .operating_mic(col(3))
            .market_type(col(4))
            .name_institution_description(col(5))
            .acronym(col(6))
            .city(col(7))
            .website(col(8))
            .last_update_date(col(9))
            .status(col(10))
            .creation_date(col(11))
            .comments(col(12)),
        SchemaRevision::Extended => MicBuilder::new(revision, col(0))
            .operating_mic(col(1))
            .market_type(col(2))
            .name_institution_description(col(3))
            .legal_entity_name(col(4))
            .lei_code(col(5))
            .market_category_code(col(6))
            .acronym(col(7))
            .country_code(col(8))
            .city(col(9))
            .website(col(10))
            .status(col(11))
            .creation_date(col(12))
            .last_update_date(col(13))
            .last_validation_date(col(14))
            .expiry_date(col(15))
            .comments(col(16)),
    };

    builder.build()
}

/// A streaming parser for MIC dataset files.
///
/// The header is read and validated on construction; records are then
/// produced one line at a time through [`Iterator`].
pub struct MicParser<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    revision: SchemaRevision,
    row_policy: RowErrorPolicy,
    line_no: usize,
    stats: ParseStats,
    started: Instant,
}

impl<R: BufRead> MicParser<R> {
    /// Creates a new parser from a reader.
    ///
    /// A leading byte-order mark is ignored.
    ///
    /// # Errors
    /// Returns [`MicError::MissingHeader`] for empty input,
    /// [`MicError::SchemaMismatch`] if the header column count differs from
    /// the configured revision, or [`MicError::Io`] if the stream fails.
    pub fn from_reader(reader: R, config: &LoaderConfig) -> MicResult<Self> {
        let mut parser = Self {
            reader,
            buf: Vec::new(),
            revision: config.revision,
            row_policy: config.row_policy,
            line_no: 0,
            stats: ParseStats::default(),
            started: Instant::now(),
        };

        let header = parser.next_line()?.ok_or(MicError::MissingHeader)?;
        let header = header.strip_prefix(BOM).unwrap_or(&header);
        Self::validate_header(header, parser.revision)?;

        Ok(parser)
    }

    /// Reads the next line without its `\n` or `\r\n` terminator.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; only a failing stream
    /// is an error.
    fn next_line(&mut self) -> MicResult<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        if self.buf.ends_with(b"\n") {
            self.buf.pop();
            if self.buf.ends_with(b"\r") {
                self.buf.pop();
            }
        }

        let line = match String::from_utf8_lossy(&self.buf) {
            Cow::Borrowed(line) => line.to_string(),
            Cow::Owned(line) => {
                tracing::warn!(
                    "Line {} is not valid UTF-8, invalid bytes replaced",
                    self.line_no
                );
                self.stats.lossy_lines += 1;
                line
            }
        };

        Ok(Some(line))
    }

    /// Validates that the header has the revision's column count.
    fn validate_header(header: &str, revision: SchemaRevision) -> MicResult<()> {
        let columns = split_columns(header);

        if columns.len() != revision.column_count() {
            return Err(MicError::SchemaMismatch {
                revision,
                expected: revision.column_count(),
                found: columns.len(),
            });
        }

        tracing::debug!(
            "Header matches {} revision ({} columns)",
            revision,
            columns.len()
        );
        Ok(())
    }

    /// Returns the revision being parsed.
    pub fn revision(&self) -> SchemaRevision {
        self.revision
    }

    /// Returns statistics for the lines read so far.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parses all remaining records into a Vec.
    pub fn parse_all(mut self) -> MicResult<ParsedDataset> {
        let mut records = Vec::new();
        for record in self.by_ref() {
            records.push(record?);
        }
        Ok(self.finish(records))
    }

    /// Parses all remaining records using rayon.
    ///
    /// Lines are buffered first and parsed in parallel. Record order, stats
    /// and row policy behave exactly as in [`MicParser::parse_all`].
    #[cfg(feature = "parallel")]
    pub fn parse_all_parallel(mut self) -> MicResult<ParsedDataset> {
        let first_line_no = self.line_no + 1;
        let mut lines = Vec::new();
        while let Some(line) = self.next_line()? {
            lines.push(line);
        }
        let revision = self.revision;

        let results: Vec<Result<Mic, RowError>> = lines
            .par_iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| parse_line(line, first_line_no + i, revision))
            .collect();

        self.stats.blank_lines += lines.len() - results.len();

        let mut records = Vec::with_capacity(results.len());
        for result in results {
            self.stats.total_rows += 1;
            match result {
                Ok(mic) => {
                    self.stats.parsed_records += 1;
                    records.push(mic);
                }
                Err(err) => self.reject(err)?,
            }
        }

        Ok(self.finish(records))
    }

    /// Applies the row policy to a malformed row.
    fn reject(&mut self, err: RowError) -> MicResult<()> {
        match self.row_policy {
            RowErrorPolicy::Skip => {
                tracing::warn!("Skipping malformed MIC row: {}", err);
                self.stats.skipped_rows += 1;
                Ok(())
            }
            RowErrorPolicy::Strict => Err(err.into()),
        }
    }

    fn finish(mut self, records: Vec<Mic>) -> ParsedDataset {
        self.stats.parse_time_ms = self.started.elapsed().as_millis() as u64;
        ParsedDataset {
            records,
            stats: self.stats,
            revision: self.revision,
        }
    }
}

impl<R: BufRead> Iterator for MicParser<R> {
    type Item = MicResult<Mic>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            };

            if line.trim().is_empty() {
                self.stats.blank_lines += 1;
                continue;
            }

            self.stats.total_rows += 1;
            match parse_line(&line, self.line_no, self.revision) {
                Ok(mic) => {
                    self.stats.parsed_records += 1;
                    return Some(Ok(mic));
                }
                Err(err) => {
                    if let Err(e) = self.reject(err) {
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}
