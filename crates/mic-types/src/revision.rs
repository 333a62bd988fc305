//! Dataset schema revisions.
//!
//! The ISO 10383 dataset has been published with different column layouts
//! over time. A [`SchemaRevision`] fixes the expected column count, the
//! positional column order and the date pattern used by the derived date
//! accessors.

use std::fmt;

/// Header of the legacy 13-column layout.
const LEGACY_COLUMNS: &[&str] = &[
    "COUNTRY",
    "ISO COUNTRY CODE (ISO 3166)",
    "MIC",
    "OPERATING MIC",
    "O/S",
    "NAME-INSTITUTION DESCRIPTION",
    "ACRONYM",
    "CITY",
    "WEBSITE",
    "STATUS DATE",
    "STATUS",
    "CREATION DATE",
    "COMMENTS",
];

/// Header of the extended 17-column layout.
const EXTENDED_COLUMNS: &[&str] = &[
    "MIC",
    "OPERATING MIC",
    "OPRT/SGMT",
    "MARKET NAME-INSTITUTION DESCRIPTION",
    "LEGAL ENTITY NAME",
    "LEI",
    "MARKET CATEGORY CODE",
    "ACRONYM",
    "ISO COUNTRY CODE (ISO 3166)",
    "CITY",
    "WEBSITE",
    "STATUS",
    "CREATION DATE",
    "LAST UPDATE DATE",
    "LAST VALIDATION DATE",
    "EXPIRY DATE",
    "COMMENTS",
];

/// Column layout of a MIC dataset file.
///
/// # Examples
///
/// ```
/// use mic_types::SchemaRevision;
///
/// assert_eq!(SchemaRevision::Extended.column_count(), 17);
/// assert_eq!(SchemaRevision::Legacy.column_count(), 13);
/// assert_eq!(SchemaRevision::from_name("legacy"), Some(SchemaRevision::Legacy));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SchemaRevision {
    /// 13 columns, status dates as `MONTH YYYY`, statuses ACTIVE/MODIFIED/DELETED.
    Legacy,
    /// 17 columns with legal entity, LEI and expiry fields, dates as `YYYYMMDD`.
    #[default]
    Extended,
}

impl SchemaRevision {
    /// Number of columns in a legacy file.
    pub const LEGACY_COLUMN_COUNT: usize = 13;
    /// Number of columns in an extended file.
    pub const EXTENDED_COLUMN_COUNT: usize = 17;

    /// Returns the exact number of columns a file of this revision has.
    pub fn column_count(self) -> usize {
        match self {
            Self::Legacy => Self::LEGACY_COLUMN_COUNT,
            Self::Extended => Self::EXTENDED_COLUMN_COUNT,
        }
    }

    /// Returns the published header names, in positional order.
    ///
    /// Header names are informational only; files are mapped by position.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Legacy => LEGACY_COLUMNS,
            Self::Extended => EXTENDED_COLUMNS,
        }
    }

    /// Human readable description of the date pattern used by this revision.
    pub fn date_format(self) -> &'static str {
        match self {
            Self::Legacy => "MONTH YYYY",
            Self::Extended => "YYYYMMDD",
        }
    }

    /// Short lowercase name, as accepted by [`SchemaRevision::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Extended => "extended",
        }
    }

    /// Looks up a revision by name (case-insensitive).
    ///
    /// Returns `None` if the name is not recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("legacy") {
            Some(Self::Legacy)
        } else if name.eq_ignore_ascii_case("extended") {
            Some(Self::Extended)
        } else {
            None
        }
    }
}

impl fmt::Display for SchemaRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
