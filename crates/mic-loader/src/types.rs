//! Loader-specific types: errors, configuration and statistics.

use std::path::PathBuf;
use std::time::Duration;

use mic_types::{MicBuildError, SchemaRevision};
use thiserror::Error;

/// Published location of the ISO 10383 MIC dataset.
pub const DEFAULT_DATASET_URL: &str =
    "https://www.iso20022.org/sites/default/files/ISO10383_MIC/ISO10383_MIC.csv";

/// Default HTTP timeout for the online source.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fatal errors. Any of these aborts construction of a lookup.
#[derive(Error, Debug)]
pub enum MicError {
    /// The online source could not be reached or answered with an error status.
    #[error("failed to download MIC dataset from {url}: {source}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// I/O error while reading the dataset stream.
    #[error("IO error reading MIC dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The configured offline snapshot does not exist.
    #[error("offline MIC dataset not found: {path}")]
    OfflineResourceMissing {
        /// The path that was not found.
        path: String,
    },

    /// The input has no header line.
    #[error("MIC dataset is empty: missing header line")]
    MissingHeader,

    /// Header column count does not match the schema revision.
    #[error("schema mismatch for {revision} revision: expected {expected} columns, found {found}")]
    SchemaMismatch {
        /// The revision the parser was targeting.
        revision: SchemaRevision,
        /// Expected column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// A data row was malformed and the strict row policy is active.
    #[error("malformed row: {0}")]
    MalformedRow(#[from] RowError),
}

/// Result type for fatal loader operations.
pub type MicResult<T> = Result<T, MicError>;

/// Errors confined to a single data row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The line did not split into the revision's column count.
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        /// 1-based line number in the source.
        line: usize,
        /// Expected column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// The columns could not be turned into a record.
    #[error("line {line}: {source}")]
    InvalidRecord {
        /// 1-based line number in the source.
        line: usize,
        /// Why the record was rejected.
        #[source]
        source: MicBuildError,
    },
}

impl RowError {
    /// 1-based line number of the offending row.
    pub fn line(&self) -> usize {
        match self {
            Self::ColumnCount { line, .. } | Self::InvalidRecord { line, .. } => *line,
        }
    }
}

/// What to do with a data row that cannot be turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowErrorPolicy {
    /// Log the row, count it in [`ParseStats::skipped_rows`] and continue.
    #[default]
    Skip,
    /// Abort the whole load with [`MicError::MalformedRow`].
    Strict,
}

/// Where a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Downloaded from the configured URL.
    Online,
    /// Read from the bundled snapshot or a configured file.
    Offline,
}

impl DataSource {
    /// Returns true for [`DataSource::Online`].
    pub fn is_downloaded(self) -> bool {
        self == Self::Online
    }
}

/// Which source(s) a load may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadMode {
    /// Download only; a transport failure is returned to the caller.
    Online,
    /// Offline snapshot only.
    Offline,
    /// Download, falling back to the offline snapshot if the download fails.
    #[default]
    PreferOnline,
}

/// Configuration for loading the MIC dataset.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// URL of the online dataset.
    pub url: String,
    /// Offline snapshot file. `None` uses the snapshot bundled with this crate.
    pub offline_path: Option<PathBuf>,
    /// Column layout both sources are expected to have.
    pub revision: SchemaRevision,
    /// Handling of malformed data rows.
    pub row_policy: RowErrorPolicy,
    /// Total timeout for the HTTP request.
    pub timeout: Duration,
    /// User-Agent header sent with the HTTP request.
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATASET_URL.to_string(),
            offline_path: None,
            revision: SchemaRevision::default(),
            row_policy: RowErrorPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("mic-loader/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LoaderConfig {
    /// Environment variable overriding [`LoaderConfig::url`].
    pub const URL_VAR: &'static str = "MIC_DATASET_URL";
    /// Environment variable overriding [`LoaderConfig::offline_path`].
    pub const OFFLINE_PATH_VAR: &'static str = "MIC_OFFLINE_PATH";
    /// Environment variable overriding [`LoaderConfig::revision`] (`legacy` / `extended`).
    pub const REVISION_VAR: &'static str = "MIC_SCHEMA_REVISION";
    /// Environment variable overriding [`LoaderConfig::timeout`], in seconds.
    pub const TIMEOUT_VAR: &'static str = "MIC_HTTP_TIMEOUT_SECS";

    /// Creates the default configuration with environment overrides applied.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(Self::URL_VAR) {
            self.url = url;
        }

        if let Some(path) = lookup(Self::OFFLINE_PATH_VAR) {
            self.offline_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup(Self::REVISION_VAR) {
            match SchemaRevision::from_name(&name) {
                Some(revision) => self.revision = revision,
                None => tracing::warn!("Ignoring unknown {}: {}", Self::REVISION_VAR, name),
            }
        }

        if let Some(secs) = lookup(Self::TIMEOUT_VAR) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!("Ignoring invalid {}: {}", Self::TIMEOUT_VAR, secs),
            }
        }

        self
    }
}

/// Statistics from parsing a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Non-blank data lines read (header excluded).
    pub total_rows: usize,
    /// Rows that became records.
    pub parsed_records: usize,
    /// Rows rejected as malformed.
    pub skipped_rows: usize,
    /// Blank lines ignored.
    pub blank_lines: usize,
    /// Lines, header included, whose invalid UTF-8 was replaced.
    pub lossy_lines: usize,
    /// Time taken to parse in milliseconds.
    pub parse_time_ms: u64,
}

impl ParseStats {
    /// Returns the percentage of data rows that became records.
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            100.0
        } else {
            (self.parsed_records as f64 / self.total_rows as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_loader_config_default() {
        let config = LoaderConfig::default();
        assert_eq!(config.url, DEFAULT_DATASET_URL);
        assert!(config.offline_path.is_none());
        assert_eq!(config.revision, SchemaRevision::Extended);
        assert_eq!(config.row_policy, RowErrorPolicy::Skip);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("mic-loader/"));
    }

    #[test]
    fn test_loader_config_overrides() {
        let vars: HashMap<&str, &str> = [
            (LoaderConfig::URL_VAR, "http://localhost:8080/mic.csv"),
            (LoaderConfig::OFFLINE_PATH_VAR, "/srv/mic.csv"),
            (LoaderConfig::REVISION_VAR, "Legacy"),
            (LoaderConfig::TIMEOUT_VAR, "5"),
        ]
        .into_iter()
        .collect();

        let config =
            LoaderConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.url, "http://localhost:8080/mic.csv");
        assert_eq!(config.offline_path, Some(PathBuf::from("/srv/mic.csv")));
        assert_eq!(config.revision, SchemaRevision::Legacy);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_loader_config_ignores_invalid_overrides() {
        let config = LoaderConfig::default().with_overrides(|key| match key {
            LoaderConfig::REVISION_VAR => Some("v9".to_string()),
            LoaderConfig::TIMEOUT_VAR => Some("soon".to_string()),
            _ => None,
        });

        assert_eq!(config.revision, SchemaRevision::Extended);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_parse_stats_success_rate() {
        let stats = ParseStats {
            total_rows: 200,
            parsed_records: 150,
            skipped_rows: 50,
            ..Default::default()
        };
        assert!((stats.success_rate() - 75.0).abs() < 0.01);
        assert!((ParseStats::default().success_rate() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_row_error_line() {
        let err = RowError::ColumnCount {
            line: 7,
            expected: 17,
            found: 3,
        };
        assert_eq!(err.line(), 7);
        assert_eq!(err.to_string(), "line 7: expected 17 columns, found 3");
    }

    #[test]
    fn test_data_source_is_downloaded() {
        assert!(DataSource::Online.is_downloaded());
        assert!(!DataSource::Offline.is_downloaded());
    }
}
