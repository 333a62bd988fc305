//! In-memory MIC lookup index.
//!
//! A [`MicLookup`] is built once from a parsed dataset and is read-only
//! afterwards. It can be shared between threads behind an `Arc` without
//! locking.

use std::collections::HashMap;
use std::io::BufRead;

use mic_types::{Mic, SchemaRevision};

use crate::loader::{load_dataset, parse_dataset};
use crate::parser::ParsedDataset;
use crate::types::{DataSource, LoadMode, LoaderConfig, MicResult, ParseStats};

/// Immutable snapshot of the MIC dataset with lookup indices.
///
/// # Example
///
/// ```
/// use mic_loader::{LoaderConfig, MicLookup};
///
/// let lookup = MicLookup::offline(&LoaderConfig::default()).unwrap();
///
/// let xsto = lookup.get("XSTO").unwrap();
/// assert_eq!(xsto.country_code(), "SE");
/// assert!(lookup.get("AAAA").is_none());
/// assert!(lookup.by_operating_mic("AAAA").is_empty());
/// ```
pub struct MicLookup {
    /// All records in source order.
    records: Vec<Mic>,
    /// Record position by MIC. Last occurrence wins.
    by_mic: HashMap<String, usize>,
    /// Record positions by operating MIC, in source order.
    by_operating_mic: HashMap<String, Vec<usize>>,
    /// Record positions by country code, in source order.
    by_country_code: HashMap<String, Vec<usize>>,
    source: DataSource,
    revision: SchemaRevision,
    stats: ParseStats,
}

impl std::fmt::Debug for MicLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicLookup")
            .field("records", &self.records.len())
            .field("by_mic", &self.by_mic.len())
            .field("by_operating_mic", &self.by_operating_mic.len())
            .field("by_country_code", &self.by_country_code.len())
            .field("source", &self.source)
            .field("revision", &self.revision)
            .finish()
    }
}

impl MicLookup {
    /// Builds the indices over the given records.
    ///
    /// The snapshot's revision is taken from the first record, or the
    /// default revision when there are none.
    pub fn from_records(records: Vec<Mic>, source: DataSource) -> Self {
        let stats = ParseStats {
            total_rows: records.len(),
            parsed_records: records.len(),
            ..Default::default()
        };
        let revision = records.first().map(Mic::revision).unwrap_or_default();
        Self::build(records, source, revision, stats)
    }

    /// Builds the indices over a parsed dataset, keeping its revision and
    /// statistics.
    pub fn from_dataset(dataset: ParsedDataset, source: DataSource) -> Self {
        Self::build(dataset.records, source, dataset.revision, dataset.stats)
    }

    /// Parses a dataset stream and builds the indices.
    pub fn from_reader<R: BufRead>(
        reader: R,
        config: &LoaderConfig,
        source: DataSource,
    ) -> MicResult<Self> {
        let dataset = parse_dataset(reader, config)?;
        Ok(Self::from_dataset(dataset, source))
    }

    fn build(
        records: Vec<Mic>,
        source: DataSource,
        revision: SchemaRevision,
        stats: ParseStats,
    ) -> Self {
        let mut by_mic = HashMap::with_capacity(records.len());
        let mut by_operating_mic: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_country_code: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, mic) in records.iter().enumerate() {
            by_mic.insert(mic.mic().to_string(), i);
            by_operating_mic
                .entry(mic.operating_mic().to_string())
                .or_default()
                .push(i);
            by_country_code
                .entry(mic.country_code().to_string())
                .or_default()
                .push(i);
        }

        Self {
            records,
            by_mic,
            by_operating_mic,
            by_country_code,
            source,
            revision,
            stats,
        }
    }

    /// Loads the dataset according to `mode`.
    ///
    /// # Errors
    /// Returns the fatal error of the source that was used. With
    /// [`LoadMode::PreferOnline`] an online failure is logged and only the
    /// offline error can be returned.
    pub fn load(mode: LoadMode, config: &LoaderConfig) -> MicResult<Self> {
        match mode {
            LoadMode::Online => Self::online(config),
            LoadMode::Offline => Self::offline(config),
            LoadMode::PreferOnline => Self::load_preferred(config),
        }
    }

    /// Downloads the dataset. Transport failures are returned, not retried.
    pub fn online(config: &LoaderConfig) -> MicResult<Self> {
        Self::load_from(DataSource::Online, config)
    }

    /// Loads the offline snapshot.
    pub fn offline(config: &LoaderConfig) -> MicResult<Self> {
        Self::load_from(DataSource::Offline, config)
    }

    /// Downloads the dataset, falling back to the offline snapshot if and
    /// only if the download fails.
    pub fn load_preferred(config: &LoaderConfig) -> MicResult<Self> {
        Self::online(config).or_else(|e| {
            tracing::warn!("Online MIC load failed, using offline snapshot: {}", e);
            Self::offline(config)
        })
    }

    fn load_from(source: DataSource, config: &LoaderConfig) -> MicResult<Self> {
        let dataset = load_dataset(source, config)?;
        let lookup = Self::from_dataset(dataset, source);

        tracing::info!(
            "Loaded {} MICs ({} skipped) from {:?} source in {} ms",
            lookup.len(),
            lookup.stats.skipped_rows,
            source,
            lookup.stats.parse_time_ms
        );

        Ok(lookup)
    }

    // Query methods

    /// Gets a record by its MIC.
    pub fn get(&self, mic: &str) -> Option<&Mic> {
        self.by_mic.get(mic).map(|&i| &self.records[i])
    }

    /// Returns true if a MIC exists in the index.
    pub fn contains(&self, mic: &str) -> bool {
        self.by_mic.contains_key(mic)
    }

    /// Gets all records belonging to an operating MIC, in source order.
    ///
    /// Returns an empty Vec for an unknown code.
    pub fn by_operating_mic(&self, operating_mic: &str) -> Vec<&Mic> {
        Self::resolve(&self.records, self.by_operating_mic.get(operating_mic))
    }

    /// Gets all records registered in a country, in source order.
    ///
    /// Returns an empty Vec for an unknown code.
    pub fn by_country_code(&self, country_code: &str) -> Vec<&Mic> {
        Self::resolve(&self.records, self.by_country_code.get(country_code))
    }

    fn resolve<'a>(records: &'a [Mic], positions: Option<&Vec<usize>>) -> Vec<&'a Mic> {
        positions
            .map(|positions| positions.iter().map(|&i| &records[i]).collect())
            .unwrap_or_default()
    }

    /// Returns all records in source order.
    pub fn all(&self) -> &[Mic] {
        &self.records
    }

    /// Returns an iterator over all records in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Mic> {
        self.records.iter()
    }

    /// Returns an iterator over the distinct operating MICs.
    pub fn operating_mics(&self) -> impl Iterator<Item = &str> {
        self.by_operating_mic.keys().map(String::as_str)
    }

    /// Returns an iterator over the distinct country codes.
    pub fn country_codes(&self) -> impl Iterator<Item = &str> {
        self.by_country_code.keys().map(String::as_str)
    }

    // Statistics

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if the data was downloaded rather than read offline.
    pub fn is_downloaded(&self) -> bool {
        self.source.is_downloaded()
    }

    /// Returns the source the data came from.
    pub fn source(&self) -> DataSource {
        self.source
    }

    /// Returns the column layout the snapshot was parsed under.
    pub fn revision(&self) -> SchemaRevision {
        self.revision
    }

    /// Returns the parse statistics of the load that built this snapshot.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }
}

impl<'a> IntoIterator for &'a MicLookup {
    type Item = &'a Mic;
    type IntoIter = std::slice::Iter<'a, Mic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
