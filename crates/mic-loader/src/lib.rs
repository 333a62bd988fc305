//! # mic-loader
//!
//! Loader and in-memory lookup index for the ISO 10383 Market Identifier
//! Code (MIC) dataset.
//!
//! The dataset can be downloaded from its published location or read from
//! an offline snapshot (bundled with this crate, or a file). Parsed records
//! are held in an immutable [`MicLookup`] indexed by MIC, operating MIC and
//! country code.
//!
//! ## Features
//!
//! - `parallel` (default): Parses data rows on the rayon thread pool.
//!
//! ## Usage
//!
//! ```rust
//! use mic_loader::{LoadMode, LoaderConfig, MicLookup};
//!
//! let lookup = MicLookup::load(LoadMode::Offline, &LoaderConfig::default()).unwrap();
//!
//! for mic in lookup.by_operating_mic("XSTO") {
//!     println!("{} {}", mic.mic(), mic.name_institution_description());
//! }
//! assert!(!lookup.is_downloaded());
//! ```

#![warn(missing_docs)]

mod cache;
mod loader;
mod parser;
mod store;
mod types;

#[cfg(test)]
mod test_support;

pub use cache::MicLookupCache;
pub use loader::{bundled_snapshot, fetch_online, load_dataset, open_offline, parse_dataset};
pub use parser::{from_record, parse_line, split_columns, MicParser, ParsedDataset};
pub use store::MicLookup;
pub use types::{
    DataSource, LoadMode, LoaderConfig, MicError, MicResult, ParseStats, RowError,
    RowErrorPolicy, DEFAULT_DATASET_URL, DEFAULT_TIMEOUT,
};

// Re-export mic-types for convenience
pub use mic_types;
