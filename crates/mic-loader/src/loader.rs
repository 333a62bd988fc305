//! Dataset sources: the online download and the offline snapshot.

use std::fs::File;
use std::io::{BufRead, BufReader};

use reqwest::blocking::{Client, Response};

use crate::parser::{MicParser, ParsedDataset};
use crate::types::{DataSource, LoaderConfig, MicError, MicResult};

/// Snapshot of the extended-revision dataset shipped with this crate.
const BUNDLED_SNAPSHOT: &[u8] = include_bytes!("../data/ISO10383_MIC.csv");

/// Returns the bundled offline snapshot.
pub fn bundled_snapshot() -> &'static [u8] {
    BUNDLED_SNAPSHOT
}

/// Opens a download stream for the configured URL.
///
/// # Errors
/// Returns [`MicError::Transport`] if the request cannot be sent, times out
/// or the server answers with a non-success status.
pub fn fetch_online(config: &LoaderConfig) -> MicResult<BufReader<Response>> {
    let client = Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|source| transport_error(config, source))?;

    tracing::info!("Downloading MIC dataset from {}", config.url);

    let response = client
        .get(&config.url)
        .send()
        .and_then(Response::error_for_status)
        .map_err(|source| transport_error(config, source))?;

    Ok(BufReader::new(response))
}

fn transport_error(config: &LoaderConfig, source: reqwest::Error) -> MicError {
    MicError::Transport {
        url: config.url.clone(),
        source,
    }
}

/// Opens the offline snapshot.
///
/// Uses [`LoaderConfig::offline_path`] when set, otherwise the snapshot
/// bundled with this crate.
///
/// # Errors
/// Returns [`MicError::OfflineResourceMissing`] if the configured file does
/// not exist.
pub fn open_offline(config: &LoaderConfig) -> MicResult<Box<dyn BufRead + Send>> {
    let Some(path) = &config.offline_path else {
        tracing::debug!("Using bundled MIC snapshot");
        return Ok(Box::new(BUNDLED_SNAPSHOT));
    };

    if !path.is_file() {
        return Err(MicError::OfflineResourceMissing {
            path: path.display().to_string(),
        });
    }

    tracing::debug!("Using offline MIC snapshot at {}", path.display());
    let file = File::open(path)?;
    Ok(Box::new(BufReader::new(file)))
}

/// Reads and parses the dataset from the given source.
pub fn load_dataset(source: DataSource, config: &LoaderConfig) -> MicResult<ParsedDataset> {
    match source {
        DataSource::Online => parse_dataset(fetch_online(config)?, config),
        DataSource::Offline => parse_dataset(open_offline(config)?, config),
    }
}

/// Parses a dataset stream, in parallel when the `parallel` feature is on.
pub fn parse_dataset<R: BufRead>(reader: R, config: &LoaderConfig) -> MicResult<ParsedDataset> {
    let parser = MicParser::from_reader(reader, config)?;

    #[cfg(feature = "parallel")]
    let dataset = parser.parse_all_parallel()?;
    #[cfg(not(feature = "parallel"))]
    let dataset = parser.parse_all()?;

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_once, UNREACHABLE_URL};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn online_config(url: String) -> LoaderConfig {
        LoaderConfig {
            url,
            ..Default::default()
        }
    }

    #[test]
    fn test_bundled_snapshot_parses() {
        let dataset = load_dataset(DataSource::Offline, &LoaderConfig::default()).unwrap();
        assert_eq!(dataset.records.len(), 32);
        assert_eq!(dataset.stats.skipped_rows, 0);
        assert!(dataset.records.iter().any(|m| m.mic() == "XSTO"));
    }

    #[test]
    fn test_offline_missing_path() {
        let config = LoaderConfig {
            offline_path: Some(PathBuf::from("/nonexistent/ISO10383_MIC.csv")),
            ..Default::default()
        };

        match open_offline(&config) {
            Err(MicError::OfflineResourceMissing { path }) => {
                assert!(path.ends_with("ISO10383_MIC.csv"))
            }
            other => panic!("expected missing resource, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_offline_from_path() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("ISO10383_MIC.csv");
        std::fs::write(&path, bundled_snapshot()).unwrap();

        let config = LoaderConfig {
            offline_path: Some(path),
            ..Default::default()
        };
        let dataset = load_dataset(DataSource::Offline, &config).unwrap();
        assert_eq!(dataset.records.len(), 32);
    }

    #[test]
    fn test_online_download() {
        let mut body = "\u{feff}".as_bytes().to_vec();
        body.extend_from_slice(bundled_snapshot());
        let config = online_config(serve_once("200 OK", body));

        let dataset = load_dataset(DataSource::Online, &config).unwrap();
        assert_eq!(dataset.records.len(), 32);
    }

    #[test]
    fn test_online_error_status() {
        let config = online_config(serve_once("404 Not Found", b"not here".to_vec()));

        match load_dataset(DataSource::Online, &config) {
            Err(MicError::Transport { url, source }) => {
                assert_eq!(url, config.url);
                assert_eq!(source.status().map(|s| s.as_u16()), Some(404));
            }
            other => panic!("expected transport error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_online_unreachable() {
        let config = online_config(UNREACHABLE_URL.to_string());
        assert!(matches!(
            fetch_online(&config),
            Err(MicError::Transport { .. })
        ));
    }
}
