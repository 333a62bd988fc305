//! Process-wide, at-most-once cache of loaded lookups.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::store::MicLookup;
use crate::types::{LoadMode, LoaderConfig, MicResult};

/// Holds at most one [`MicLookup`] per [`LoadMode`].
///
/// The first successful [`get`](Self::get) for a mode builds the lookup;
/// concurrent callers block until it is ready and then share it. A failed
/// load leaves the slot empty so a later call can retry.
///
/// ```
/// use mic_loader::{LoadMode, MicLookupCache};
/// use std::sync::Arc;
///
/// let cache = MicLookupCache::default();
/// let a = cache.get(LoadMode::Offline).unwrap();
/// let b = cache.get(LoadMode::Offline).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct MicLookupCache {
    config: LoaderConfig,
    online: OnceCell<Arc<MicLookup>>,
    offline: OnceCell<Arc<MicLookup>>,
    preferred: OnceCell<Arc<MicLookup>>,
}

impl MicLookupCache {
    /// Creates an empty cache that loads with `config`.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            online: OnceCell::new(),
            offline: OnceCell::new(),
            preferred: OnceCell::new(),
        }
    }

    /// Returns the configuration used for loads.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Returns the lookup for `mode`, loading it on first use.
    ///
    /// [`LoadMode::PreferOnline`] resolves through the online slot and, if
    /// that load fails, the offline slot. Whichever succeeds is shared.
    pub fn get(&self, mode: LoadMode) -> MicResult<Arc<MicLookup>> {
        let lookup = match mode {
            LoadMode::PreferOnline => self.preferred.get_or_try_init(|| {
                self.get(LoadMode::Online).or_else(|e| {
                    tracing::warn!("Online MIC load failed, using offline snapshot: {}", e);
                    self.get(LoadMode::Offline)
                })
            })?,
            mode => self.slot(mode).get_or_try_init(|| {
                tracing::debug!("Populating MIC cache for {:?}", mode);
                MicLookup::load(mode, &self.config).map(Arc::new)
            })?,
        };
        Ok(Arc::clone(lookup))
    }

    /// Returns the lookup for `mode` if it has already been loaded.
    pub fn cached(&self, mode: LoadMode) -> Option<Arc<MicLookup>> {
        self.slot(mode).get().cloned()
    }

    fn slot(&self, mode: LoadMode) -> &OnceCell<Arc<MicLookup>> {
        match mode {
            LoadMode::Online => &self.online,
            LoadMode::Offline => &self.offline,
            LoadMode::PreferOnline => &self.preferred,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::bundled_snapshot;
    use crate::test_support::{init_tracing, serve_once, UNREACHABLE_URL};
    use std::thread;

    fn unreachable_cache() -> MicLookupCache {
        MicLookupCache::new(LoaderConfig {
            url: UNREACHABLE_URL.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_offline_loaded_once() {
        init_tracing();
        let cache = MicLookupCache::default();
        assert!(cache.cached(LoadMode::Offline).is_none());

        let lookups: Vec<Arc<MicLookup>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.get(LoadMode::Offline).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for lookup in &lookups[1..] {
            assert!(Arc::ptr_eq(&lookups[0], lookup));
        }
        assert!(Arc::ptr_eq(
            &lookups[0],
            &cache.cached(LoadMode::Offline).unwrap()
        ));
        assert!(cache.cached(LoadMode::Online).is_none());
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        init_tracing();
        let cache = unreachable_cache();

        assert!(cache.get(LoadMode::Online).is_err());
        assert!(cache.cached(LoadMode::Online).is_none());
        assert!(cache.get(LoadMode::Online).is_err());
    }

    #[test]
    fn test_preferred_falls_back_and_caches() {
        init_tracing();
        let cache = unreachable_cache();

        let lookup = cache.get(LoadMode::PreferOnline).unwrap();
        assert!(!lookup.is_downloaded());
        assert!(Arc::ptr_eq(
            &lookup,
            &cache.get(LoadMode::PreferOnline).unwrap()
        ));
        assert!(Arc::ptr_eq(&lookup, &cache.cached(LoadMode::Offline).unwrap()));
        assert!(cache.cached(LoadMode::Online).is_none());
    }

    #[test]
    fn test_online_cached() {
        init_tracing();
        let cache = MicLookupCache::new(LoaderConfig {
            url: serve_once("200 OK", bundled_snapshot().to_vec()),
            ..Default::default()
        });

        let lookup = cache.get(LoadMode::Online).unwrap();
        assert!(lookup.is_downloaded());
        // The one-shot server is gone; a second load would fail.
        assert!(Arc::ptr_eq(&lookup, &cache.get(LoadMode::Online).unwrap()));
        assert!(Arc::ptr_eq(&lookup, &cache.get(LoadMode::PreferOnline).unwrap()));
        assert!(cache.config().url.starts_with("http://127.0.0.1:"));
    }
}
