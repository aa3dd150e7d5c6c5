//! Process-wide memoization of the load pipeline.
//!
//! Lifecycle: empty until the first successful [`DatasetCache::load`];
//! afterwards each call re-resolves the source file and compares its
//! signature (path, size, mtime) against the cached one. A match returns the
//! cached dataset, a mismatch rebuilds. [`DatasetCache::invalidate`] empties
//! the cache. There is no TTL.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use log::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::data::loader::{build_dataset, locate_source};
use crate::data::model::{NormalizedDataset, ReferenceDate};
use crate::data::summary::{summarize, DataSummary};
use crate::error::{PipelineError, Result};

/// What a cached entry was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSignature {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceSignature {
    pub fn read(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(SourceSignature {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Loads performed versus calls served from the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub loads: usize,
    pub hits: usize,
}

struct CacheEntry {
    signature: SourceSignature,
    dataset: Arc<NormalizedDataset>,
    summary: Option<DataSummary>,
}

/// Memoizing front for the pipeline.
///
/// The slot lock is held while a dataset is built, so concurrent callers
/// wait for the in-flight build instead of repeating it and never see a
/// partially built dataset.
pub struct DatasetCache {
    config: PipelineConfig,
    slot: Mutex<Option<CacheEntry>>,
    loads: AtomicUsize,
    hits: AtomicUsize,
}

impl DatasetCache {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(None),
            loads: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // The entry is replaced wholesale, never mutated in place, so a poisoned
    // lock still guards a consistent value.
    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the source file and return its normalized dataset, building it
    /// only if the cache is empty or the file changed.
    pub fn load(&self) -> Result<Arc<NormalizedDataset>> {
        let path = locate_source(&self.config)?;
        let signature = SourceSignature::read(&path)?;

        let mut slot = self.lock();
        Ok(self.entry_for(&mut slot, signature)?.dataset.clone())
    }

    fn entry_for<'a>(
        &self,
        slot: &'a mut Option<CacheEntry>,
        signature: SourceSignature,
    ) -> Result<&'a mut CacheEntry> {
        // A stale entry is dropped here even if the rebuild below fails.
        let entry = match slot.take() {
            Some(entry) if entry.signature == signature => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("cache hit for {}", signature.path.display());
                entry
            }
            _ => {
                let dataset = build_dataset(&signature.path, &self.config.encodings)?;
                self.loads.fetch_add(1, Ordering::Relaxed);
                CacheEntry {
                    signature,
                    dataset: Arc::new(dataset),
                    summary: None,
                }
            }
        };
        Ok(slot.insert(entry))
    }

    /// Reference date of the current source, `None` when the file name
    /// carries none or the load fails.
    pub fn reference_date(&self) -> Option<ReferenceDate> {
        match self.load() {
            Ok(dataset) => dataset.reference_date,
            Err(e) => {
                warn!("reference date unavailable: {e}");
                None
            }
        }
    }

    /// Summary of the current dataset, computed once per cached load.
    pub fn data_summary(&self) -> Result<DataSummary> {
        let path = locate_source(&self.config)?;
        let signature = SourceSignature::read(&path)?;

        let mut slot = self.lock();
        let CacheEntry { dataset, summary, .. } = self.entry_for(&mut slot, signature)?;
        Ok(summary.get_or_insert_with(|| summarize(dataset)).clone())
    }

    /// Drop the cached dataset; the next call rebuilds.
    pub fn invalidate(&self) {
        if self.lock().take().is_some() {
            info!("dataset cache invalidated");
        }
    }

    pub fn is_populated(&self) -> bool {
        self.lock().is_some()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            loads: self.loads.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}
