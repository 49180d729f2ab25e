use super::{ReferenceTable, TableError};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CachedTable {
    table: Arc<ReferenceTable>,
    fetched: Instant,
    loaded_at: DateTime<Utc>,
}

/// Holds one loaded reference table until it expires.
///
/// `ttl = None` keeps the table until [`TableCache::invalidate`] is called.
/// A failed reload leaves the previous table in place and returns the error.
pub struct TableCache {
    ttl: Option<Duration>,
    entry: Option<CachedTable>,
}

impl TableCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { ttl, entry: None }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        match (&self.entry, self.ttl) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(e), Some(ttl)) => now.saturating_duration_since(e.fetched) < ttl,
        }
    }

    /// Wall-clock time of the last successful load.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|e| e.loaded_at)
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            tracing::debug!("reference table cache invalidated");
        }
    }

    /// Return the cached table if still fresh at `now`, otherwise call `load`
    /// and cache its result.
    pub fn get_or_load_at<F>(&mut self, now: Instant, load: F) -> Result<Arc<ReferenceTable>, TableError>
    where
        F: FnOnce() -> Result<ReferenceTable, TableError>,
    {
        if self.is_fresh(now) {
            if let Some(e) = &self.entry {
                return Ok(Arc::clone(&e.table));
            }
        }

        let stale = self.entry.is_some();
        let table = Arc::new(load()?);
        tracing::info!(rows = table.len(), refreshed = stale, "reference table cached");
        self.entry = Some(CachedTable {
            table: Arc::clone(&table),
            fetched: now,
            loaded_at: Utc::now(),
        });
        Ok(table)
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<ReferenceTable>, TableError> {
        self.get_or_load_at(Instant::now(), || ReferenceTable::load(path))
    }
}
