use crate::data::probe::FileProbe;
use crate::error::AppError;
use crate::table::Table;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct CachedTable {
    pub table: Table,
    pub modified: Option<SystemTime>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

/// Session-scoped table memo keyed by file path and modification time.
/// A changed file is re-read on the next load; `reset` drops everything.
#[derive(Debug)]
pub struct TableCache<P: FileProbe> {
    probe: P,
    entries: HashMap<PathBuf, CachedTable>,
    hits: usize,
    misses: usize,
}

impl<P: FileProbe> TableCache<P> {
    pub fn new(probe: P) -> Self {
        TableCache {
            probe,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    #[cfg(test)]
    pub fn probe(&self) -> &P {
        &self.probe
    }

    #[cfg(test)]
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn exists(&self, name: &str) -> bool {
        self.probe.exists(name)
    }

    pub fn load(&mut self, name: &str) -> Result<Table, AppError> {
        let path = self.probe.path_of(name);
        let modified = self.probe.modified(name);

        if let Some(entry) = self.entries.get(&path) {
            if entry.modified == modified {
                self.hits += 1;
                tracing::debug!(file = name, "table cache hit");
                return Ok(entry.table.clone());
            }
            tracing::debug!(file = name, "file changed on disk, reloading");
        }

        let table = self.probe.read_table(name)?;
        self.misses += 1;
        self.entries.insert(
            path,
            CachedTable {
                table: table.clone(),
                modified,
                loaded_at: Utc::now(),
            },
        );
        Ok(table)
    }

    pub fn reset(&mut self) {
        tracing::debug!(entries = self.entries.len(), "table cache reset");
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.entries.values().map(|e| e.loaded_at).max()
    }
}
