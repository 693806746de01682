//! In-memory file record cache, keyed by canonical path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fnv::FnvHashMap;
use parking_lot::RwLock;

use super::FileRecord;

/// Concurrent map from path to record. Records are immutable once
/// inserted; an updated file replaces the whole `Arc`, so readers holding
/// the old record keep a consistent view.
pub struct FileRecordCache {
    records: RwLock<FnvHashMap<PathBuf, Arc<FileRecord>>>,
}

impl FileRecordCache {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(FnvHashMap::default()),
        }
    }

    pub fn get(&self, path: &Path) -> Option<Arc<FileRecord>> {
        self.records.read().get(path).cloned()
    }

    pub fn insert(&self, record: FileRecord) -> Arc<FileRecord> {
        let record = Arc::new(record);
        self.records
            .write()
            .insert(record.path.clone(), Arc::clone(&record));
        record
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn all(&self) -> Vec<Arc<FileRecord>> {
        self.records.read().values().cloned().collect()
    }

    /// Drops every record whose path is not in `seen`, for paths under any
    /// of `roots`. Records outside the scanned roots are left alone so a
    /// narrower scan does not discard the rest of the index.
    pub fn retain_seen(&self, roots: &[PathBuf], seen: &FnvHashMap<PathBuf, ()>) -> usize {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|path, _| {
            let in_scope = roots.iter().any(|root| path.starts_with(root));
            !in_scope || seen.contains_key(path)
        });
        before - records.len()
    }

    /// Replaces the whole cache, used when loading a snapshot.
    pub fn replace_all(&self, records: Vec<FileRecord>) {
        let mut map = FnvHashMap::default();
        for record in records {
            map.insert(record.path.clone(), Arc::new(record));
        }
        *self.records.write() = map;
    }
}

impl Default for FileRecordCache {
    fn default() -> Self {
        Self::new()
    }
}
