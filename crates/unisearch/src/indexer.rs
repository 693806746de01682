//! Background content indexing for file search.
//!
//! The indexer keeps an in-memory cache of per-file records keyed by
//! canonical path. A scan walks the scope roots, reuses cached records
//! whose modification time and content hash are unchanged, extracts text
//! for new or changed files, and evicts records whose files vanished. The
//! cache can be snapshotted to disk between sessions.

pub mod cache;
pub mod persistence;
pub mod scan;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::{canonicalize_existing_path, Result};
use crate::extract::{ExtractorRegistry, FileFormat};
use crate::query::FileSearchScope;

pub use cache::FileRecordCache;
pub use scan::ScanOutcome;

/// Everything the index knows about one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub format: FileFormat,
    /// Modification time, seconds since the Unix epoch.
    pub modified: u64,
    pub content_hash: [u8; 32],
    /// Extracted text, absent when no extractor covers the format or the
    /// file is indexed by filename only.
    pub extracted_text: Option<String>,
    /// Extraction was attempted and failed; the file stays searchable by
    /// filename and is not retried until it changes.
    pub extraction_failed: bool,
}

impl FileRecord {
    /// Lowercased filename without directory, used for filename matching.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Owns the record cache and extraction registry. Shared between the
/// coordinator's file pipeline and snapshot persistence.
pub struct FileContentIndexer {
    cache: FileRecordCache,
    extractors: ExtractorRegistry,
}

impl FileContentIndexer {
    pub fn new(extractors: ExtractorRegistry) -> Self {
        Self {
            cache: FileRecordCache::new(),
            extractors,
        }
    }

    pub fn cache(&self) -> &FileRecordCache {
        &self.cache
    }

    pub fn extractors(&self) -> &ExtractorRegistry {
        &self.extractors
    }

    /// Walks the scope and refreshes the cache. Returns `None` when the
    /// scan was cancelled before completing.
    pub fn refresh(
        &self,
        scope: &FileSearchScope,
        cancel: &CancellationToken,
    ) -> Option<ScanOutcome> {
        scan::refresh_scope(&self.cache, &self.extractors, scope, cancel)
    }

    /// Loads a previously saved snapshot into the cache. A missing or
    /// corrupt snapshot leaves the cache empty rather than failing.
    pub fn load_snapshot(&self, path: &std::path::Path) {
        persistence::load_into(&self.cache, path);
    }

    /// Writes the current cache to `path`.
    pub fn save_snapshot(&self, path: &std::path::Path) -> Result<()> {
        persistence::save_from(&self.cache, path)
    }

    /// Cached records under the scope's roots that pass its extension
    /// filter. The cache may hold records for other roots from earlier
    /// searches; those never leak into this scope's matching.
    pub fn records_in_scope(&self, scope: &FileSearchScope) -> Vec<Arc<FileRecord>> {
        let roots: Vec<PathBuf> = scope
            .roots
            .iter()
            .map(|root| canonicalize_existing_path(root.clone()))
            .collect();
        self.cache
            .all()
            .into_iter()
            .filter(|record| {
                roots.iter().any(|root| record.path.starts_with(root))
                    && scope.extension_matches(&record.path)
            })
            .collect()
    }
}
