//! Result types published to the caller.

use std::path::PathBuf;
use std::sync::Arc;

use crate::indexer::FileRecord;
use crate::layer::{FeatureId, FeatureRecord, LayerId};
use crate::query::snippet::Snippet;
use crate::query::Query;

/// What a result points at: a feature in a layer, or a file on disk.
#[derive(Debug, Clone)]
pub enum ResultRef {
    Feature(FeatureRecord),
    File(Arc<FileRecord>),
}

impl ResultRef {
    /// Dedup identity: layer + feature id, or canonical path.
    pub fn dedup_key(&self) -> DedupKey {
        match self {
            ResultRef::Feature(record) => DedupKey::Feature(record.layer.clone(), record.id),
            ResultRef::File(record) => DedupKey::File(record.path.clone()),
        }
    }

    /// Human-readable label used for name ordering.
    pub fn display_name(&self) -> String {
        match self {
            ResultRef::Feature(record) => record.display_name(),
            ResultRef::File(record) => record
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| record.path.display().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Feature(LayerId, FeatureId),
    File(PathBuf),
}

/// One entry in the published result set.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub reference: ResultRef,
    /// Context excerpt for file content matches, absent for features and
    /// filename-only matches.
    pub snippet: Option<Snippet>,
    pub score: i64,
}

/// Partial failures that did not abort the search.
#[derive(Debug, Clone, Default)]
pub struct SearchWarnings {
    /// Layers that could not be opened and were skipped.
    pub layers_skipped: Vec<LayerId>,
    /// Files whose content could not be indexed; matched by filename only.
    pub files_unindexed: usize,
}

impl SearchWarnings {
    pub fn is_empty(&self) -> bool {
        self.layers_skipped.is_empty() && self.files_unindexed == 0
    }
}

/// A published batch of results for one generation.
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub results: Vec<SearchResult>,
    pub query: Query,
    pub generation: u64,
    pub warnings: SearchWarnings,
}

/// Progressive updates emitted while a search runs.
#[derive(Debug, Clone)]
pub enum SearchUpdate {
    /// More results arrived; the set is cumulative, not a delta.
    Partial(ResultSet),
    /// Final, fully sorted set for this generation.
    Complete(ResultSet),
}

impl SearchUpdate {
    pub fn result_set(&self) -> &ResultSet {
        match self {
            SearchUpdate::Partial(set) | SearchUpdate::Complete(set) => set,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SearchUpdate::Complete(_))
    }
}
