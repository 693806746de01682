//! The search coordinator.
//!
//! Each submitted query gets a fresh generation. Submitting again bumps
//! the generation, which every in-flight worker observes through its
//! cancellation token, so stale work winds down on its own and stale
//! results are never published. Per-layer scans and the file pipeline run
//! on their own threads and feed one merger thread, which deduplicates,
//! publishes cumulative partial sets, and sorts the final set.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};

use crate::cancel::{CancellationToken, GenerationTracker};
use crate::error::Result;
use crate::feature_match::{search_layer, FeatureMatch};
use crate::file_search::{search_files, FileMatch};
use crate::indexer::FileContentIndexer;
use crate::layer::{LayerId, LayerSource};
use crate::query::{Query, SortKey};
use crate::types::{ResultRef, ResultSet, SearchResult, SearchUpdate, SearchWarnings};

/// Partial sets are published once this many new results accumulate.
const PARTIAL_BATCH: usize = 25;

enum WorkerMsg {
    Feature(FeatureMatch),
    LayerDone,
    LayerFailed(LayerId),
    Files {
        matches: Vec<FileMatch>,
        unindexed: usize,
    },
    FilesDone,
}

/// Handle to one running search.
pub struct SearchHandle {
    generation: u64,
    rx: Receiver<SearchUpdate>,
}

impl SearchHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Receives the next update. `None` once the search has finished or
    /// been superseded.
    pub fn next_update(&self) -> Option<SearchUpdate> {
        self.rx.recv().ok()
    }

    /// Blocks until the search completes. `None` means it was cancelled or
    /// superseded before completing.
    pub fn wait(self) -> Option<ResultSet> {
        let mut last = None;
        while let Ok(update) = self.rx.recv() {
            if let SearchUpdate::Complete(set) = update {
                last = Some(set);
            }
        }
        last
    }
}

/// Entry point for the host application. One coordinator serves the whole
/// session; at most one generation is live at a time.
pub struct SearchCoordinator<S: LayerSource + 'static> {
    source: Arc<S>,
    indexer: Arc<FileContentIndexer>,
    tracker: GenerationTracker,
}

impl<S: LayerSource + 'static> SearchCoordinator<S> {
    pub fn new(source: Arc<S>, indexer: Arc<FileContentIndexer>) -> Self {
        Self {
            source,
            indexer,
            tracker: GenerationTracker::new(),
        }
    }

    pub fn indexer(&self) -> &Arc<FileContentIndexer> {
        &self.indexer
    }

    /// Validates and starts a search, superseding any search still
    /// running. Returns immediately; results arrive on the handle.
    pub fn submit(&self, query: Query) -> Result<SearchHandle> {
        query.validate()?;
        let generation = self.tracker.next_generation();
        let token = self.tracker.token_for(generation);
        info!(
            "search start generation={generation} layers={} file_search={}",
            query.scope_layers.len(),
            query.file_search.is_some()
        );

        let (worker_tx, worker_rx) = mpsc::channel::<WorkerMsg>();
        let (update_tx, update_rx) = mpsc::channel::<SearchUpdate>();

        let mut pending = 0usize;
        for layer in &query.scope_layers {
            pending += 1;
            spawn_layer_worker(
                Arc::clone(&self.source),
                layer.clone(),
                query.clone(),
                token.clone(),
                worker_tx.clone(),
            );
        }
        if let Some(scope) = query.file_search.clone() {
            pending += 1;
            spawn_file_worker(
                Arc::clone(&self.indexer),
                scope,
                query.clone(),
                token.clone(),
                worker_tx.clone(),
            );
        }
        drop(worker_tx);

        spawn_merger(query, generation, token, pending, worker_rx, update_tx);
        Ok(SearchHandle {
            generation,
            rx: update_rx,
        })
    }

    /// Cancels `generation` if it is still the live one. A stale handle's
    /// cancel is a no-op.
    pub fn cancel(&self, generation: u64) {
        if self.tracker.current() == generation {
            info!("search cancel generation={generation}");
            self.tracker.next_generation();
        }
    }
}

fn spawn_layer_worker<S: LayerSource + 'static>(
    source: Arc<S>,
    layer: LayerId,
    query: Query,
    token: CancellationToken,
    tx: Sender<WorkerMsg>,
) {
    thread::spawn(move || {
        let outcome = search_layer(&*source, &layer, &query, &token, |found| {
            let _ = tx.send(WorkerMsg::Feature(found));
        });
        let msg = match outcome {
            Ok(Some(matched)) => {
                debug!("layer done layer={layer} matched={matched}");
                WorkerMsg::LayerDone
            }
            Ok(None) => WorkerMsg::LayerDone,
            Err(_) => WorkerMsg::LayerFailed(layer),
        };
        let _ = tx.send(msg);
    });
}

fn spawn_file_worker(
    indexer: Arc<FileContentIndexer>,
    scope: crate::query::FileSearchScope,
    query: Query,
    token: CancellationToken,
    tx: Sender<WorkerMsg>,
) {
    thread::spawn(move || {
        let refreshed = indexer.refresh(&scope, &token);
        if let Some(outcome) = refreshed {
            let records = indexer.records_in_scope(&scope);
            if let Some(matches) = search_files(&records, &query, &token) {
                let _ = tx.send(WorkerMsg::Files {
                    matches,
                    unindexed: outcome.failed,
                });
            }
        }
        let _ = tx.send(WorkerMsg::FilesDone);
    });
}

fn spawn_merger(
    query: Query,
    generation: u64,
    token: CancellationToken,
    mut pending: usize,
    rx: Receiver<WorkerMsg>,
    tx: Sender<SearchUpdate>,
) {
    thread::spawn(move || {
        let mut features: Vec<SearchResult> = Vec::new();
        let mut files: Vec<SearchResult> = Vec::new();
        let mut seen = HashSet::new();
        let mut warnings = SearchWarnings::default();
        let mut unpublished = 0usize;

        while pending > 0 {
            let msg = match rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            };
            match msg {
                WorkerMsg::Feature(found) => {
                    let result = SearchResult {
                        reference: ResultRef::Feature(found.record),
                        snippet: None,
                        score: found.score,
                    };
                    if seen.insert(result.reference.dedup_key()) {
                        features.push(result);
                        unpublished += 1;
                    }
                }
                WorkerMsg::Files { matches, unindexed } => {
                    warnings.files_unindexed += unindexed;
                    for found in matches {
                        let result = SearchResult {
                            reference: ResultRef::File(found.record),
                            snippet: found.snippet,
                            score: found.score,
                        };
                        if seen.insert(result.reference.dedup_key()) {
                            files.push(result);
                            unpublished += 1;
                        }
                    }
                }
                WorkerMsg::LayerDone | WorkerMsg::FilesDone => {
                    pending -= 1;
                }
                WorkerMsg::LayerFailed(layer) => {
                    warnings.layers_skipped.push(layer);
                    pending -= 1;
                }
            }
            if unpublished >= PARTIAL_BATCH && token.is_cancelled().is_some() {
                unpublished = 0;
                let set = assemble(&query, generation, &features, &files, &warnings);
                let _ = tx.send(SearchUpdate::Partial(set));
            }
        }

        // a superseded generation publishes nothing final
        if token.is_cancelled().is_none() {
            debug!("search superseded generation={generation}");
            return;
        }
        if !warnings.is_empty() {
            warn!(
                "search finished with warnings generation={generation} skipped={} unindexed={}",
                warnings.layers_skipped.len(),
                warnings.files_unindexed
            );
        }
        let set = assemble(&query, generation, &features, &files, &warnings);
        info!(
            "search complete generation={generation} results={}",
            set.results.len()
        );
        let _ = tx.send(SearchUpdate::Complete(set));
    });
}

fn assemble(
    query: &Query,
    generation: u64,
    features: &[SearchResult],
    files: &[SearchResult],
    warnings: &SearchWarnings,
) -> ResultSet {
    let mut features = features.to_vec();
    let mut files = files.to_vec();
    let layer_rank = |layer: &LayerId| {
        query
            .scope_layers
            .iter()
            .position(|scoped| scoped == layer)
            .unwrap_or(usize::MAX)
    };
    let feature_key = |result: &SearchResult| match &result.reference {
        ResultRef::Feature(record) => (layer_rank(&record.layer), record.id),
        ResultRef::File(_) => (usize::MAX, 0),
    };

    let results = match query.sort {
        SortKey::ByRelevance => {
            features.sort_by(|a, b| {
                let (la, ia) = feature_key(a);
                let (lb, ib) = feature_key(b);
                la.cmp(&lb)
                    .then_with(|| b.score.cmp(&a.score))
                    .then_with(|| ia.cmp(&ib))
            });
            // file matches arrive pre-ranked
            features.extend(files);
            features
        }
        SortKey::ByName => {
            let mut all = features;
            all.extend(files);
            all.sort_by(|a, b| {
                a.reference
                    .display_name()
                    .to_lowercase()
                    .cmp(&b.reference.display_name().to_lowercase())
            });
            all
        }
        SortKey::ByLayerThenName => {
            features.sort_by(|a, b| {
                let (la, _) = feature_key(a);
                let (lb, _) = feature_key(b);
                la.cmp(&lb).then_with(|| {
                    a.reference
                        .display_name()
                        .to_lowercase()
                        .cmp(&b.reference.display_name().to_lowercase())
                })
            });
            files.sort_by(|a, b| {
                a.reference
                    .display_name()
                    .to_lowercase()
                    .cmp(&b.reference.display_name().to_lowercase())
            });
            features.extend(files);
            features
        }
    };

    ResultSet {
        results,
        query: query.clone(),
        generation,
        warnings: warnings.clone(),
    }
}
