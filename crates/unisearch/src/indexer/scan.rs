//! Scope walking and cache refresh.

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use fnv::FnvHashMap;
use ignore::WalkBuilder;
use log::{debug, warn};

use crate::cancel::CancellationToken;
use crate::error::canonicalize_existing_path;
use crate::extract::{ExtractorRegistry, FileFormat};
use crate::query::FileSearchScope;

use super::{FileRecord, FileRecordCache};

/// Counters from one refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Files that passed the extension filter.
    pub scanned: usize,
    /// Files whose text was (re)extracted this pass.
    pub extracted: usize,
    /// Files served from the cache unchanged.
    pub reused: usize,
    /// Files whose read or extraction failed.
    pub failed: usize,
    /// Cached records evicted because their file vanished.
    pub evicted: usize,
}

/// Walks every root in `scope`, refreshing the cache in place. Hidden
/// files and ignore rules are not honored; the scope is an explicit data
/// directory, not a source tree. Returns `None` if cancelled.
pub fn refresh_scope(
    cache: &FileRecordCache,
    extractors: &ExtractorRegistry,
    scope: &FileSearchScope,
    cancel: &CancellationToken,
) -> Option<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    let mut seen: FnvHashMap<std::path::PathBuf, ()> = FnvHashMap::default();

    // cache keys are canonical paths, so two roots spelling the same
    // directory differently reuse each other's records
    let roots: Vec<std::path::PathBuf> = scope
        .roots
        .iter()
        .map(|root| canonicalize_existing_path(root.clone()))
        .collect();
    for root in &roots {
        if !root.is_dir() {
            warn!("file search root missing root={}", root.display());
            continue;
        }
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .build();
        for entry in walker {
            cancel.is_cancelled()?;
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("walk error err={err}");
                    outcome.failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            if !scope.extension_matches(path) {
                continue;
            }
            outcome.scanned += 1;
            match refresh_file(cache, extractors, path, scope.use_ocr) {
                Ok(reused) => {
                    seen.insert(path.to_path_buf(), ());
                    if reused {
                        outcome.reused += 1;
                    } else {
                        outcome.extracted += 1;
                    }
                }
                Err(err) => {
                    warn!("index failed path={} err={err}", path.display());
                    outcome.failed += 1;
                }
            }
        }
    }

    cancel.is_cancelled()?;
    outcome.evicted = cache.retain_seen(&roots, &seen);
    debug!(
        "scan complete scanned={} extracted={} reused={} failed={} evicted={}",
        outcome.scanned, outcome.extracted, outcome.reused, outcome.failed, outcome.evicted
    );
    Some(outcome)
}

/// Refreshes one file. Returns `Ok(true)` when the cached record was still
/// valid and reused.
fn refresh_file(
    cache: &FileRecordCache,
    extractors: &ExtractorRegistry,
    path: &Path,
    use_ocr: bool,
) -> crate::error::Result<bool> {
    let metadata = fs::metadata(path)?;
    let modified = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let format = FileFormat::from_path(path);
    let wants_text = match format {
        FileFormat::Image => use_ocr,
        _ => true,
    } && extractors.supports(format);
    // a record is only reusable while the extraction policy that produced
    // it still applies; toggling OCR invalidates cached image records
    let policy_matches =
        |record: &FileRecord| (record.extracted_text.is_some() || record.extraction_failed) == wants_text;

    // mtime match is the cheap fast path; hash only when it moved.
    if let Some(cached) = cache.get(path) {
        if cached.modified == modified && policy_matches(&cached) {
            return Ok(true);
        }
    }

    let bytes = fs::read(path)?;
    let content_hash = *blake3::hash(&bytes).as_bytes();
    if let Some(cached) = cache.get(path) {
        if cached.content_hash == content_hash && policy_matches(&cached) {
            // touched but unchanged, refresh the mtime only
            let mut record = (*cached).clone();
            record.modified = modified;
            cache.insert(record);
            return Ok(true);
        }
    }

    let (extracted_text, extraction_failed) = if wants_text {
        match extractors.extract(format, &bytes) {
            Ok(text) => (Some(text), false),
            Err(err) => {
                warn!("extraction failed path={} err={err}", path.display());
                (None, true)
            }
        }
    } else {
        (None, false)
    };

    cache.insert(FileRecord {
        path: path.to_path_buf(),
        format,
        modified,
        content_hash,
        extracted_text,
        extraction_failed,
    });
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scope_for(dir: &Path) -> FileSearchScope {
        FileSearchScope {
            roots: vec![dir.to_path_buf()],
            extensions: vec!["txt".into()],
            use_ocr: false,
        }
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn scan_extracts_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_file(&root, "a.txt", "hello world");
        write_file(&root, "b.txt", "goodbye");
        write_file(&root, "skip.bin", "binary");

        let cache = FileRecordCache::new();
        let extractors = ExtractorRegistry::new();
        let scope = scope_for(&root);

        let first = refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop())
            .expect("not cancelled");
        assert_eq!(first.scanned, 2);
        assert_eq!(first.extracted, 2);
        assert_eq!(first.reused, 0);

        let second = refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop())
            .expect("not cancelled");
        assert_eq!(second.reused, 2);
        assert_eq!(second.extracted, 0);

        let record = cache.get(&root.join("a.txt")).unwrap();
        assert_eq!(record.extracted_text.as_deref(), Some("hello world"));
    }

    #[test]
    fn changed_files_are_re_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let path = write_file(&root, "a.txt", "first version");

        let cache = FileRecordCache::new();
        let extractors = ExtractorRegistry::new();
        let scope = scope_for(&root);
        refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();

        // overwrite; the cached mtime is backdated because a rewrite
        // within the same second would otherwise hit the mtime fast path
        write_file(&root, "a.txt", "second version");
        let mut stale = (*cache.get(&path).unwrap()).clone();
        stale.modified = 0;
        cache.insert(stale);

        let outcome =
            refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();
        assert_eq!(outcome.extracted, 1);
        let record = cache.get(&path).unwrap();
        assert_eq!(record.extracted_text.as_deref(), Some("second version"));
    }

    #[test]
    fn vanished_files_are_evicted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let path = write_file(&root, "gone.txt", "x");
        let cache = FileRecordCache::new();
        let extractors = ExtractorRegistry::new();
        let scope = scope_for(&root);

        refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();
        assert_eq!(cache.len(), 1);

        fs::remove_file(&path).unwrap();
        let outcome =
            refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();
        assert_eq!(outcome.evicted, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn images_skip_extraction_without_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_file(&root, "map.png", "not really a png");
        let cache = FileRecordCache::new();
        let extractors = ExtractorRegistry::new();
        let scope = FileSearchScope {
            roots: vec![root.clone()],
            extensions: vec!["png".into()],
            use_ocr: false,
        };

        refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();
        let record = cache.get(&root.join("map.png")).unwrap();
        assert_eq!(record.format, FileFormat::Image);
        assert!(record.extracted_text.is_none());
        assert!(!record.extraction_failed);
    }

    #[test]
    fn ocr_toggle_re_extracts_cached_images() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_file(&root, "scan.png", "image bytes");
        let path = root.join("scan.png");

        let cache = FileRecordCache::new();
        let mut extractors = ExtractorRegistry::new();
        extractors.register(
            FileFormat::Image,
            Box::new(|_bytes: &[u8]| Ok("recognized text".to_string())),
        );
        let mut scope = FileSearchScope {
            roots: vec![root.clone()],
            extensions: vec!["png".into()],
            use_ocr: false,
        };

        refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();
        assert!(cache.get(&path).unwrap().extracted_text.is_none());

        // opting in must invalidate the cached filename-only record
        scope.use_ocr = true;
        refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();
        assert_eq!(
            cache.get(&path).unwrap().extracted_text.as_deref(),
            Some("recognized text")
        );

        // and opting back out drops the recognized text again
        scope.use_ocr = false;
        refresh_scope(&cache, &extractors, &scope, &CancellationToken::noop()).unwrap();
        assert!(cache.get(&path).unwrap().extracted_text.is_none());
    }

    #[test]
    fn cancelled_scan_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.txt", "x");
        let cache = FileRecordCache::new();
        let extractors = ExtractorRegistry::new();
        let tracker = crate::cancel::GenerationTracker::new();
        let token = tracker.token_for(tracker.current());
        tracker.next_generation();

        let outcome = refresh_scope(&cache, &extractors, &scope_for(dir.path()), &token);
        assert!(outcome.is_none());
    }
}
