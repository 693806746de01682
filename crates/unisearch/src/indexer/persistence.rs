//! Cache snapshots on disk: postcard-encoded, zstd-compressed.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

use super::{FileRecord, FileRecordCache};

const SNAPSHOT_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;

#[derive(Serialize, Deserialize)]
struct CacheSnapshot {
    version: u32,
    records: Vec<FileRecord>,
}

/// Loads a snapshot into `cache`. Missing, unreadable, corrupt, or
/// version-mismatched snapshots leave the cache empty; the next scan
/// rebuilds it from scratch.
pub fn load_into(cache: &FileRecordCache, path: &Path) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("snapshot read failed path={} err={err}", path.display());
            }
            return;
        }
    };
    let decompressed = match zstd::decode_all(bytes.as_slice()) {
        Ok(data) => data,
        Err(err) => {
            warn!("snapshot decompress failed path={} err={err}", path.display());
            return;
        }
    };
    let snapshot: CacheSnapshot = match postcard::from_bytes(&decompressed) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("snapshot decode failed path={} err={err}", path.display());
            return;
        }
    };
    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            "snapshot version mismatch found={} expected={SNAPSHOT_VERSION}",
            snapshot.version
        );
        return;
    }
    let count = snapshot.records.len();
    cache.replace_all(snapshot.records);
    info!("snapshot loaded path={} records={count}", path.display());
}

/// Writes the cache to `path` via a temp file in the same directory, so a
/// crash mid-write never leaves a truncated snapshot behind.
pub fn save_from(cache: &FileRecordCache, path: &Path) -> Result<()> {
    let snapshot = CacheSnapshot {
        version: SNAPSHOT_VERSION,
        records: cache.all().iter().map(|r| (**r).clone()).collect(),
    };
    let encoded = postcard::to_stdvec(&snapshot)
        .map_err(|err| SearchError::Snapshot(format!("encode failed: {err}")))?;
    let compressed = zstd::encode_all(encoded.as_slice(), ZSTD_LEVEL)
        .map_err(|err| SearchError::Snapshot(format!("compress failed: {err}")))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &compressed)?;
    fs::rename(&tmp, path)?;
    info!(
        "snapshot saved path={} records={} bytes={}",
        path.display(),
        snapshot.records.len(),
        compressed.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FileFormat;
    use std::path::PathBuf;

    fn record(path: &str, text: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            format: FileFormat::Text,
            modified: 7,
            content_hash: [1; 32],
            extracted_text: Some(text.to_string()),
            extraction_failed: false,
        }
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("index.bin");

        let cache = FileRecordCache::new();
        cache.insert(record("/data/a.txt", "alpha"));
        cache.insert(record("/data/b.txt", "beta"));
        save_from(&cache, &snapshot_path).unwrap();

        let restored = FileRecordCache::new();
        load_into(&restored, &snapshot_path);
        assert_eq!(restored.len(), 2);
        let a = restored.get(Path::new("/data/a.txt")).unwrap();
        assert_eq!(a.extracted_text.as_deref(), Some("alpha"));
        assert_eq!(a.modified, 7);
    }

    #[test]
    fn corrupt_snapshot_leaves_cache_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("index.bin");
        fs::write(&snapshot_path, b"not a snapshot").unwrap();

        let cache = FileRecordCache::new();
        load_into(&cache, &snapshot_path);
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_snapshot_is_silent() {
        let cache = FileRecordCache::new();
        load_into(&cache, Path::new("/nonexistent/index.bin"));
        assert!(cache.is_empty());
    }
}
