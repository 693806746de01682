use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no search criteria: query has no free word, no conditions and no file scope")]
    EmptyQuery,

    #[error("layer unavailable: {0}")]
    LayerUnavailable(String),

    #[error("feature {feature} no longer resolves in layer {layer}")]
    FeatureUnavailable { layer: String, feature: i64 },

    #[error("result is not a feature result")]
    NotAFeatureResult,

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("cache snapshot error: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Canonicalizes a path, returning the original if canonicalization fails.
pub fn canonicalize_existing_path(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}
