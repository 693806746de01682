//! Unified search over map layers and document folders.
//!
//! This crate provides the search core behind the toolbar:
//! - Typed attribute values with coercing comparison
//! - Free-word and condition queries over layer features
//! - A file content index with snapshot persistence
//! - Generation-based cancellation and progressive result delivery
//! - Locating a selected feature on the map canvas

pub mod cancel;
pub mod error;
pub mod extract;
pub mod feature_match;
pub mod file_search;
pub mod indexer;
pub mod layer;
pub mod locate;
pub mod query;
pub mod search;
pub mod types;
pub mod value;

// Re-export main types
pub use cancel::{CancellationToken, GenerationTracker};
pub use error::{Result, SearchError};
pub use extract::{ExtractorRegistry, FileFormat, TextExtractor};
pub use indexer::{FileContentIndexer, FileRecord};
pub use layer::{AttributeMap, FeatureId, FeatureRecord, LayerId, LayerSource, Rect};
pub use locate::MapCanvas;
pub use query::{
    AttributeCondition, Combinator, ConditionOp, FileSearchScope, Query, SortKey,
};
pub use search::{SearchCoordinator, SearchHandle};
pub use types::{ResultRef, ResultSet, SearchResult, SearchUpdate, SearchWarnings};
pub use value::AttributeValue;
