//! Query model: free word, attribute conditions, one flat combinator, and
//! an optional file-search scope.

pub mod condition;
pub mod evaluate;
pub mod snippet;
pub mod text_match;

use std::path::PathBuf;

use crate::error::{Result, SearchError};
use crate::layer::LayerId;

pub use condition::{AttributeCondition, ConditionOp};

/// How the attribute conditions (and the free word, for filename tokens)
/// combine. One flat combinator per query; nested grouping is not part of
/// the query model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// Requested ordering of the published result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Feature matches grouped by layer then relevance, followed by file
    /// matches in rank order.
    #[default]
    ByRelevance,
    ByName,
    ByLayerThenName,
}

/// File-search scope: root directories, extension filter, OCR opt-in.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSearchScope {
    pub roots: Vec<PathBuf>,
    /// Lowercased extensions without the leading dot. Empty means all.
    pub extensions: Vec<String>,
    /// When false, image files are never content-extracted; they stay
    /// searchable by filename only.
    pub use_ocr: bool,
}

/// Extension list the original toolbar ships with.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "tif", "tiff", "xlsx", "xls", "docx", "doc", "pptx", "ppt",
];

impl FileSearchScope {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            use_ocr: false,
        }
    }

    /// Parses a comma-separated extension list: trimmed, lowercased,
    /// leading dots stripped, deduplicated, order preserved.
    pub fn parse_extensions(raw: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for part in raw.split(',') {
            let ext = part.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !out.contains(&ext) {
                out.push(ext);
            }
        }
        out
    }

    /// True when `path`'s extension passes the filter.
    pub fn extension_matches(&self, path: &std::path::Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

/// One submitted search. Lives for the duration of a single generation.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub free_word: Option<String>,
    pub conditions: Vec<AttributeCondition>,
    pub combinator: Combinator,
    pub scope_layers: Vec<LayerId>,
    pub file_search: Option<FileSearchScope>,
    pub sort: SortKey,
}

impl Query {
    /// Rejects queries with no criteria at all, before any background work
    /// is started.
    pub fn validate(&self) -> Result<()> {
        let has_free_word = self
            .free_word
            .as_deref()
            .is_some_and(|word| !word.trim().is_empty());
        if !has_free_word && self.conditions.is_empty() && self.file_search.is_none() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(())
    }

    /// The trimmed free word, if any.
    pub fn free_word(&self) -> Option<&str> {
        self.free_word
            .as_deref()
            .map(str::trim)
            .filter(|word| !word.is_empty())
    }

    /// Tokens matched against filenames during file search: the free word
    /// plus the text operands of the attribute conditions, combined with
    /// the query combinator.
    pub fn filename_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        if let Some(word) = self.free_word() {
            tokens.push(word.to_string());
        }
        for condition in &self.conditions {
            if let Some(text) = condition.op.operand_text() {
                let text = text.trim();
                if !text.is_empty() && !tokens.iter().any(|t| t == text) {
                    tokens.push(text.to_string());
                }
            }
        }
        tokens
    }
}
