//! File formats and pluggable text extraction.
//!
//! Extraction for office formats, PDFs, and OCR lives behind a trait so
//! the host application can plug in whatever backends it ships with. The
//! crate only provides the plain-text extractor; a format with no
//! registered extractor is indexed by filename alone.

use std::path::Path;

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Recognized file formats, coarse enough to route extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Image,
    Text,
    Other,
}

impl FileFormat {
    /// Classifies a path by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => return FileFormat::Other,
        };
        match ext.as_str() {
            "pdf" => FileFormat::Pdf,
            "doc" | "docx" => FileFormat::Word,
            "xls" | "xlsx" => FileFormat::Excel,
            "ppt" | "pptx" => FileFormat::PowerPoint,
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "gif" => FileFormat::Image,
            "txt" | "csv" | "md" | "log" | "json" | "xml" => FileFormat::Text,
            _ => FileFormat::Other,
        }
    }
}

/// Extracts searchable text from a file's raw bytes.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

impl<F> TextExtractor for F
where
    F: Fn(&[u8]) -> Result<String> + Send + Sync,
{
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        self(bytes)
    }
}

/// Decodes bytes as UTF-8, replacing invalid sequences.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Maps file formats to their extraction backends.
pub struct ExtractorRegistry {
    extractors: FnvHashMap<FileFormat, Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Registry with only the plain-text extractor installed.
    pub fn new() -> Self {
        let mut registry = Self {
            extractors: FnvHashMap::default(),
        };
        registry.register(FileFormat::Text, Box::new(PlainTextExtractor));
        registry
    }

    pub fn register(&mut self, format: FileFormat, extractor: Box<dyn TextExtractor>) {
        self.extractors.insert(format, extractor);
    }

    pub fn supports(&self, format: FileFormat) -> bool {
        self.extractors.contains_key(&format)
    }

    /// Runs the registered extractor for `format`. `Extraction` errors from
    /// a backend are passed through; an unregistered format is also an
    /// extraction error so callers treat both the same way.
    pub fn extract(&self, format: FileFormat, bytes: &[u8]) -> Result<String> {
        match self.extractors.get(&format) {
            Some(extractor) => extractor.extract(bytes),
            None => Err(SearchError::Extraction(format!(
                "no extractor registered for {format:?}"
            ))),
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
