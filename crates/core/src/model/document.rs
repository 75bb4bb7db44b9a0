//! The root document entity and extractor metadata.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coordinates::{CoordinateConverter, CoordinateUnit};
use crate::error::Result;
use crate::search::{Matcher, Pattern, SearchOptions, SearchResult, search_source};

use super::page::Page;

/// Which backend produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractorType {
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "easyocr")]
    EasyOcr,
    #[serde(rename = "tesseract")]
    Tesseract,
    #[serde(rename = "paddle")]
    Paddle,
    #[serde(rename = "azure-di")]
    AzureDi,
    #[serde(rename = "google-docai")]
    GoogleDocAi,
}

impl ExtractorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::EasyOcr => "easyocr",
            Self::Tesseract => "tesseract",
            Self::Paddle => "paddle",
            Self::AzureDi => "azure-di",
            Self::GoogleDocAi => "google-docai",
        }
    }
}

impl fmt::Display for ExtractorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-level metadata attached once by the extractor.
///
/// `extra` holds engine-specific detail (OCR engine name, DPI used, processor
/// ids) and keeps insertion order through serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorMetadata {
    pub extractor_type: ExtractorType,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub modification_date: Option<String>,
    #[serde(default)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ExtractorMetadata {
    pub fn new(extractor_type: ExtractorType) -> Self {
        Self {
            extractor_type,
            creator: None,
            producer: None,
            title: None,
            author: None,
            creation_date: None,
            modification_date: None,
            extra: IndexMap::new(),
        }
    }

    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A document: a source path, its pages and optional extractor metadata.
///
/// Pages that failed extraction are simply absent, so `pages[i].page` need
/// not equal `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub path: PathBuf,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub metadata: Option<ExtractorMetadata>,
}

impl Document {
    pub fn new(path: impl AsRef<Path>, pages: Vec<Page>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pages,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ExtractorMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Looks up a page by its page number (not its position).
    pub fn page(&self, number: usize) -> Option<&Page> {
        self.pages.iter().find(|p| p.page == number)
    }

    /// Searches the selected pages, optionally merging fragments first.
    ///
    /// # Example
    /// ```ignore
    /// let hits = doc.search("First page", &SearchOptions::default().merge_gap(15.0))?;
    /// assert_eq!(hits[0].original_blocks.len(), 2);
    /// ```
    pub fn search(
        &self,
        pattern: impl Into<Pattern>,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let matcher = Matcher::new(&pattern.into(), options.case_sensitive)?;
        Ok(search_source(self, &matcher, options))
    }

    /// Converts every page into `target` units, returning a new document.
    ///
    /// Each page is converted from its own declared coordinate info; pages are
    /// processed in parallel and keep their order.
    pub fn convert(&self, target: CoordinateUnit, target_dpi: Option<f64>) -> Result<Document> {
        let pages = self
            .pages
            .par_iter()
            .map(|page| {
                CoordinateConverter::for_page(page)?.convert_page(page, target, target_dpi)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Document {
            path: self.path.clone(),
            pages,
            metadata: self.metadata.clone(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a serialized document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}
