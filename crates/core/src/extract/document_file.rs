//! Backend that reads a previously serialized document.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::coordinates::CoordinateUnit;
use crate::error::{Result, UnifexError};
use crate::model::{Document, ExtractorMetadata, Page};

use super::{Extract, ExtractorConfig};

/// Serves the pages of a saved [`Document`], converted to the configured unit.
///
/// Page numbers are the stored `page` values, so a document that lost pages
/// at extraction time reports those pages as failures again.
///
/// A page stored in normalized units has no physical size left, so it can
/// only be served as normalized. Asking for any other unit fails when the
/// extractor is built, before any page is extracted.
#[derive(Debug, Clone)]
pub struct DocumentFileExtractor {
    path: PathBuf,
    document: Document,
    config: ExtractorConfig,
}

impl DocumentFileExtractor {
    pub fn open(path: impl AsRef<Path>, config: ExtractorConfig) -> Result<Self> {
        let document = Document::load(path.as_ref())?;
        Self::from_document(path, document, config)
    }

    pub fn from_document(
        path: impl AsRef<Path>,
        document: Document,
        config: ExtractorConfig,
    ) -> Result<Self> {
        check_convertible(&document, config.output_unit)?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            document,
            config,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn check_convertible(document: &Document, target: CoordinateUnit) -> Result<()> {
    if target == CoordinateUnit::Normalized {
        return Ok(());
    }
    let normalized = document.pages.iter().find(|p| {
        p.coordinate_info
            .is_some_and(|info| info.unit == CoordinateUnit::Normalized)
    });
    match normalized {
        Some(page) => {
            debug!(page = page.page, to = %target, "normalized page cannot be converted");
            Err(UnifexError::MissingPageSize)
        }
        None => Ok(()),
    }
}

impl Extract for DocumentFileExtractor {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.document
            .pages
            .iter()
            .map(|p| p.page + 1)
            .max()
            .unwrap_or(0)
    }

    fn extract_page(&self, page: usize) -> Result<Page> {
        let stored = self.document.page(page).ok_or(UnifexError::PageOutOfRange {
            page,
            count: self.page_count(),
        })?;

        match stored.coordinate_info {
            Some(info) if info.unit == self.config.output_unit => Ok(stored.clone()),
            Some(_) => stored.convert(self.config.output_unit, Some(self.config.dpi)),
            None => {
                debug!(page, "page has no coordinate info, returned unconverted");
                Ok(stored.clone())
            }
        }
    }

    fn metadata(&self) -> Option<ExtractorMetadata> {
        self.document.metadata.clone()
    }
}
