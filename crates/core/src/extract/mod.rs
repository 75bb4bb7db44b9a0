//! Extraction boundary.
//!
//! Backends implement [`Extract`]; the set of backends is closed and
//! enumerated by [`Extractor`], which [`create_extractor`] builds from a
//! [`BackendKind`]. Every backend hands over pages already in the unit asked
//! for by [`ExtractorConfig`], with their coordinate info declared.
//!
//! Pages are extracted in parallel on a dedicated rayon pool. A page that
//! fails is logged and left out of the document; it never aborts the others.

pub mod document_file;
pub mod paddle;

use std::path::{Path, PathBuf};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::coordinates::CoordinateUnit;
use crate::error::{Result, UnifexError};
use crate::model::{Document, ExtractorMetadata, Page};

pub use document_file::DocumentFileExtractor;
pub use paddle::{PaddleDetection, PaddleDumpExtractor, PaddleOcrAdapter};

/// DPI used when rasterized input does not record one.
pub const DEFAULT_DPI: f64 = 200.0;

pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Backend configuration shared by every extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    /// Unit the produced pages are expressed in.
    pub output_unit: CoordinateUnit,

    /// DPI for pixel input that does not carry its own, and for pixel output.
    pub dpi: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            output_unit: CoordinateUnit::Points,
            dpi: DEFAULT_DPI,
        }
    }
}

impl ExtractorConfig {
    pub fn output_unit(mut self, unit: CoordinateUnit) -> Self {
        self.output_unit = unit;
        self
    }

    pub fn dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Options for a whole-document extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Zero-indexed page numbers to extract. None means all pages.
    pub pages: Option<Vec<usize>>,

    /// Worker threads. None uses the available parallelism.
    pub threads: Option<usize>,
}

/// What happened to one requested page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Extracted(Page),
    Failed { page: usize, error: String },
}

impl PageOutcome {
    pub fn page_number(&self) -> usize {
        match self {
            Self::Extracted(page) => page.page,
            Self::Failed { page, .. } => *page,
        }
    }

    pub fn into_page(self) -> Option<Page> {
        match self {
            Self::Extracted(page) => Some(page),
            Self::Failed { .. } => None,
        }
    }
}

/// The capability every extraction backend provides.
pub trait Extract: Sync {
    /// Source the pages come from.
    fn path(&self) -> &Path;

    fn page_count(&self) -> usize;

    /// Extracts a single page by number (0-indexed).
    fn extract_page(&self, page: usize) -> Result<Page>;

    fn metadata(&self) -> Option<ExtractorMetadata>;

    /// Extracts the selected pages in parallel, one outcome per request, in
    /// request order.
    fn extract_outcomes(&self, options: &ExtractOptions) -> Result<Vec<PageOutcome>> {
        let requested: Vec<usize> = match &options.pages {
            Some(pages) => pages.clone(),
            None => (0..self.page_count()).collect(),
        };

        let thread_count = options.threads.unwrap_or_else(default_thread_count).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .map_err(|e| UnifexError::ThreadPool(e.to_string()))?;

        let mut outcomes: Vec<(usize, PageOutcome)> = pool.install(|| {
            requested
                .into_par_iter()
                .enumerate()
                .map(|(order, page)| {
                    let outcome = match self.extract_page(page) {
                        Ok(extracted) => PageOutcome::Extracted(extracted),
                        Err(e) => PageOutcome::Failed {
                            page,
                            error: e.to_string(),
                        },
                    };
                    (order, outcome)
                })
                .collect()
        });

        outcomes.sort_by_key(|(order, _)| *order);
        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }

    /// Extracts a document, dropping pages that failed.
    fn extract(&self, options: &ExtractOptions) -> Result<Document> {
        let outcomes = self.extract_outcomes(options)?;
        let requested = outcomes.len();

        let pages: Vec<Page> = outcomes
            .into_iter()
            .filter_map(|outcome| {
                if let PageOutcome::Failed { page, error } = &outcome {
                    warn!(page, %error, "page extraction failed");
                }
                outcome.into_page()
            })
            .collect();

        debug!(
            path = %self.path().display(),
            requested,
            extracted = pages.len(),
            "extracted document"
        );

        let document = Document::new(self.path(), pages);
        Ok(match self.metadata() {
            Some(metadata) => document.with_metadata(metadata),
            None => document,
        })
    }
}

/// Available backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// A previously serialized unifex document.
    DocumentFile,
    /// Saved PaddleOCR output.
    PaddleDump,
}

/// One variant per backend.
#[derive(Debug, Clone)]
pub enum Extractor {
    DocumentFile(DocumentFileExtractor),
    PaddleDump(PaddleDumpExtractor),
}

/// Builds the extractor for `kind`.
pub fn create_extractor(
    path: impl AsRef<Path>,
    kind: BackendKind,
    config: &ExtractorConfig,
) -> Result<Extractor> {
    let path: PathBuf = path.as_ref().to_path_buf();
    Ok(match kind {
        BackendKind::DocumentFile => {
            Extractor::DocumentFile(DocumentFileExtractor::open(path, *config)?)
        }
        BackendKind::PaddleDump => Extractor::PaddleDump(PaddleDumpExtractor::open(path, *config)?),
    })
}

impl Extract for Extractor {
    fn path(&self) -> &Path {
        match self {
            Self::DocumentFile(e) => e.path(),
            Self::PaddleDump(e) => e.path(),
        }
    }

    fn page_count(&self) -> usize {
        match self {
            Self::DocumentFile(e) => e.page_count(),
            Self::PaddleDump(e) => e.page_count(),
        }
    }

    fn extract_page(&self, page: usize) -> Result<Page> {
        match self {
            Self::DocumentFile(e) => e.extract_page(page),
            Self::PaddleDump(e) => e.extract_page(page),
        }
    }

    fn metadata(&self) -> Option<ExtractorMetadata> {
        match self {
            Self::DocumentFile(e) => e.metadata(),
            Self::PaddleDump(e) => e.metadata(),
        }
    }
}
