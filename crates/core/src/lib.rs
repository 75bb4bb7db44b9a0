//! unifex - one geometric document model for text from PDF text layers, local
//! OCR engines and cloud document-AI services.
//!
//! The core is pure, synchronous computation over in-memory values:
//! - `coordinates` converts boxes between pixels, points, inches and
//!   normalized space
//! - `merge` rebuilds lines from word/character fragments
//! - `search` matches literals or regexes over pages, with provenance back to
//!   the original fragments
//!
//! `extract` defines the boundary extraction backends implement.

pub mod coordinates;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod merge;
pub mod model;
pub mod search;

pub use coordinates::{CoordinateConverter, CoordinateUnit};
pub use error::{Result, UnifexError};
pub use geometry::BBox;
pub use merge::MergeParams;
pub use model::{
    CoordinateInfo, Document, ExtractorMetadata, ExtractorType, FontInfo, Page, Table, TableCell,
    TextBlock,
};
pub use search::{PageSelection, Pattern, SearchOptions, SearchResult};
