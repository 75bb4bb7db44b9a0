//! Pages and their coordinate system.

use serde::{Deserialize, Serialize};

use crate::coordinates::{CoordinateConverter, CoordinateUnit, validate_dpi};
use crate::error::{Result, UnifexError};
use crate::merge::{MergeParams, merge_blocks};
use crate::search::{Matcher, Pattern, search_blocks};

use super::block::TextBlock;
use super::table::Table;

/// The unit a page's coordinates are expressed in.
///
/// `dpi` is only meaningful (and only present) for pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateInfo {
    pub unit: CoordinateUnit,
    #[serde(default)]
    pub dpi: Option<f64>,
}

impl CoordinateInfo {
    /// Validated constructor: pixel units need a DPI, every other unit forbids one.
    pub fn new(unit: CoordinateUnit, dpi: Option<f64>) -> Result<Self> {
        match (unit.is_pixel_based(), dpi) {
            (true, Some(dpi)) => Ok(Self::pixels(validate_dpi(dpi)?)),
            (true, None) => Err(UnifexError::MissingDpi { unit }),
            (false, Some(_)) => Err(UnifexError::InvalidCoordinateInfo(format!(
                "DPI is meaningless for {unit} coordinates"
            ))),
            (false, None) => Ok(Self { unit, dpi: None }),
        }
    }

    pub fn pixels(dpi: f64) -> Self {
        Self {
            unit: CoordinateUnit::Pixels,
            dpi: Some(dpi),
        }
    }

    pub fn points() -> Self {
        Self {
            unit: CoordinateUnit::Points,
            dpi: None,
        }
    }

    pub fn inches() -> Self {
        Self {
            unit: CoordinateUnit::Inches,
            dpi: None,
        }
    }

    pub fn normalized() -> Self {
        Self {
            unit: CoordinateUnit::Normalized,
            dpi: None,
        }
    }
}

/// A single page of a document.
///
/// `texts` keeps extraction order, which is not guaranteed to be reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (0-indexed).
    pub page: usize,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub texts: Vec<TextBlock>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub coordinate_info: Option<CoordinateInfo>,
}

impl Page {
    pub fn new(page: usize, width: f64, height: f64) -> Self {
        Self {
            page,
            width,
            height,
            texts: Vec::new(),
            tables: Vec::new(),
            coordinate_info: None,
        }
    }

    pub fn with_texts(mut self, texts: Vec<TextBlock>) -> Self {
        self.texts = texts;
        self
    }

    pub fn with_tables(mut self, tables: Vec<Table>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_coordinate_info(mut self, info: CoordinateInfo) -> Self {
        self.coordinate_info = Some(info);
        self
    }

    /// Returns the blocks whose text matches `pattern`, in page order.
    ///
    /// `case_sensitive` only applies to literal patterns; a compiled regex
    /// keeps its own flags.
    pub fn search(
        &self,
        pattern: impl Into<Pattern>,
        case_sensitive: bool,
    ) -> Result<Vec<TextBlock>> {
        let matcher = Matcher::new(&pattern.into(), case_sensitive)?;
        Ok(search_blocks(&self.texts, &matcher, None)
            .into_iter()
            .map(|hit| hit.block.into_owned())
            .collect())
    }

    /// Returns a derived page whose blocks are the merged line runs.
    ///
    /// Block order follows the merge order: lines top bucket first, then left to
    /// right. Tables and coordinate info are carried over.
    pub fn merged(&self, params: &MergeParams) -> Page {
        let texts = merge_blocks(&self.texts, params)
            .into_iter()
            .map(|merged| merged.block.into_owned())
            .collect();
        Page {
            page: self.page,
            width: self.width,
            height: self.height,
            texts,
            tables: self.tables.clone(),
            coordinate_info: self.coordinate_info,
        }
    }

    /// Converts the page into `target` units using its declared coordinate info.
    pub fn convert(&self, target: CoordinateUnit, target_dpi: Option<f64>) -> Result<Page> {
        CoordinateConverter::for_page(self)?.convert_page(self, target, target_dpi)
    }
}
