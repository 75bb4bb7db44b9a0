//! Coordinate unit conversion.
//!
//! Every conversion pivots through PDF points (1/72 inch):
//! - inches = points / 72
//! - pixels = points * dpi / 72
//! - normalized = points / page dimension on the matching axis
//!
//! Normalized values are never clamped: OCR boxes may legitimately poke past
//! the page edge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UnifexError};
use crate::geometry::BBox;
use crate::model::{CoordinateInfo, Page, Table, TableCell, TextBlock};

/// PDF points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Units a page's coordinates can be expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateUnit {
    /// Image pixels at a given DPI.
    Pixels,
    /// 1/72 inch, PDF native.
    #[default]
    Points,
    Inches,
    /// 0-1 relative to the page dimensions.
    Normalized,
}

impl CoordinateUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pixels => "pixels",
            Self::Points => "points",
            Self::Inches => "inches",
            Self::Normalized => "normalized",
        }
    }

    /// Whether values in this unit depend on a DPI.
    pub fn is_pixel_based(self) -> bool {
        matches!(self, Self::Pixels)
    }
}

impl fmt::Display for CoordinateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateUnit {
    type Err = UnifexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pixels" => Ok(Self::Pixels),
            "points" => Ok(Self::Points),
            "inches" => Ok(Self::Inches),
            "normalized" => Ok(Self::Normalized),
            other => Err(UnifexError::InvalidCoordinateInfo(format!(
                "unknown coordinate unit: {other}"
            ))),
        }
    }
}

pub(crate) fn validate_dpi(dpi: f64) -> Result<f64> {
    if dpi.is_finite() && dpi > 0.0 {
        Ok(dpi)
    } else {
        Err(UnifexError::InvalidDpi(dpi))
    }
}

/// Converts coordinates from one unit to another for a single page.
///
/// The page dimensions are given in the source unit. A normalized page has
/// no physical size of its own, so for a `Normalized` source the dimensions
/// are the physical page size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateConverter {
    source_unit: CoordinateUnit,
    page_width: f64,
    page_height: f64,
    dpi: Option<f64>,
}

impl CoordinateConverter {
    pub fn new(source_unit: CoordinateUnit, page_width: f64, page_height: f64) -> Self {
        Self {
            source_unit,
            page_width,
            page_height,
            dpi: None,
        }
    }

    /// Sets the DPI used for pixel coordinates, on either side of a conversion.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Builds a converter from a page's declared coordinate system.
    pub fn for_page(page: &Page) -> Result<Self> {
        let info = page
            .coordinate_info
            .as_ref()
            .ok_or(UnifexError::MissingCoordinateInfo { page: page.page })?;
        if info.unit == CoordinateUnit::Normalized {
            // width/height are 1.0 here; the physical size is gone.
            return Err(UnifexError::MissingPageSize);
        }
        let converter = Self::new(info.unit, page.width, page.height);
        Ok(match info.dpi {
            Some(dpi) => converter.with_dpi(dpi),
            None => converter,
        })
    }

    pub fn source_unit(&self) -> CoordinateUnit {
        self.source_unit
    }

    pub fn dpi(&self) -> Option<f64> {
        self.dpi
    }

    /// Page dimensions expressed in the source unit.
    pub fn page_size(&self) -> (f64, f64) {
        (self.page_width, self.page_height)
    }

    /// Returns the converter for data already converted to `target`.
    ///
    /// The physical page and DPI are kept, so `retarget` chains compose:
    /// converting A→B with `c` and then B→C with `c.retarget(B)` equals A→C.
    pub fn retarget(&self, target: CoordinateUnit) -> Result<Self> {
        let (width_pts, height_pts) = self.page_size_points()?;
        let (page_width, page_height) = match target {
            CoordinateUnit::Normalized => (width_pts, height_pts),
            _ => (
                self.from_points(width_pts, target, true, self.dpi)?,
                self.from_points(height_pts, target, false, self.dpi)?,
            ),
        };
        Ok(Self {
            source_unit: target,
            page_width,
            page_height,
            dpi: self.dpi,
        })
    }

    /// Converts one scalar. `is_x` selects the axis used for normalization.
    pub fn convert_value(&self, value: f64, target: CoordinateUnit, is_x: bool) -> Result<f64> {
        self.convert_value_at(value, target, is_x, self.dpi)
    }

    /// Converts all four coordinates, keeping the min/max invariant.
    pub fn convert_bbox(&self, bbox: &BBox, target: CoordinateUnit) -> Result<BBox> {
        self.convert_bbox_at(bbox, target, self.dpi)
    }

    /// Converts a block's bbox; text, rotation, confidence and font pass through.
    pub fn convert_text_block(
        &self,
        block: &TextBlock,
        target: CoordinateUnit,
    ) -> Result<TextBlock> {
        self.convert_text_block_at(block, target, self.dpi)
    }

    /// Converts every block and table of `page` and records the target system.
    ///
    /// `target_dpi` is used for pixel targets (falling back to the converter's
    /// own DPI) and is recorded only when the target is pixel-based.
    pub fn convert_page(
        &self,
        page: &Page,
        target: CoordinateUnit,
        target_dpi: Option<f64>,
    ) -> Result<Page> {
        let out_dpi = if target.is_pixel_based() {
            match target_dpi.or(self.dpi) {
                Some(dpi) => Some(validate_dpi(dpi)?),
                None => return Err(UnifexError::MissingDpi { unit: target }),
            }
        } else {
            None
        };

        let texts = page
            .texts
            .iter()
            .map(|block| self.convert_text_block_at(block, target, out_dpi))
            .collect::<Result<Vec<_>>>()?;
        let tables = page
            .tables
            .iter()
            .map(|table| self.convert_table_at(table, target, out_dpi))
            .collect::<Result<Vec<_>>>()?;

        let coordinate_info = match out_dpi {
            Some(dpi) => CoordinateInfo::pixels(dpi),
            None => CoordinateInfo {
                unit: target,
                dpi: None,
            },
        };

        debug!(
            page = page.page,
            from = %self.source_unit,
            to = %target,
            blocks = texts.len(),
            "converted page"
        );

        Ok(Page {
            page: page.page,
            width: self.convert_value_at(page.width, target, true, out_dpi)?,
            height: self.convert_value_at(page.height, target, false, out_dpi)?,
            texts,
            tables,
            coordinate_info: Some(coordinate_info),
        })
    }

    fn convert_bbox_at(
        &self,
        bbox: &BBox,
        target: CoordinateUnit,
        target_dpi: Option<f64>,
    ) -> Result<BBox> {
        let x0 = self.convert_value_at(bbox.x0, target, true, target_dpi)?;
        let y0 = self.convert_value_at(bbox.y0, target, false, target_dpi)?;
        let x1 = self.convert_value_at(bbox.x1, target, true, target_dpi)?;
        let y1 = self.convert_value_at(bbox.y1, target, false, target_dpi)?;
        Ok(BBox::from_corners((x0, y0), (x1, y1)))
    }

    fn convert_text_block_at(
        &self,
        block: &TextBlock,
        target: CoordinateUnit,
        target_dpi: Option<f64>,
    ) -> Result<TextBlock> {
        Ok(TextBlock {
            bbox: self.convert_bbox_at(&block.bbox, target, target_dpi)?,
            ..block.clone()
        })
    }

    fn convert_table_at(
        &self,
        table: &Table,
        target: CoordinateUnit,
        target_dpi: Option<f64>,
    ) -> Result<Table> {
        let cells = table
            .cells
            .iter()
            .map(|cell| {
                Ok(TableCell {
                    bbox: cell
                        .bbox
                        .as_ref()
                        .map(|b| self.convert_bbox_at(b, target, target_dpi))
                        .transpose()?,
                    ..cell.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table {
            page: table.page,
            cells,
            row_count: table.row_count,
            col_count: table.col_count,
            bbox: table
                .bbox
                .as_ref()
                .map(|b| self.convert_bbox_at(b, target, target_dpi))
                .transpose()?,
        })
    }

    fn convert_value_at(
        &self,
        value: f64,
        target: CoordinateUnit,
        is_x: bool,
        target_dpi: Option<f64>,
    ) -> Result<f64> {
        if target == self.source_unit && (!target.is_pixel_based() || target_dpi == self.dpi) {
            return Ok(value);
        }
        let points = self.to_points(value, is_x)?;
        self.from_points(points, target, is_x, target_dpi)
    }

    fn source_dpi(&self) -> Result<f64> {
        match self.dpi {
            Some(dpi) => validate_dpi(dpi),
            None => Err(UnifexError::MissingDpi {
                unit: CoordinateUnit::Pixels,
            }),
        }
    }

    /// Physical page size in points.
    fn page_size_points(&self) -> Result<(f64, f64)> {
        let (w, h) = (self.page_width, self.page_height);
        let size = match self.source_unit {
            CoordinateUnit::Points | CoordinateUnit::Normalized => (w, h),
            CoordinateUnit::Inches => (w * POINTS_PER_INCH, h * POINTS_PER_INCH),
            CoordinateUnit::Pixels => {
                let dpi = self.source_dpi()?;
                (w * POINTS_PER_INCH / dpi, h * POINTS_PER_INCH / dpi)
            }
        };
        Ok(size)
    }

    fn page_dimension_points(&self, is_x: bool) -> Result<f64> {
        let (w, h) = self.page_size_points()?;
        let dim = if is_x { w } else { h };
        if dim.is_finite() && dim > 0.0 {
            Ok(dim)
        } else {
            Err(UnifexError::MissingPageSize)
        }
    }

    fn to_points(&self, value: f64, is_x: bool) -> Result<f64> {
        Ok(match self.source_unit {
            CoordinateUnit::Points => value,
            CoordinateUnit::Inches => value * POINTS_PER_INCH,
            CoordinateUnit::Pixels => value * POINTS_PER_INCH / self.source_dpi()?,
            CoordinateUnit::Normalized => value * self.page_dimension_points(is_x)?,
        })
    }

    fn from_points(
        &self,
        points: f64,
        target: CoordinateUnit,
        is_x: bool,
        target_dpi: Option<f64>,
    ) -> Result<f64> {
        Ok(match target {
            CoordinateUnit::Points => points,
            CoordinateUnit::Inches => points / POINTS_PER_INCH,
            CoordinateUnit::Pixels => {
                let dpi = target_dpi.ok_or(UnifexError::MissingDpi { unit: target })?;
                points * validate_dpi(dpi)? / POINTS_PER_INCH
            }
            CoordinateUnit::Normalized => points / self.page_dimension_points(is_x)?,
        })
    }
}
