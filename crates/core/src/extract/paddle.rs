//! PaddleOCR output adapter and a backend replaying saved PaddleOCR results.
//!
//! PaddleOCR reports one batch per image: `[[ [polygon, [text, confidence]], ... ]]`
//! where `polygon` is four `[x, y]` corners in image pixels. The outer list
//! is always length one for a single image, and Paddle uses `null`, `[]`,
//! `[[]]` or `[[null]]` for "nothing found".

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinates::{CoordinateConverter, CoordinateUnit, validate_dpi};
use crate::error::{Result, UnifexError};
use crate::geometry::{Polygon, polygon_from_points, polygon_to_bbox_and_rotation};
use crate::model::{CoordinateInfo, ExtractorMetadata, ExtractorType, Page, TextBlock};

use super::{Extract, ExtractorConfig};

/// One detection in Paddle's native layout: `[polygon, [text, confidence]]`.
pub type RawDetection = (Vec<Vec<f64>>, (String, f64));

/// Paddle's raw result for one image.
pub type RawResult = Option<Vec<Option<Vec<Option<RawDetection>>>>>;

/// A validated PaddleOCR detection.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddleDetection {
    pub polygon: Polygon,
    pub text: String,
    pub confidence: f64,
}

impl PaddleDetection {
    pub fn from_raw(raw: &RawDetection) -> Result<Self> {
        let (points, (text, confidence)) = raw;
        let polygon = polygon_from_points(points)?;
        if !(0.0..=1.0).contains(confidence) {
            return Err(UnifexError::InvalidConfidence(*confidence));
        }
        Ok(Self {
            polygon,
            text: text.clone(),
            confidence: *confidence,
        })
    }
}

/// Converts PaddleOCR output to text blocks in pixel coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaddleOcrAdapter;

impl PaddleOcrAdapter {
    /// Validates every detection, then converts the non-blank ones.
    ///
    /// A malformed detection fails the whole result; blank text is skipped.
    pub fn convert_result(&self, result: &RawResult) -> Result<Vec<TextBlock>> {
        let Some(Some(items)) = result.as_ref().and_then(|batch| batch.first()) else {
            return Ok(Vec::new());
        };

        let detections = items
            .iter()
            .flatten()
            .map(PaddleDetection::from_raw)
            .collect::<Result<Vec<_>>>()?;

        Ok(self.detections_to_blocks(detections))
    }

    fn detections_to_blocks(&self, detections: Vec<PaddleDetection>) -> Vec<TextBlock> {
        let total = detections.len();
        let blocks: Vec<TextBlock> = detections
            .into_iter()
            .filter(|d| !d.text.trim().is_empty())
            .map(|d| {
                let (bbox, rotation) = polygon_to_bbox_and_rotation(&d.polygon);
                TextBlock {
                    text: d.text,
                    bbox,
                    rotation,
                    confidence: Some(d.confidence),
                    font_info: None,
                }
            })
            .collect();

        if blocks.len() < total {
            debug!(skipped = total - blocks.len(), "skipped blank paddle detections");
        }
        blocks
    }
}

/// One page of a saved PaddleOCR run; dimensions are the image size in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddleDumpPage {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub result: RawResult,
}

/// A saved PaddleOCR run over a rasterized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddleDump {
    /// DPI the pages were rendered at.
    #[serde(default)]
    pub dpi: Option<f64>,
    pub pages: Vec<PaddleDumpPage>,
}

/// Backend that replays saved PaddleOCR output as a document.
#[derive(Debug, Clone)]
pub struct PaddleDumpExtractor {
    path: PathBuf,
    dump: PaddleDump,
    dpi: f64,
    config: ExtractorConfig,
    adapter: PaddleOcrAdapter,
}

impl PaddleDumpExtractor {
    pub fn open(path: impl AsRef<Path>, config: ExtractorConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read_to_string(&path)?;
        let dump: PaddleDump = serde_json::from_str(&data)?;
        Self::from_dump(path, dump, config)
    }

    pub fn from_dump(
        path: impl AsRef<Path>,
        dump: PaddleDump,
        config: ExtractorConfig,
    ) -> Result<Self> {
        let dpi = validate_dpi(dump.dpi.unwrap_or(config.dpi))?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            dump,
            dpi,
            config,
            adapter: PaddleOcrAdapter,
        })
    }

    /// DPI the pixel coordinates were produced at.
    pub fn dpi(&self) -> f64 {
        self.dpi
    }
}

impl Extract for PaddleDumpExtractor {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.dump.pages.len()
    }

    fn extract_page(&self, page: usize) -> Result<Page> {
        let raw = self.dump.pages.get(page).ok_or(UnifexError::PageOutOfRange {
            page,
            count: self.dump.pages.len(),
        })?;

        let texts = self.adapter.convert_result(&raw.result)?;
        let pixel_page = Page::new(page, raw.width, raw.height)
            .with_texts(texts)
            .with_coordinate_info(CoordinateInfo::pixels(self.dpi));

        if self.config.output_unit == CoordinateUnit::Pixels {
            return Ok(pixel_page);
        }
        CoordinateConverter::new(CoordinateUnit::Pixels, raw.width, raw.height)
            .with_dpi(self.dpi)
            .convert_page(&pixel_page, self.config.output_unit, None)
    }

    fn metadata(&self) -> Option<ExtractorMetadata> {
        Some(
            ExtractorMetadata::new(ExtractorType::Paddle)
                .with_extra("ocr_engine", "paddleocr")
                .with_extra("dpi", self.dpi),
        )
    }
}
