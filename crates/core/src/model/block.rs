//! Text fragments and their font metadata.

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, HasBBox};

/// Descriptive font attributes; nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    /// Style flags as reported by the source (bold/italic bits etc.).
    #[serde(default)]
    pub flags: Option<u32>,
    #[serde(default)]
    pub weight: Option<u32>,
}

/// A unit of recognized text with geometry.
///
/// `confidence` is only present when a probabilistic recognizer produced the
/// block. Blocks synthesized by merging several fragments never carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub bbox: BBox,
    /// Degrees from horizontal; 0 means axis-aligned.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub font_info: Option<FontInfo>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            rotation: 0.0,
            confidence: None,
            font_info: None,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Attaches a recognizer confidence.
    ///
    /// # Panics
    /// Panics if `confidence` is not within [0, 1].
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&confidence),
            "confidence should be a number between 0 and 1"
        );
        self.confidence = Some(confidence);
        self
    }

    pub fn with_font(mut self, font_info: FontInfo) -> Self {
        self.font_info = Some(font_info);
        self
    }
}

impl HasBBox for TextBlock {
    fn bbox(&self) -> &BBox {
        &self.bbox
    }
}
