//! Line grouping and horizontal-gap merging of text fragments.
//!
//! Word- or character-level OCR emits one block per fragment, so a phrase like
//! "First page" is split across blocks. Merging works in three steps:
//! 1. bucket blocks into lines by `floor(y0 / line_gap)`
//! 2. sort each line by `x0`
//! 3. join runs whose horizontal gap (`x0 - previous x1`) is at most `merge_gap`
//!
//! The bucketing is a plain quantization, not clustering: a visual line whose
//! y0 values straddle a bucket boundary ends up split in two.

use std::borrow::Cow;
use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::debug;

use crate::geometry::BBox;
use crate::model::TextBlock;

/// Default vertical tolerance for line grouping, in points.
pub const DEFAULT_LINE_GAP: f64 = 5.0;

/// Parameters for fragment merging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeParams {
    /// Maximum horizontal gap between neighbouring fragments for them to be
    /// joined. Overlapping fragments (negative gap) always join.
    pub merge_gap: f64,

    /// Vertical quantization step used to bucket fragments into lines.
    /// Zero (or any non-positive value) puts every fragment on one line.
    pub line_gap: f64,
}

impl MergeParams {
    pub fn new(merge_gap: f64) -> Self {
        Self {
            merge_gap,
            line_gap: DEFAULT_LINE_GAP,
        }
    }

    pub fn line_gap(mut self, line_gap: f64) -> Self {
        self.line_gap = line_gap;
        self
    }
}

/// A block produced by merging, together with the fragments it came from.
///
/// A run of one fragment passes through untouched: `block` then borrows that
/// very fragment, confidence and font info included.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBlock<'a> {
    pub block: Cow<'a, TextBlock>,
    /// Contributing fragments, left to right.
    pub originals: Vec<&'a TextBlock>,
}

impl MergedBlock<'_> {
    /// True when the block was synthesized from more than one fragment.
    pub fn is_synthesized(&self) -> bool {
        self.originals.len() > 1
    }
}

fn line_key(y0: f64, line_gap: f64) -> i64 {
    if line_gap > 0.0 && line_gap.is_finite() {
        // saturating cast; NaN lands in bucket 0
        (y0 / line_gap).floor() as i64
    } else {
        0
    }
}

/// Buckets blocks into lines and sorts each line left to right.
///
/// Lines come out in ascending bucket order (top to bottom for y-down
/// coordinates), not in the order each line's first block appears in
/// storage, so shuffled input yields the same line sequence. Within a line,
/// blocks with equal `x0` keep their storage order.
pub fn group_lines(blocks: &[TextBlock], line_gap: f64) -> Vec<Vec<&TextBlock>> {
    let mut buckets: BTreeMap<i64, Vec<&TextBlock>> = BTreeMap::new();
    for block in blocks {
        buckets
            .entry(line_key(block.bbox.y0, line_gap))
            .or_default()
            .push(block);
    }

    buckets
        .into_values()
        .map(|mut line| {
            line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            line
        })
        .collect()
}

/// Merges one left-to-right sorted line into runs.
pub fn merge_line<'a>(line: &[&'a TextBlock], merge_gap: f64) -> Vec<MergedBlock<'a>> {
    let mut merged = Vec::new();
    let Some((first, rest)) = line.split_first() else {
        return merged;
    };

    let mut run: Vec<&'a TextBlock> = vec![*first];
    for &block in rest {
        let prev = run[run.len() - 1];
        if block.bbox.x0 - prev.bbox.x1 <= merge_gap {
            run.push(block);
        } else {
            merged.push(close_run(std::mem::replace(&mut run, vec![block])));
        }
    }
    merged.push(close_run(run));
    merged
}

fn close_run(run: Vec<&TextBlock>) -> MergedBlock<'_> {
    if run.len() == 1 {
        let single = run[0];
        return MergedBlock {
            block: Cow::Borrowed(single),
            originals: run,
        };
    }

    let text = run.iter().map(|b| b.text.as_str()).join(" ");
    let bbox = run
        .iter()
        .skip(1)
        .fold(run[0].bbox, |acc: BBox, b| acc.union(&b.bbox));

    MergedBlock {
        block: Cow::Owned(TextBlock {
            text,
            bbox,
            rotation: run[0].rotation,
            // Per-fragment confidences do not combine meaningfully.
            confidence: None,
            font_info: None,
        }),
        originals: run,
    }
}

/// Groups `blocks` into lines and merges each line.
///
/// Output order is line by line (ascending bucket), left to right within a
/// line. Empty input yields empty output.
pub fn merge_blocks<'a>(blocks: &'a [TextBlock], params: &MergeParams) -> Vec<MergedBlock<'a>> {
    let lines = group_lines(blocks, params.line_gap);
    let merged: Vec<MergedBlock<'a>> = lines
        .iter()
        .flat_map(|line| merge_line(line, params.merge_gap))
        .collect();

    debug!(
        fragments = blocks.len(),
        lines = lines.len(),
        merged = merged.len(),
        "merged text blocks"
    );
    merged
}
