//! Tests for line grouping and gap-based fragment merging.

use std::borrow::Cow;

use unifex_core::merge::{MergeParams, group_lines, merge_blocks, merge_line};
use unifex_core::model::FontInfo;
use unifex_core::{BBox, Page, TextBlock};

fn block(text: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> TextBlock {
    TextBlock::new(text, BBox::new(x0, y0, x1, y1).unwrap())
}

fn texts(merged: &[unifex_core::merge::MergedBlock<'_>]) -> Vec<String> {
    merged.iter().map(|m| m.block.text.clone()).collect()
}

// ============================================================================
// Threshold boundary
// ============================================================================

#[test]
fn test_gap_equal_to_threshold_merges() {
    let blocks = vec![
        block("a", 0.0, 0.0, 10.0, 10.0),
        block("b", 15.0, 0.0, 25.0, 10.0),
    ];
    let merged = merge_blocks(&blocks, &MergeParams::new(5.0));
    assert_eq!(texts(&merged), ["a b"]);
}

#[test]
fn test_gap_above_threshold_splits() {
    let blocks = vec![
        block("a", 0.0, 0.0, 10.0, 10.0),
        block("b", 15.5, 0.0, 25.0, 10.0),
    ];
    let merged = merge_blocks(&blocks, &MergeParams::new(5.0));
    assert_eq!(texts(&merged), ["a", "b"]);
}

#[test]
fn test_overlapping_fragments_always_merge() {
    let blocks = vec![
        block("over", 0.0, 0.0, 30.0, 10.0),
        block("lap", 20.0, 0.0, 40.0, 10.0),
    ];
    let merged = merge_blocks(&blocks, &MergeParams::new(0.0));
    assert_eq!(texts(&merged), ["over lap"]);
    assert_eq!(merged[0].block.bbox, BBox::new(0.0, 0.0, 40.0, 10.0).unwrap());
}

// ============================================================================
// Synthesis
// ============================================================================

#[test]
fn test_merged_block_synthesis() {
    let font = FontInfo {
        name: Some("Helvetica".to_string()),
        size: Some(12.0),
        ..FontInfo::default()
    };
    let blocks = vec![
        block("Hello", 0.0, 2.0, 40.0, 12.0)
            .with_rotation(1.5)
            .with_confidence(0.9)
            .with_font(font.clone()),
        block("World", 45.0, 0.0, 90.0, 14.0)
            .with_rotation(3.0)
            .with_confidence(0.8)
            .with_font(font),
    ];

    let merged = merge_blocks(&blocks, &MergeParams::new(10.0));
    assert_eq!(merged.len(), 1);

    let m = &merged[0];
    assert!(m.is_synthesized());
    assert!(matches!(m.block, Cow::Owned(_)));
    assert_eq!(m.block.text, "Hello World");
    assert_eq!(m.block.bbox, BBox::new(0.0, 0.0, 90.0, 14.0).unwrap());
    assert_eq!(m.block.rotation, 1.5);
    assert_eq!(m.block.confidence, None);
    assert_eq!(m.block.font_info, None);
    assert_eq!(m.originals.len(), 2);
    assert_eq!(*m.originals[0], blocks[0]);
    assert_eq!(*m.originals[1], blocks[1]);
}

#[test]
fn test_run_order_is_left_to_right() {
    let blocks = vec![
        block("three", 100.0, 0.0, 140.0, 10.0),
        block("one", 0.0, 0.0, 40.0, 10.0),
        block("two", 50.0, 0.0, 90.0, 10.0),
    ];
    let merged = merge_blocks(&blocks, &MergeParams::new(10.0));
    assert_eq!(texts(&merged), ["one two three"]);
    let order: Vec<&str> = merged[0].originals.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(order, ["one", "two", "three"]);
}

// ============================================================================
// Idempotence and pass-through
// ============================================================================

#[test]
fn test_merge_is_idempotent_on_single_block() {
    let blocks = vec![
        block("alone", 10.0, 10.0, 50.0, 20.0)
            .with_confidence(0.42)
            .with_font(FontInfo::default()),
    ];
    for gap in [-10.0, 0.0, 5.0, 1000.0] {
        let merged = merge_blocks(&blocks, &MergeParams::new(gap));
        assert_eq!(merged.len(), 1);
        assert!(matches!(merged[0].block, Cow::Borrowed(_)));
        assert_eq!(*merged[0].block, blocks[0]);
    }
}

#[test]
fn test_remerging_merged_page_is_stable() {
    let page = Page::new(0, 612.0, 792.0).with_texts(vec![
        block("First", 0.0, 0.0, 40.0, 20.0),
        block("page", 50.0, 0.0, 90.0, 20.0),
        block("Far", 400.0, 0.0, 430.0, 20.0),
    ]);
    let params = MergeParams::new(15.0);

    let once = page.merged(&params);
    let twice = once.merged(&params);
    assert_eq!(once, twice);
    assert_eq!(once.texts.len(), 2);
    assert_eq!(once.texts[0].text, "First page");
    assert_eq!(once.texts[1].text, "Far");
}

#[test]
fn test_empty_input() {
    assert!(merge_blocks(&[], &MergeParams::new(5.0)).is_empty());
    assert!(merge_line(&[], 5.0).is_empty());
    assert!(group_lines(&[], 5.0).is_empty());
}

// ============================================================================
// Line grouping
// ============================================================================

#[test]
fn test_lines_come_out_top_to_bottom() {
    let blocks = vec![
        block("bottom", 0.0, 300.0, 40.0, 310.0),
        block("top", 0.0, 1.0, 40.0, 11.0),
        block("middle", 0.0, 150.0, 40.0, 160.0),
    ];
    let lines = group_lines(&blocks, 5.0);
    let firsts: Vec<&str> = lines.iter().map(|l| l[0].text.as_str()).collect();
    assert_eq!(firsts, ["top", "middle", "bottom"]);
}

#[test]
fn test_bucket_boundary_splits_visual_line() {
    // y0 of 4.9 and 5.1 straddle the bucket boundary at 5.0
    let blocks = vec![
        block("left", 0.0, 4.9, 40.0, 15.0),
        block("right", 42.0, 5.1, 80.0, 15.0),
    ];
    let merged = merge_blocks(&blocks, &MergeParams::new(10.0));
    assert_eq!(texts(&merged), ["left", "right"]);

    let merged = merge_blocks(&blocks, &MergeParams::new(10.0).line_gap(20.0));
    assert_eq!(texts(&merged), ["left right"]);
}

#[test]
fn test_zero_line_gap_merges_across_lines() {
    let blocks = vec![
        block("up", 0.0, 0.0, 20.0, 10.0),
        block("down", 25.0, 400.0, 60.0, 410.0),
    ];
    let merged = merge_blocks(&blocks, &MergeParams::new(10.0).line_gap(0.0));
    assert_eq!(texts(&merged), ["up down"]);
    assert_eq!(merged[0].block.bbox, BBox::new(0.0, 0.0, 60.0, 410.0).unwrap());
}

#[test]
fn test_equal_x0_keeps_storage_order() {
    let blocks = vec![
        block("first", 10.0, 0.0, 20.0, 10.0),
        block("second", 10.0, 0.0, 30.0, 10.0),
    ];
    let lines = group_lines(&blocks, 5.0);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0][0].text, "first");
    assert_eq!(lines[0][1].text, "second");
}

#[test]
fn test_merged_page_keeps_page_fields() {
    let page = Page::new(3, 100.0, 200.0)
        .with_texts(vec![block("a", 0.0, 0.0, 5.0, 5.0)])
        .with_coordinate_info(unifex_core::CoordinateInfo::points());
    let merged = page.merged(&MergeParams::new(1.0));
    assert_eq!(merged.page, 3);
    assert_eq!(merged.width, 100.0);
    assert_eq!(merged.height, 200.0);
    assert_eq!(merged.coordinate_info, page.coordinate_info);
    assert_eq!(merged.texts, page.texts);
}
