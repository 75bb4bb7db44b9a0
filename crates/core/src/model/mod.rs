//! Document model types - the entity graph every extractor produces.
//!
//! This module contains:
//! - `block` - text fragments (TextBlock, FontInfo)
//! - `table` - sparse tables (Table, TableCell)
//! - `page` - pages and their coordinate system (Page, CoordinateInfo)
//! - `document` - the root entity and extractor metadata (Document, ExtractorMetadata)
//!
//! Core operations never mutate these values in place: conversion, merging and
//! search all return new values.

pub mod block;
pub mod document;
pub mod page;
pub mod table;

// Re-export main types for convenience
pub use block::{FontInfo, TextBlock};
pub use document::{Document, ExtractorMetadata, ExtractorType};
pub use page::{CoordinateInfo, Page};
pub use table::{Table, TableCell};
