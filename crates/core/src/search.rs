//! Pattern search over text blocks.
//!
//! Patterns are either literal substrings or compiled regular expressions.
//! Literals are escaped before compilation, so they can never inject regex
//! syntax. A compiled regex keeps its own flags and ignores `case_sensitive`.
//!
//! Search runs over any [`BlockSource`]: a single `Page` or a `Document`.
//! With a merge gap, each page's fragments are line-grouped and merged first
//! (see [`crate::merge`]) and every hit reports the fragments it came from.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::merge::{DEFAULT_LINE_GAP, MergeParams, MergedBlock, merge_blocks};
use crate::model::{Document, Page, TextBlock};

/// A search pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matched as a plain substring.
    Literal(String),
    /// Matched as-is, with the regex's own flags.
    Regex(Regex),
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl From<&Regex> for Pattern {
    fn from(re: &Regex) -> Self {
        Self::Regex(re.clone())
    }
}

/// A pattern compiled for matching.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    pub fn new(pattern: &Pattern, case_sensitive: bool) -> Result<Self> {
        let regex = match pattern {
            Pattern::Regex(re) => re.clone(),
            Pattern::Literal(text) => RegexBuilder::new(&regex::escape(text))
                .case_insensitive(!case_sensitive)
                .build()?,
        };
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }
}

/// Which pages a document search looks at.
///
/// Unknown page numbers are not an error; they just contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    #[default]
    All,
    Single(usize),
    Many(Vec<usize>),
}

impl PageSelection {
    pub fn contains(&self, page: usize) -> bool {
        match self {
            Self::All => true,
            Self::Single(p) => *p == page,
            Self::Many(pages) => pages.contains(&page),
        }
    }
}

impl From<usize> for PageSelection {
    fn from(page: usize) -> Self {
        Self::Single(page)
    }
}

impl From<Vec<usize>> for PageSelection {
    fn from(pages: Vec<usize>) -> Self {
        Self::Many(pages)
    }
}

impl From<&[usize]> for PageSelection {
    fn from(pages: &[usize]) -> Self {
        Self::Many(pages.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for PageSelection {
    fn from(pages: [usize; N]) -> Self {
        Self::Many(pages.to_vec())
    }
}

impl<T: Into<PageSelection>> From<Option<T>> for PageSelection {
    fn from(pages: Option<T>) -> Self {
        pages.map_or(Self::All, Into::into)
    }
}

/// Options for document search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Case sensitivity for literal patterns. Ignored for compiled regexes.
    pub case_sensitive: bool,

    /// Pages to search, by page number.
    pub pages: PageSelection,

    /// When set, fragments within this horizontal gap are merged before
    /// matching. None matches raw blocks.
    pub merge_gap: Option<f64>,

    /// Vertical tolerance for grouping fragments into lines; only used with
    /// `merge_gap`.
    pub line_gap: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            pages: PageSelection::All,
            merge_gap: None,
            line_gap: DEFAULT_LINE_GAP,
        }
    }
}

impl SearchOptions {
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn pages(mut self, pages: impl Into<PageSelection>) -> Self {
        self.pages = pages.into();
        self
    }

    pub fn merge_gap(mut self, merge_gap: f64) -> Self {
        self.merge_gap = Some(merge_gap);
        self
    }

    pub fn line_gap(mut self, line_gap: f64) -> Self {
        self.line_gap = line_gap;
        self
    }

    /// Merge parameters, if merging was requested.
    pub fn merge_params(&self) -> Option<MergeParams> {
        self.merge_gap
            .map(|gap| MergeParams::new(gap).line_gap(self.line_gap))
    }
}

/// A matched block with the fragments that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page number (0-indexed).
    pub page: usize,
    /// The matching block; synthesized when several fragments were merged.
    pub block: TextBlock,
    /// Contributing fragments in left-to-right order, verbatim. Exactly one
    /// element when no merge happened.
    pub original_blocks: Vec<TextBlock>,
}

/// Anything that exposes text blocks grouped by page.
pub trait BlockSource {
    /// `(page number, blocks)` pairs in page order.
    fn block_pages(&self) -> impl Iterator<Item = (usize, &[TextBlock])> + '_;
}

impl BlockSource for Page {
    fn block_pages(&self) -> impl Iterator<Item = (usize, &[TextBlock])> + '_ {
        std::iter::once((self.page, self.texts.as_slice()))
    }
}

impl BlockSource for Document {
    fn block_pages(&self) -> impl Iterator<Item = (usize, &[TextBlock])> + '_ {
        self.pages.iter().map(|p| (p.page, p.texts.as_slice()))
    }
}

/// Matches one page's blocks, merging them first when `merge` is given.
///
/// Without merging, hits come back in storage order and each borrows its
/// block. With merging, hits follow line-then-left-to-right order.
pub fn search_blocks<'a>(
    blocks: &'a [TextBlock],
    matcher: &Matcher,
    merge: Option<&MergeParams>,
) -> Vec<MergedBlock<'a>> {
    match merge {
        Some(params) => merge_blocks(blocks, params)
            .into_iter()
            .filter(|merged| matcher.is_match(&merged.block.text))
            .collect(),
        None => blocks
            .iter()
            .filter(|block| matcher.is_match(&block.text))
            .map(|block| MergedBlock {
                block: Cow::Borrowed(block),
                originals: vec![block],
            })
            .collect(),
    }
}

/// Searches the selected pages of `source` in page order.
pub fn search_source<S: BlockSource>(
    source: &S,
    matcher: &Matcher,
    options: &SearchOptions,
) -> Vec<SearchResult> {
    let merge = options.merge_params();
    let mut results = Vec::new();

    for (page, blocks) in source.block_pages() {
        if !options.pages.contains(page) {
            continue;
        }
        for hit in search_blocks(blocks, matcher, merge.as_ref()) {
            results.push(SearchResult {
                page,
                original_blocks: hit.originals.iter().map(|b| (*b).clone()).collect(),
                block: hit.block.into_owned(),
            });
        }
    }

    debug!(
        pattern = matcher.as_regex().as_str(),
        merged = merge.is_some(),
        results = results.len(),
        "search finished"
    );
    results
}
