//! unifex - Extract positioned text from documents
//!
//! Reads a serialized unifex document or saved PaddleOCR output and prints
//! its text blocks, the whole document as JSON, or the results of a search.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use regex::{Regex, RegexBuilder};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use unifex_core::extract::{
    BackendKind, DEFAULT_DPI, Extract, ExtractOptions, ExtractorConfig, create_extractor,
};
use unifex_core::merge::DEFAULT_LINE_GAP;
use unifex_core::{CoordinateUnit, Document, Pattern, SearchOptions, SearchResult};

/// Backend used to read the input.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum ExtractorArg {
    /// A serialized unifex document (JSON)
    #[default]
    Document,
    /// Saved PaddleOCR output (JSON)
    Paddle,
}

impl From<ExtractorArg> for BackendKind {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::Document => BackendKind::DocumentFile,
            ExtractorArg::Paddle => BackendKind::PaddleDump,
        }
    }
}

/// Extract positioned text from documents.
#[derive(Parser, Debug)]
#[command(name = "unifex")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file path
    input: PathBuf,

    /// Extractor backend
    #[arg(short = 'e', long, value_enum, default_value = "document")]
    extractor: ExtractorArg,

    /// Comma-separated page numbers to extract (0-indexed, default: all)
    #[arg(short = 'p', long)]
    pages: Option<String>,

    /// Coordinate unit of the output
    #[arg(short = 'u', long, default_value = "points", value_parser = parse_unit)]
    unit: CoordinateUnit,

    /// DPI for pixel input without its own DPI, and for pixel output
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: f64,

    /// Worker threads (default: available parallelism)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Output as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    // === Search options ===
    /// Print only blocks matching this pattern
    #[arg(short = 's', long)]
    search: Option<String>,

    /// Treat the search pattern as a regular expression
    #[arg(long, action = ArgAction::SetTrue, requires = "search")]
    regex: bool,

    /// Match the search pattern case-insensitively
    #[arg(short = 'i', long = "ignore-case", action = ArgAction::SetTrue, requires = "search")]
    ignore_case: bool,

    /// Merge fragments closer than this horizontal gap before matching
    #[arg(long = "merge-gap", requires = "search")]
    merge_gap: Option<f64>,

    /// Vertical tolerance for grouping fragments into lines
    #[arg(long = "line-gap", default_value_t = DEFAULT_LINE_GAP)]
    line_gap: f64,
}

fn parse_unit(s: &str) -> std::result::Result<CoordinateUnit, String> {
    s.parse().map_err(|e: unifex_core::UnifexError| e.to_string())
}

/// Parse a comma-separated page list.
fn parse_pages(pages: &str) -> Result<Vec<usize>> {
    pages
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("invalid page number: {s}"))
        })
        .collect()
}

fn build_pattern(args: &Args, pattern: &str) -> Result<Pattern> {
    if !args.regex {
        return Ok(Pattern::from(pattern));
    }
    let regex: Regex = RegexBuilder::new(pattern)
        .case_insensitive(args.ignore_case)
        .build()
        .with_context(|| format!("invalid regular expression: {pattern}"))?;
    Ok(Pattern::Regex(regex))
}

fn write_text<W: Write>(writer: &mut W, doc: &Document) -> io::Result<()> {
    for page in &doc.pages {
        writeln!(writer, "=== Page {} ===", page.page + 1)?;
        for text in &page.texts {
            let b = &text.bbox;
            let conf = text
                .confidence
                .map(|c| format!(" ({c:.2})"))
                .unwrap_or_default();
            writeln!(
                writer,
                "[{:.1},{:.1},{:.1},{:.1}]{} {}",
                b.x0, b.y0, b.x1, b.y1, conf, text.text
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_results<W: Write>(writer: &mut W, results: &[SearchResult]) -> io::Result<()> {
    for result in results {
        let b = &result.block.bbox;
        writeln!(
            writer,
            "page {}: [{:.1},{:.1},{:.1},{:.1}] {} ({} fragments)",
            result.page,
            b.x0,
            b.y0,
            b.x1,
            b.y1,
            result.block.text,
            result.original_blocks.len()
        )?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    if !args.input.exists() {
        bail!("file not found: {}", args.input.display());
    }

    let config = ExtractorConfig::default()
        .output_unit(args.unit)
        .dpi(args.dpi);
    let extractor = create_extractor(&args.input, args.extractor.into(), &config)
        .with_context(|| format!("failed to open '{}'", args.input.display()))?;

    let options = ExtractOptions {
        pages: args.pages.as_deref().map(parse_pages).transpose()?,
        threads: args.threads,
    };
    let doc = extractor
        .extract(&options)
        .with_context(|| format!("failed to extract '{}'", args.input.display()))?;
    debug!(pages = doc.pages.len(), "document ready");

    let mut out = BufWriter::new(io::stdout().lock());

    match &args.search {
        Some(pattern) => {
            let mut search = SearchOptions::default()
                .case_sensitive(!args.ignore_case)
                .line_gap(args.line_gap);
            if let Some(gap) = args.merge_gap {
                search = search.merge_gap(gap);
            }
            let results = doc.search(build_pattern(args, pattern)?, &search)?;
            if args.json {
                serde_json::to_writer_pretty(&mut out, &results)?;
                writeln!(out)?;
            } else {
                write_results(&mut out, &results)?;
            }
        }
        None if args.json => {
            serde_json::to_writer_pretty(&mut out, &doc)?;
            writeln!(out)?;
        }
        None => write_text(&mut out, &doc)?,
    }

    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .without_time()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pages() {
        assert_eq!(parse_pages("0,1, 3").unwrap(), vec![0, 1, 3]);
        assert_eq!(parse_pages("2,").unwrap(), vec![2]);
        assert!(parse_pages("one").is_err());
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(parse_unit("inches").unwrap(), CoordinateUnit::Inches);
        assert!(parse_unit("furlongs").is_err());
    }

    #[test]
    fn test_args_verify() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
