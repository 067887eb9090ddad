//! Bidirectional GEDCOM engine.
//!
//! # Responsibility
//! - Import: tokenize lines, track nesting context, assemble per-record
//!   accumulators and resolve cross-references into a `RecordGraph`.
//! - Export: walk a `RecordGraph` in fixed order and render GEDCOM 5.5.5 text
//!   with `CONC`/`CONT` continuation for long or multi-line notes.
//!
//! # Invariants
//! - Both directions are pure single-pass transforms over in-memory text;
//!   no state survives a call.
//! - Lenient mode never fails on per-line anomalies: malformed lines,
//!   dangling references and unknown tags are skipped and counted.
//!
//! # See also
//! - docs/architecture/gedcom.md

pub mod assembler;
pub mod context;
pub mod line;
pub mod resolver;
pub mod serializer;
pub mod tags;
pub mod wrap;

use crate::model::graph::RecordGraph;
use chrono::{DateTime, Utc};
use line::LineDefect;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Source product written to the export header by default.
pub const DEFAULT_SOURCE_NAME: &str = "FAMTREE";
/// GEDCOM version written to the export header.
pub const GEDCOM_VERSION: &str = "5.5.5";

pub type GedcomResult<T> = Result<T, GedcomError>;

/// Call-level GEDCOM failure.
#[derive(Debug)]
pub enum GedcomError {
    /// Input bytes are not valid UTF-8.
    InvalidEncoding(std::str::Utf8Error),
    /// Strict mode only: a non-blank line could not be tokenized.
    MalformedLine {
        line_number: usize,
        reason: LineDefect,
    },
    /// Strict mode only: a reference names no defined record.
    DanglingReference { owner: String, reference: String },
    /// Output sink rejected a write.
    Write(std::fmt::Error),
}

impl Display for GedcomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEncoding(err) => write!(f, "input is not valid UTF-8: {err}"),
            Self::MalformedLine {
                line_number,
                reason,
            } => write!(f, "malformed line {line_number}: {reason}"),
            Self::DanglingReference { owner, reference } => {
                write!(f, "record `{owner}` references undefined `{reference}`")
            }
            Self::Write(err) => write!(f, "failed to write GEDCOM text: {err}"),
        }
    }
}

impl Error for GedcomError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(err) => Some(err),
            Self::Write(err) => Some(err),
            Self::MalformedLine { .. } | Self::DanglingReference { .. } => None,
        }
    }
}

impl From<std::str::Utf8Error> for GedcomError {
    fn from(value: std::str::Utf8Error) -> Self {
        Self::InvalidEncoding(value)
    }
}

impl From<std::fmt::Error> for GedcomError {
    fn from(value: std::fmt::Error) -> Self {
        Self::Write(value)
    }
}

/// How import treats per-line anomalies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Skip and count malformed lines and dangling references.
    #[default]
    Lenient,
    /// Fail the call on the first malformed line or dangling reference.
    Strict,
}

/// Import configuration.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub mode: ParseMode,
}

impl ImportOptions {
    pub fn strict() -> Self {
        Self {
            mode: ParseMode::Strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.mode == ParseMode::Strict
    }
}

/// Export configuration for the fixed header block.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub source_name: String,
    pub source_version: String,
    /// Header timestamp. `None` uses the current UTC time.
    pub exported_at: Option<DateTime<Utc>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            source_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: None,
        }
    }
}

impl ExportOptions {
    /// Pins the header timestamp so repeated exports are byte-identical.
    pub fn at(exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_at: Some(exported_at),
            ..Self::default()
        }
    }
}

/// Counters for what a lenient import skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Physical lines seen, blank lines included.
    pub total_lines: usize,
    /// Non-blank lines dropped by the tokenizer.
    pub skipped_lines: usize,
    /// Well-formed lines whose tag had no meaning in their context.
    pub ignored_lines: usize,
    /// References that named no defined record.
    pub dangling_references: usize,
}

impl ImportReport {
    /// Whether the import consumed every line and reference.
    pub fn is_clean(&self) -> bool {
        self.skipped_lines == 0 && self.ignored_lines == 0 && self.dangling_references == 0
    }
}

/// Import result with its anomaly report.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub graph: RecordGraph,
    pub report: ImportReport,
}

/// Imports GEDCOM text into a record graph.
pub fn parse_document(text: &str, options: &ImportOptions) -> GedcomResult<ImportOutcome> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut report = ImportReport::default();
    let records = assembler::assemble(text, options, &mut report)?;
    let graph = resolver::resolve(records, options, &mut report)?;
    Ok(ImportOutcome { graph, report })
}

/// Imports raw bytes; fails only when they are not UTF-8 (or per strict mode).
pub fn parse_bytes(bytes: &[u8], options: &ImportOptions) -> GedcomResult<ImportOutcome> {
    let text = std::str::from_utf8(bytes)?;
    parse_document(text, options)
}

/// Imports GEDCOM text with default options, discarding the report.
pub fn import(text: &str) -> GedcomResult<RecordGraph> {
    parse_document(text, &ImportOptions::default()).map(|outcome| outcome.graph)
}

/// Exports a record graph as GEDCOM text.
pub fn write_document(graph: &RecordGraph, options: &ExportOptions) -> GedcomResult<String> {
    serializer::serialize(graph, options)
}

/// Exports a record graph with default options.
pub fn export(graph: &RecordGraph) -> GedcomResult<String> {
    write_document(graph, &ExportOptions::default())
}
