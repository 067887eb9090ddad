//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose GEDCOM import/export to Dart via FRB as byte/text envelopes.
//! - Keep error semantics simple: `ok` flag plus a human-readable message.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - File picking and byte I/O stay on the Dart side; these calls only
//!   transform already-materialized data.
//!
//! # See also
//! - docs/architecture/gedcom.md

use chrono::DateTime;
use famtree_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ExportOptions, GedcomService, ImportOptions, RecordGraph,
};
use log::warn;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Import result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GedcomImportResponse {
    /// Whether the import produced a graph.
    pub ok: bool,
    /// Human-readable summary or failure reason.
    pub message: String,
    /// Record graph as JSON (`None` on failure).
    pub graph_json: Option<String>,
    pub individual_count: u32,
    pub family_count: u32,
    /// Malformed lines dropped by the tokenizer.
    pub skipped_lines: u32,
    /// References to records that were never defined.
    pub dangling_references: u32,
}

impl GedcomImportResponse {
    fn failure(message: String) -> Self {
        warn!("event=ffi_call module=ffi call=gedcom_import status=error");
        Self {
            ok: false,
            message,
            graph_json: None,
            individual_count: 0,
            family_count: 0,
            skipped_lines: 0,
            dangling_references: 0,
        }
    }
}

/// Export result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GedcomExportResponse {
    pub ok: bool,
    pub message: String,
    /// GEDCOM text (empty on failure).
    pub text: String,
}

/// Imports GEDCOM file bytes picked on the Dart side.
///
/// Input semantics:
/// - `bytes`: raw file content; must be UTF-8 (a BOM is tolerated).
/// - `strict`: fail on the first malformed line or dangling reference
///   instead of skipping it.
///
/// # FFI contract
/// - Sync call, CPU-bound, no I/O.
/// - Never panics; failures are reported with `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn gedcom_import(bytes: Vec<u8>, strict: bool) -> GedcomImportResponse {
    let import_options = if strict {
        ImportOptions::strict()
    } else {
        ImportOptions::default()
    };
    let service = GedcomService::new(import_options, ExportOptions::default());

    let outcome = match service.import_bytes(&bytes) {
        Ok(outcome) => outcome,
        Err(err) => return GedcomImportResponse::failure(format!("gedcom_import failed: {err}")),
    };
    let graph_json = match serde_json::to_string(&outcome.graph) {
        Ok(json) => json,
        Err(err) => return GedcomImportResponse::failure(format!("gedcom_import failed: {err}")),
    };

    let report = outcome.report;
    GedcomImportResponse {
        ok: true,
        message: format!(
            "Imported {} individual(s) and {} family(ies).",
            outcome.graph.individuals.len(),
            outcome.graph.families.len()
        ),
        graph_json: Some(graph_json),
        individual_count: saturating_u32(outcome.graph.individuals.len()),
        family_count: saturating_u32(outcome.graph.families.len()),
        skipped_lines: saturating_u32(report.skipped_lines),
        dangling_references: saturating_u32(report.dangling_references),
    }
}

/// Exports a JSON record graph as GEDCOM text for the Dart side to save.
///
/// Input semantics:
/// - `graph_json`: graph in the shape returned by [`gedcom_import`].
/// - `exported_at_epoch_ms`: fixed header timestamp; `None` uses now.
///
/// # FFI contract
/// - Sync call, CPU-bound, no I/O.
/// - Never panics; failures are reported with `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn gedcom_export(graph_json: String, exported_at_epoch_ms: Option<i64>) -> GedcomExportResponse {
    let graph = match serde_json::from_str::<RecordGraph>(&graph_json) {
        Ok(graph) => graph,
        Err(err) => return export_failure(format!("gedcom_export invalid graph: {err}")),
    };

    let mut export_options = ExportOptions::default();
    if let Some(epoch_ms) = exported_at_epoch_ms {
        match DateTime::from_timestamp_millis(epoch_ms) {
            Some(exported_at) => export_options.exported_at = Some(exported_at),
            None => {
                return export_failure(format!(
                    "gedcom_export invalid timestamp: {epoch_ms}"
                ))
            }
        }
    }

    let service = GedcomService::new(ImportOptions::default(), export_options);
    match service.export(&graph) {
        Ok(text) => GedcomExportResponse {
            ok: true,
            message: format!("Exported {} line(s).", text.lines().count()),
            text,
        },
        Err(err) => export_failure(format!("gedcom_export failed: {err}")),
    }
}

fn export_failure(message: String) -> GedcomExportResponse {
    warn!("event=ffi_call module=ffi call=gedcom_export status=error");
    GedcomExportResponse {
        ok: false,
        message,
        text: String::new(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
