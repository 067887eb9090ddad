//! GEDCOM import/export use-case service.
//!
//! # Responsibility
//! - Provide the byte/text entry points the platform gateway calls.
//! - Emit metadata-only diagnostics for every import and export.
//!
//! # Invariants
//! - Service calls hold no state between invocations beyond their options.
//! - Logs carry counts and xref tokens only, never names or note text.
//!
//! # See also
//! - docs/architecture/gedcom.md

use crate::gedcom::{
    parse_bytes, parse_document, write_document, ExportOptions, GedcomResult, ImportOptions,
    ImportOutcome,
};
use crate::model::graph::RecordGraph;
use log::{info, warn};

/// GEDCOM service facade configured with import/export options.
#[derive(Debug, Clone, Default)]
pub struct GedcomService {
    import_options: ImportOptions,
    export_options: ExportOptions,
}

impl GedcomService {
    /// Creates a service with explicit options.
    pub fn new(import_options: ImportOptions, export_options: ExportOptions) -> Self {
        Self {
            import_options,
            export_options,
        }
    }

    /// Imports raw file bytes supplied by the platform gateway.
    ///
    /// # Errors
    /// - Returns `InvalidEncoding` when bytes are not UTF-8.
    /// - In strict mode, returns the first malformed line or dangling reference.
    pub fn import_bytes(&self, bytes: &[u8]) -> GedcomResult<ImportOutcome> {
        log_import(bytes.len(), parse_bytes(bytes, &self.import_options))
    }

    /// Imports already-decoded text.
    pub fn import_text(&self, text: &str) -> GedcomResult<ImportOutcome> {
        log_import(text.len(), parse_document(text, &self.import_options))
    }

    /// Exports a record graph as GEDCOM text.
    pub fn export(&self, graph: &RecordGraph) -> GedcomResult<String> {
        match write_document(graph, &self.export_options) {
            Ok(text) => {
                info!(
                    "event=gedcom_export module=gedcom status=ok individuals={} families={} notes={} bytes={}",
                    graph.individuals.len(),
                    graph.families.len(),
                    graph.distinct_notes().len(),
                    text.len()
                );
                Ok(text)
            }
            Err(err) => {
                warn!(
                    "event=gedcom_export module=gedcom status=error reason={}",
                    err
                );
                Err(err)
            }
        }
    }
}

fn log_import(input_bytes: usize, result: GedcomResult<ImportOutcome>) -> GedcomResult<ImportOutcome> {
    match &result {
        Ok(outcome) => {
            let report = &outcome.report;
            info!(
                "event=gedcom_import module=gedcom status=ok bytes={} individuals={} families={} notes={} lines={} skipped_lines={} ignored_lines={} dangling_references={}",
                input_bytes,
                outcome.graph.individuals.len(),
                outcome.graph.families.len(),
                outcome.graph.distinct_notes().len(),
                report.total_lines,
                report.skipped_lines,
                report.ignored_lines,
                report.dangling_references
            );
        }
        Err(err) => {
            warn!(
                "event=gedcom_import module=gedcom status=error bytes={} reason={}",
                input_bytes, err
            );
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::GedcomService;
    use crate::gedcom::{ExportOptions, GedcomError, ImportOptions};

    #[test]
    fn import_bytes_rejects_invalid_utf8() {
        let service = GedcomService::default();
        let error = service
            .import_bytes(&[0x30, 0x20, 0xff, 0xfe])
            .expect_err("invalid utf-8 must fail");
        assert!(matches!(error, GedcomError::InvalidEncoding(_)));
    }

    #[test]
    fn import_bytes_strips_byte_order_mark() {
        let service = GedcomService::new(ImportOptions::strict(), ExportOptions::default());
        let outcome = service
            .import_bytes("\u{feff}0 HEAD\r\n0 @I1@ INDI\r\n0 TRLR\r\n".as_bytes())
            .expect("bom-prefixed input should import");
        assert_eq!(outcome.graph.individuals.len(), 1);
        assert!(outcome.report.is_clean());
    }
}
