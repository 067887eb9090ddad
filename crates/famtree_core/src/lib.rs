//! Core domain logic for FamTree.
//! This crate owns the record-graph model and the GEDCOM engine; callers
//! supply bytes/text and receive graphs, and the reverse.

pub mod gedcom;
pub mod logging;
pub mod model;
pub mod service;

pub use gedcom::{
    export, import, parse_bytes, parse_document, write_document, ExportOptions, GedcomError,
    GedcomResult, ImportOptions, ImportOutcome, ImportReport, ParseMode,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::graph::{GraphMetadata, RecordGraph};
pub use model::record::{Event, Family, IdGenerator, Individual, Note, RecordId, Sex, Tag};
pub use service::gedcom_service::GedcomService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
