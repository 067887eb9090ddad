//! Use-case services over the GEDCOM engine.
//!
//! # Responsibility
//! - Expose stable import/export entry points for the FFI gateway.
//! - Attach diagnostics without leaking personal data into logs.

pub mod gedcom_service;
