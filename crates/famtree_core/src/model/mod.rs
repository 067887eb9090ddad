//! Record-graph domain model.
//!
//! # Responsibility
//! - Define the individuals, families, events, notes and tags exchanged
//!   with the GEDCOM engine.
//!
//! # Invariants
//! - Every entity carries a `RecordId` minted by an `IdGenerator`.
//! - Relations between individuals and families are id links.
//!
//! # See also
//! - docs/architecture/gedcom.md

pub mod graph;
pub mod record;
