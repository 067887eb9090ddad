//! Record graph container and relational queries.
//!
//! # Responsibility
//! - Hold the individuals and families exchanged with callers.
//! - Answer "which families is this person in" by scanning families, never
//!   through cached back-references.
//!
//! # Invariants
//! - List order is significant; export follows it.
//! - Notes reachable from several owners are the same entity when they share
//!   an id.

use crate::model::record::{Family, Individual, Note, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Header facts read from (or written to) the `HEAD` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub gedcom_version: Option<String>,
    pub charset: Option<String>,
    pub source_name: Option<String>,
    pub source_version: Option<String>,
}

/// In-memory family tree handed to and from the GEDCOM engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordGraph {
    #[serde(default)]
    pub metadata: GraphMetadata,
    pub individuals: Vec<Individual>,
    pub families: Vec<Family>,
}

impl RecordGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Families listing `individual` as a child, in family list order.
    pub fn families_as_child(&self, individual: RecordId) -> impl Iterator<Item = &Family> {
        self.families
            .iter()
            .filter(move |family| family.has_child(individual))
    }

    /// Families listing `individual` as husband or wife, in family list order.
    pub fn families_as_spouse(&self, individual: RecordId) -> impl Iterator<Item = &Family> {
        self.families
            .iter()
            .filter(move |family| family.has_spouse(individual))
    }

    /// Every note reachable from an individual or family, de-duplicated by id.
    ///
    /// Order is first-seen: per individual its event notes then its own notes,
    /// then the same per family.
    pub fn distinct_notes(&self) -> Vec<&Note> {
        let mut seen = HashSet::new();
        let mut notes = Vec::new();
        let owners = self
            .individuals
            .iter()
            .map(|person| (&person.events, &person.notes))
            .chain(
                self.families
                    .iter()
                    .map(|family| (&family.events, &family.notes)),
            );

        for (events, own_notes) in owners {
            let event_notes = events.iter().flat_map(|event| event.notes.iter());
            for note in event_notes.chain(own_notes.iter()) {
                if seen.insert(note.id) {
                    notes.push(note);
                }
            }
        }
        notes
    }
}
