//! Cross-reference resolution into the final record graph.
//!
//! # Responsibility
//! - Mint runtime identities for every accumulator from one per-call
//!   `IdGenerator`.
//! - Map textual cross-references to those identities and wire individuals
//!   into families and notes into their owners.
//!
//! # Invariants
//! - Unresolvable references are dropped (lenient) or fail the call
//!   (strict); they never create placeholder records.
//! - One note record yields one note identity, shared by all its owners.
//! - Tags are never de-duplicated by name.

use crate::gedcom::assembler::{
    AssembledRecords, EntityAcc, EventAcc, FamilyAcc, IndividualAcc, NoteAcc, NoteRef,
};
use crate::gedcom::{GedcomError, GedcomResult, ImportOptions, ImportReport};
use crate::model::graph::RecordGraph;
use crate::model::record::{Event, Family, IdGenerator, Individual, Note, RecordId, Sex, Tag};
use log::debug;
use std::collections::HashMap;

/// Resolves accumulators into a record graph.
pub fn resolve(
    records: AssembledRecords,
    options: &ImportOptions,
    report: &mut ImportReport,
) -> GedcomResult<RecordGraph> {
    let AssembledRecords {
        metadata,
        individuals,
        families,
        notes,
    } = records;

    let mut ids = IdGenerator::new();
    let individual_ids = individuals
        .iter()
        .map(|_| ids.next_id())
        .collect::<Vec<_>>();
    let family_ids = families.iter().map(|_| ids.next_id()).collect::<Vec<_>>();

    let mut resolver = Resolver {
        ids,
        options,
        report,
        individual_by_xref: index_by_xref(
            individuals.iter().map(|person| person.entity.xref.as_deref()),
            &individual_ids,
        ),
        family_by_xref: index_by_xref(
            families.iter().map(|family| family.entity.xref.as_deref()),
            &(0..families.len()).collect::<Vec<_>>(),
        ),
        note_text: note_texts(notes),
        materialized_notes: HashMap::new(),
    };

    let mut graph = RecordGraph {
        metadata,
        individuals: Vec::with_capacity(individuals.len()),
        families: Vec::with_capacity(families.len()),
    };

    for (family, id) in families.iter().zip(&family_ids) {
        graph.families.push(resolver.family(family, *id)?);
    }
    for (person, id) in individuals.iter().zip(&individual_ids) {
        let individual = resolver.individual(person, *id)?;
        resolver.reconcile_membership(person, &individual, &mut graph.families)?;
        graph.individuals.push(individual);
    }

    Ok(graph)
}

struct Resolver<'a> {
    ids: IdGenerator,
    options: &'a ImportOptions,
    report: &'a mut ImportReport,
    individual_by_xref: HashMap<String, RecordId>,
    family_by_xref: HashMap<String, usize>,
    note_text: HashMap<String, String>,
    materialized_notes: HashMap<String, Note>,
}

impl Resolver<'_> {
    fn individual(&mut self, person: &IndividualAcc, id: RecordId) -> GedcomResult<Individual> {
        let mut individual = Individual::new(id).with_name(&person.given_name, &person.surname);
        individual.sex = person.sex;
        let (events, notes, tags) = self.entity_parts(&person.entity)?;
        individual.events = events;
        individual.notes = notes;
        individual.tags = tags;
        individual.refresh_derived_years();
        Ok(individual)
    }

    fn family(&mut self, family: &FamilyAcc, id: RecordId) -> GedcomResult<Family> {
        let owner = owner_label(&family.entity);
        let mut resolved = Family::new(id);
        resolved.husband = self.spouse(&owner, family.husband.as_deref())?;
        resolved.wife = self.spouse(&owner, family.wife.as_deref())?;
        for child in &family.children {
            if let Some(child_id) = self.lookup_individual(&owner, child)? {
                resolved.children.push(child_id);
            }
        }
        let (events, notes, tags) = self.entity_parts(&family.entity)?;
        resolved.events = events;
        resolved.notes = notes;
        resolved.tags = tags;
        resolved.refresh_derived_years();
        Ok(resolved)
    }

    /// Adds memberships that only the individual's `FAMC`/`FAMS` lines state.
    ///
    /// A `FAMS` back-link fills the slot matching the individual's sex; an
    /// individual of unknown sex takes `HUSB`, then `WIFE`. A taken slot is
    /// never overwritten and the back-link is skipped.
    fn reconcile_membership(
        &mut self,
        person: &IndividualAcc,
        individual: &Individual,
        families: &mut [Family],
    ) -> GedcomResult<()> {
        let owner = owner_label(&person.entity);
        for reference in &person.child_of {
            let Some(index) = self.lookup_family(&owner, reference)? else {
                continue;
            };
            let family = &mut families[index];
            if !family.has_child(individual.id) {
                family.children.push(individual.id);
            }
        }
        for reference in &person.spouse_of {
            let Some(index) = self.lookup_family(&owner, reference)? else {
                continue;
            };
            let family = &mut families[index];
            if family.has_spouse(individual.id) {
                continue;
            }
            let slot = match (individual.sex, family.husband, family.wife) {
                (Sex::Male, None, _) | (Sex::Unknown, None, _) => &mut family.husband,
                (Sex::Female, _, None) | (Sex::Unknown, Some(_), None) => &mut family.wife,
                _ => {
                    debug!(
                        "event=gedcom_backlink_skipped module=gedcom status=skipped owner={} reference={}",
                        owner, reference
                    );
                    continue;
                }
            };
            *slot = Some(individual.id);
        }
        Ok(())
    }

    fn entity_parts(
        &mut self,
        entity: &EntityAcc,
    ) -> GedcomResult<(Vec<Event>, Vec<Note>, Vec<Tag>)> {
        let owner = owner_label(entity);
        let mut events = Vec::with_capacity(entity.events.len());
        for event in &entity.events {
            events.push(self.event(&owner, event)?);
        }
        let notes = self.notes(&owner, &entity.notes)?;
        let tags = entity
            .tags
            .iter()
            .map(|name| Tag::new(self.ids.next_id(), name.as_str()))
            .collect();
        Ok((events, notes, tags))
    }

    fn event(&mut self, owner: &str, event: &EventAcc) -> GedcomResult<Event> {
        let mut resolved = Event::new(event.kind.as_str())
            .with_date(event.date.clone().unwrap_or_default())
            .with_place(event.place.clone().unwrap_or_default());
        resolved.value = event.value.clone().unwrap_or_default();
        resolved.notes = self.notes(owner, &event.notes)?;
        Ok(resolved)
    }

    fn notes(&mut self, owner: &str, references: &[NoteRef]) -> GedcomResult<Vec<Note>> {
        let mut notes = Vec::with_capacity(references.len());
        for reference in references {
            match reference {
                NoteRef::Inline(buffer) => {
                    notes.push(Note::new(self.ids.next_id(), buffer.clone().into_text()));
                }
                NoteRef::Xref(xref) => {
                    if let Some(note) = self.shared_note(owner, xref)? {
                        notes.push(note);
                    }
                }
            }
        }
        Ok(notes)
    }

    /// Materializes a note record on first reference and reuses it afterwards.
    fn shared_note(&mut self, owner: &str, xref: &str) -> GedcomResult<Option<Note>> {
        if let Some(note) = self.materialized_notes.get(xref) {
            return Ok(Some(note.clone()));
        }
        let Some(text) = self.note_text.get(xref) else {
            self.dangling(owner, xref)?;
            return Ok(None);
        };
        let note = Note::new(self.ids.next_id(), text.as_str());
        self.materialized_notes
            .insert(xref.to_string(), note.clone());
        Ok(Some(note))
    }

    fn spouse(&mut self, owner: &str, reference: Option<&str>) -> GedcomResult<Option<RecordId>> {
        match reference {
            Some(reference) => self.lookup_individual(owner, reference),
            None => Ok(None),
        }
    }

    fn lookup_individual(&mut self, owner: &str, reference: &str) -> GedcomResult<Option<RecordId>> {
        match self.individual_by_xref.get(reference) {
            Some(id) => Ok(Some(*id)),
            None => self.dangling(owner, reference).map(|()| None),
        }
    }

    fn lookup_family(&mut self, owner: &str, reference: &str) -> GedcomResult<Option<usize>> {
        match self.family_by_xref.get(reference) {
            Some(index) => Ok(Some(*index)),
            None => self.dangling(owner, reference).map(|()| None),
        }
    }

    fn dangling(&mut self, owner: &str, reference: &str) -> GedcomResult<()> {
        self.report.dangling_references += 1;
        debug!(
            "event=gedcom_reference_dropped module=gedcom status=skipped owner={} reference={}",
            owner, reference
        );
        if self.options.is_strict() {
            return Err(GedcomError::DanglingReference {
                owner: owner.to_string(),
                reference: reference.to_string(),
            });
        }
        Ok(())
    }
}

/// First definition of an xref wins; records without an xref are unreachable.
fn index_by_xref<'x, T: Copy>(
    xrefs: impl Iterator<Item = Option<&'x str>>,
    values: &[T],
) -> HashMap<String, T> {
    let mut map = HashMap::new();
    for (xref, value) in xrefs.zip(values) {
        if let Some(xref) = xref {
            map.entry(xref.to_string()).or_insert(*value);
        }
    }
    map
}

fn note_texts(notes: Vec<NoteAcc>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for note in notes {
        if let Some(xref) = note.xref {
            map.entry(xref).or_insert_with(|| note.text.into_text());
        }
    }
    map
}

/// Identifies an owner in diagnostics without exposing personal data.
fn owner_label(entity: &EntityAcc) -> String {
    entity
        .xref
        .clone()
        .unwrap_or_else(|| format!("line {}", entity.line_number))
}
