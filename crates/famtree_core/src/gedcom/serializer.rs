//! GEDCOM 5.5.5 serializer.
//!
//! # Responsibility
//! - Render a `RecordGraph` in fixed order: header, individuals, families,
//!   note records, trailer.
//!
//! # Invariants
//! - Cross-reference tokens are assigned per call in list order
//!   (`@I1@`, `@F1@`, `@N1@`, ...).
//! - `FAMC`/`FAMS` lines are derived by scanning families.
//! - Notes reachable from several owners are written once, keyed by id.
//! - Links to individuals missing from the graph are skipped.

use crate::gedcom::line::render_line;
use crate::gedcom::tags::{
    self, CHIL, DATE, FAM, FAMC, FAMS, GIVN, HUSB, INDI, NAME, NOTE, PLAC, SEX, SURN, USER_TAG,
    WIFE,
};
use crate::gedcom::wrap::wrap_text;
use crate::gedcom::{ExportOptions, GedcomResult, GEDCOM_VERSION};
use crate::model::graph::RecordGraph;
use crate::model::record::{Event, Individual, Note, RecordId, Tag};
use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use std::fmt::Write;

/// Renders `graph` as GEDCOM text with `\n` line endings.
pub fn serialize(graph: &RecordGraph, options: &ExportOptions) -> GedcomResult<String> {
    let xrefs = XrefTable::build(graph);
    let mut writer = GedcomWriter::default();

    write_header(&mut writer, options)?;
    for person in &graph.individuals {
        write_individual(&mut writer, graph, &xrefs, person)?;
    }
    for family in &graph.families {
        let family_xref = xrefs.family(family.id);
        writer.line(0, family_xref, FAM, None)?;
        let spouses = [(HUSB, family.husband), (WIFE, family.wife)];
        for (tag, spouse) in spouses {
            if let Some(spouse) = spouse {
                writer.reference(1, tag, xrefs.individual(spouse), family_xref)?;
            }
        }
        for child in &family.children {
            writer.reference(1, CHIL, xrefs.individual(*child), family_xref)?;
        }
        write_events(&mut writer, &xrefs, &family.events)?;
        write_notes_and_tags(&mut writer, &xrefs, &family.notes, &family.tags)?;
    }
    for note in graph.distinct_notes() {
        writer.line(0, xrefs.note(note.id), NOTE, None)?;
        for line in wrap_text(1, &note.text) {
            writer.raw(&line)?;
        }
    }
    writer.line(0, None, tags::TRLR, None)?;

    Ok(writer.out)
}

/// Per-call mapping from identities to cross-reference tokens.
struct XrefTable {
    individuals: HashMap<RecordId, String>,
    families: HashMap<RecordId, String>,
    notes: HashMap<RecordId, String>,
}

impl XrefTable {
    fn build(graph: &RecordGraph) -> Self {
        Self {
            individuals: assign_tokens('I', graph.individuals.iter().map(|person| person.id)),
            families: assign_tokens('F', graph.families.iter().map(|family| family.id)),
            notes: assign_tokens('N', graph.distinct_notes().iter().map(|note| note.id)),
        }
    }

    fn individual(&self, id: RecordId) -> Option<&str> {
        self.individuals.get(&id).map(String::as_str)
    }

    fn family(&self, id: RecordId) -> Option<&str> {
        self.families.get(&id).map(String::as_str)
    }

    fn note(&self, id: RecordId) -> Option<&str> {
        self.notes.get(&id).map(String::as_str)
    }
}

fn assign_tokens(prefix: char, ids: impl Iterator<Item = RecordId>) -> HashMap<RecordId, String> {
    let mut tokens = HashMap::new();
    for id in ids {
        let next = tokens.len() + 1;
        tokens
            .entry(id)
            .or_insert_with(|| format!("@{prefix}{next}@"));
    }
    tokens
}

#[derive(Debug, Default)]
struct GedcomWriter {
    out: String,
}

impl GedcomWriter {
    /// Writes one line; single-line values have embedded line breaks flattened.
    fn line(
        &mut self,
        level: u32,
        xref: Option<&str>,
        tag: &str,
        value: Option<&str>,
    ) -> GedcomResult<()> {
        let value = value.map(flatten);
        self.raw(&render_line(level, xref, tag, value.as_deref()))
    }

    /// Writes a pointer line such as `1 FAMC @F1@`, skipping unknown targets.
    fn reference(
        &mut self,
        level: u32,
        tag: &str,
        target: Option<&str>,
        owner: Option<&str>,
    ) -> GedcomResult<()> {
        match target {
            Some(target) => self.line(level, None, tag, Some(target)),
            None => {
                debug!(
                    "event=gedcom_export_link_skipped module=gedcom status=skipped owner={} tag={}",
                    owner.unwrap_or("?"),
                    tag
                );
                Ok(())
            }
        }
    }

    fn raw(&mut self, line: &str) -> GedcomResult<()> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

fn write_header(writer: &mut GedcomWriter, options: &ExportOptions) -> GedcomResult<()> {
    let exported_at = options.exported_at.unwrap_or_else(Utc::now);
    let date = exported_at.format("%-d %b %Y").to_string().to_ascii_uppercase();
    let time = exported_at.format("%H:%M:%S").to_string();

    writer.line(0, None, tags::HEAD, None)?;
    writer.line(1, None, "GEDC", None)?;
    writer.line(2, None, "VERS", Some(GEDCOM_VERSION))?;
    writer.line(2, None, "FORM", Some("LINEAGE-LINKED"))?;
    writer.line(3, None, "VERS", Some(GEDCOM_VERSION))?;
    writer.line(1, None, "CHAR", Some("UTF-8"))?;
    writer.line(1, None, "SOUR", Some(options.source_name.as_str()))?;
    writer.line(2, None, NAME, Some(options.source_name.as_str()))?;
    writer.line(2, None, "VERS", Some(options.source_version.as_str()))?;
    writer.line(1, None, DATE, Some(date.as_str()))?;
    writer.line(2, None, "TIME", Some(time.as_str()))?;
    Ok(())
}

fn write_individual(
    writer: &mut GedcomWriter,
    graph: &RecordGraph,
    xrefs: &XrefTable,
    person: &Individual,
) -> GedcomResult<()> {
    let person_xref = xrefs.individual(person.id);
    writer.line(0, person_xref, INDI, None)?;

    let given = person.given_name.trim();
    let surname = person.surname.trim();
    if !given.is_empty() || !surname.is_empty() {
        writer.line(1, None, NAME, Some(render_name(given, surname).as_str()))?;
        if !surname.is_empty() {
            writer.line(2, None, SURN, Some(surname))?;
        }
        if !given.is_empty() {
            writer.line(2, None, GIVN, Some(given))?;
        }
    }
    writer.line(1, None, SEX, Some(person.sex.as_gedcom()))?;
    write_events(writer, xrefs, &person.events)?;

    for family in graph.families_as_child(person.id) {
        writer.reference(1, FAMC, xrefs.family(family.id), person_xref)?;
    }
    for family in graph.families_as_spouse(person.id) {
        writer.reference(1, FAMS, xrefs.family(family.id), person_xref)?;
    }
    write_notes_and_tags(writer, xrefs, &person.notes, &person.tags)
}

fn write_events(writer: &mut GedcomWriter, xrefs: &XrefTable, events: &[Event]) -> GedcomResult<()> {
    for event in events.iter().filter(|event| !event.kind.trim().is_empty()) {
        writer.line(1, None, &event.kind, Some(event.value.as_str()))?;
        if !event.date.is_empty() {
            writer.line(2, None, DATE, Some(event.date.as_str()))?;
        }
        if !event.place.is_empty() {
            writer.line(2, None, PLAC, Some(event.place.as_str()))?;
        }
        for note in &event.notes {
            writer.line(2, None, NOTE, xrefs.note(note.id))?;
        }
    }
    Ok(())
}

fn write_notes_and_tags(
    writer: &mut GedcomWriter,
    xrefs: &XrefTable,
    notes: &[Note],
    tags: &[Tag],
) -> GedcomResult<()> {
    for note in notes {
        writer.line(1, None, NOTE, xrefs.note(note.id))?;
    }
    for tag in tags {
        writer.line(1, None, USER_TAG, Some(tag.name.as_str()))?;
    }
    Ok(())
}

/// `Given /Surname/`, the GEDCOM personal-name convention.
fn render_name(given: &str, surname: &str) -> String {
    if given.is_empty() {
        format!("/{surname}/")
    } else {
        format!("{given} /{surname}/")
    }
}

fn flatten(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
