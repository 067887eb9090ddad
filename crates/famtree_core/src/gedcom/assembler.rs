//! Record assembler for the import scan.
//!
//! # Responsibility
//! - Turn tokenized, context-tracked lines into per-record accumulators keyed
//!   by their textual cross-reference.
//! - Keep the "which record is open" state explicit as a `Cursor` value
//!   returned from every per-line step.
//!
//! # Invariants
//! - A level-0 line always closes the open record before opening the next.
//! - At most one record of any kind is open at a time.
//! - Level-2 `DATE`/`PLAC` only attach to the event opened by their level-1
//!   parent; a `DATE` under `DEAT` never lands on `BIRT`.
//! - The first level-1 `NAME` is the individual's name; later `NAME` lines
//!   and their `GIVN`/`SURN` parts are ignored.

use crate::gedcom::context::{ContextStack, Frame};
use crate::gedcom::line::{is_xref, tokenize_line, ParsedLine};
use crate::gedcom::tags::{self, DATE, NOTE, PLAC};
use crate::gedcom::wrap::ContinuationBuffer;
use crate::gedcom::{GedcomError, GedcomResult, ImportOptions, ImportReport};
use crate::model::graph::GraphMetadata;
use crate::model::record::Sex;
use log::debug;

/// Reference from an owner to note text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteRef {
    /// `NOTE @N1@`: resolved against note records.
    Xref(String),
    /// `NOTE some text`: owned text, extended by nested `CONC`/`CONT`.
    Inline(ContinuationBuffer),
}

/// Event or attribute being collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAcc {
    pub kind: String,
    pub value: Option<String>,
    pub date: Option<String>,
    pub place: Option<String>,
    pub notes: Vec<NoteRef>,
}

impl EventAcc {
    fn new(kind: &str, value: Option<&str>) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.map(str::to_string),
            ..Self::default()
        }
    }
}

/// Parts shared by individual and family accumulators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityAcc {
    pub xref: Option<String>,
    pub line_number: usize,
    pub events: Vec<EventAcc>,
    pub notes: Vec<NoteRef>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndividualAcc {
    pub entity: EntityAcc,
    pub given_name: String,
    pub surname: String,
    pub sex: Sex,
    /// Level-1 `NAME` lines seen so far.
    pub name_count: usize,
    pub child_of: Vec<String>,
    pub spouse_of: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyAcc {
    pub entity: EntityAcc,
    pub husband: Option<String>,
    pub wife: Option<String>,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteAcc {
    pub xref: Option<String>,
    pub text: ContinuationBuffer,
}

/// Everything one scan collected, ready for resolution.
#[derive(Debug, Default)]
pub struct AssembledRecords {
    pub metadata: GraphMetadata,
    pub individuals: Vec<IndividualAcc>,
    pub families: Vec<FamilyAcc>,
    pub notes: Vec<NoteAcc>,
}

/// Open top-level record, by index into `AssembledRecords`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Idle,
    Header,
    Individual(usize),
    Family(usize),
    Note(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Individual(usize),
    Family(usize),
}

/// Note list an inline note was appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NoteSlot {
    owner: Owner,
    event: Option<usize>,
}

/// Inline note still accepting continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenInlineNote {
    level: u32,
    slot: NoteSlot,
    index: usize,
}

#[derive(Debug, Default)]
struct Assembler {
    records: AssembledRecords,
    inline_note: Option<OpenInlineNote>,
}

/// Scans `text` line by line into accumulators.
pub fn assemble(
    text: &str,
    options: &ImportOptions,
    report: &mut ImportReport,
) -> GedcomResult<AssembledRecords> {
    let mut assembler = Assembler::default();
    let mut context = ContextStack::new();
    let mut cursor = Cursor::Idle;

    let crlf = uses_crlf(text);
    for (index, raw) in text.split_terminator('\n').enumerate() {
        let line_number = index + 1;
        report.total_lines += 1;

        let raw = if crlf {
            raw.strip_suffix('\r').unwrap_or(raw)
        } else {
            raw
        };
        let line = match tokenize_line(raw) {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            Err(reason) => {
                report.skipped_lines += 1;
                debug!(
                    "event=gedcom_line_dropped module=gedcom status=skipped line={} reason={}",
                    line_number, reason
                );
                if options.is_strict() {
                    return Err(GedcomError::MalformedLine {
                        line_number,
                        reason,
                    });
                }
                continue;
            }
        };

        context.truncate_to(line.level);
        let (next, consumed) = assembler.step(cursor, &line, context.current(), line_number);
        if !consumed {
            report.ignored_lines += 1;
            debug!(
                "event=gedcom_line_ignored module=gedcom status=skipped line={} tag={}",
                line_number, line.tag
            );
        }
        cursor = next;
        context.push(line.level, line.tag);
    }

    assembler.close();
    Ok(assembler.records)
}

impl Assembler {
    /// Interprets one line under `cursor` and returns the next cursor plus
    /// whether the line was understood.
    fn step(
        &mut self,
        cursor: Cursor,
        line: &ParsedLine<'_>,
        parent: Option<Frame<'_>>,
        line_number: usize,
    ) -> (Cursor, bool) {
        if line.level == 0 {
            self.close();
            return self.open_record(line, line_number);
        }

        if let Some(consumed) = self.continue_inline_note(line) {
            return (cursor, consumed);
        }

        let consumed = match cursor {
            Cursor::Idle => false,
            Cursor::Header => self.header_line(line, parent),
            Cursor::Individual(index) => self.individual_line(index, line, parent),
            Cursor::Family(index) => self.family_line(index, line, parent),
            Cursor::Note(index) => self.note_line(index, line),
        };
        (cursor, consumed)
    }

    fn open_record(&mut self, line: &ParsedLine<'_>, line_number: usize) -> (Cursor, bool) {
        let xref = line.xref.map(str::to_string);
        let entity = EntityAcc {
            xref: xref.clone(),
            line_number,
            ..EntityAcc::default()
        };
        let records = &mut self.records;
        match line.tag {
            tags::HEAD => (Cursor::Header, true),
            tags::INDI => {
                records.individuals.push(IndividualAcc {
                    entity,
                    ..IndividualAcc::default()
                });
                (Cursor::Individual(records.individuals.len() - 1), true)
            }
            tags::FAM => {
                records.families.push(FamilyAcc {
                    entity,
                    ..FamilyAcc::default()
                });
                (Cursor::Family(records.families.len() - 1), true)
            }
            tags::NOTE => {
                records.notes.push(NoteAcc {
                    xref,
                    text: ContinuationBuffer::seeded(line.value),
                });
                (Cursor::Note(records.notes.len() - 1), true)
            }
            tags::TRLR => (Cursor::Idle, true),
            _ => (Cursor::Idle, false),
        }
    }

    /// Ends the open record. Note text already lives in its buffer, so only
    /// pending inline-note state needs dropping.
    fn close(&mut self) {
        self.inline_note = None;
    }

    fn header_line(&mut self, line: &ParsedLine<'_>, parent: Option<Frame<'_>>) -> bool {
        let metadata = &mut self.records.metadata;
        let value = line.value.map(str::to_string);
        match (line.level, parent.map(|frame| frame.tag), line.tag) {
            (1, _, "GEDC") => true,
            (1, _, "CHAR") => {
                metadata.charset = value;
                true
            }
            (1, _, "SOUR") => {
                metadata.source_name = value;
                true
            }
            (2, Some("SOUR"), "NAME") => {
                metadata.source_name = value.or(metadata.source_name.take());
                true
            }
            (2, Some("SOUR"), "VERS") => {
                metadata.source_version = value;
                true
            }
            (2, Some("GEDC"), "VERS") => {
                metadata.gedcom_version = value;
                true
            }
            _ => false,
        }
    }

    fn individual_line(
        &mut self,
        index: usize,
        line: &ParsedLine<'_>,
        parent: Option<Frame<'_>>,
    ) -> bool {
        let owner = Owner::Individual(index);
        let person = &mut self.records.individuals[index];
        let value = line.value.unwrap_or_default();

        if line.level == 1 {
            match line.tag {
                tags::NAME => {
                    person.name_count += 1;
                    if person.name_count > 1 {
                        return false;
                    }
                    let (given, surname) = split_name(value);
                    person.given_name = given;
                    person.surname = surname;
                }
                tags::SEX => person.sex = Sex::from_gedcom(line.value),
                tags::FAMC => push_reference(&mut person.child_of, line.value),
                tags::FAMS => push_reference(&mut person.spouse_of, line.value),
                NOTE => self.open_note(owner, None, line),
                tag if tags::is_individual_event(tag) => {
                    person.entity.events.push(EventAcc::new(tag, line.value));
                }
                tag if tags::is_vendor_tag(tag) => {
                    person.entity.tags.push(tag_name(line).to_string());
                }
                _ => return false,
            }
            return true;
        }

        let Some(parent) = parent.filter(|frame| frame.level == 1 && line.level == 2) else {
            return false;
        };
        match (parent.tag, line.tag) {
            (tags::NAME, tags::GIVN | tags::SURN) if person.name_count > 1 => return false,
            (tags::NAME, tags::GIVN) => person.given_name = value.to_string(),
            (tags::NAME, tags::SURN) => person.surname = value.to_string(),
            (event, NOTE) if tags::is_individual_event(event) => {
                let event_index = person.entity.events.len().checked_sub(1);
                self.open_note(owner, event_index, line);
            }
            (event, DATE | PLAC) if tags::is_individual_event(event) => {
                return apply_event_detail(&mut person.entity.events, line);
            }
            _ => return false,
        }
        true
    }

    fn family_line(
        &mut self,
        index: usize,
        line: &ParsedLine<'_>,
        parent: Option<Frame<'_>>,
    ) -> bool {
        let owner = Owner::Family(index);
        let family = &mut self.records.families[index];

        if line.level == 1 {
            match line.tag {
                tags::HUSB => family.husband = line.value.map(str::to_string),
                tags::WIFE => family.wife = line.value.map(str::to_string),
                tags::CHIL => push_reference(&mut family.children, line.value),
                NOTE => self.open_note(owner, None, line),
                tag if tags::is_family_event(tag) => {
                    family.entity.events.push(EventAcc::new(tag, line.value));
                }
                tag if tags::is_vendor_tag(tag) => {
                    family.entity.tags.push(tag_name(line).to_string());
                }
                _ => return false,
            }
            return true;
        }

        let Some(parent) = parent.filter(|frame| frame.level == 1 && line.level == 2) else {
            return false;
        };
        match (parent.tag, line.tag) {
            (event, NOTE) if tags::is_family_event(event) => {
                let event_index = family.entity.events.len().checked_sub(1);
                self.open_note(owner, event_index, line);
            }
            (event, DATE | PLAC) if tags::is_family_event(event) => {
                return apply_event_detail(&mut family.entity.events, line);
            }
            _ => return false,
        }
        true
    }

    fn note_line(&mut self, index: usize, line: &ParsedLine<'_>) -> bool {
        line.level == 1 && self.records.notes[index].text.push(line.tag, line.value)
    }

    /// Attaches a `NOTE` line to its owner: a cross-reference as-is, anything
    /// else as an inline note that nested continuation lines may extend.
    fn open_note(&mut self, owner: Owner, event: Option<usize>, line: &ParsedLine<'_>) {
        let slot = NoteSlot { owner, event };
        let note = match line.value {
            Some(value) if is_xref(value) => NoteRef::Xref(value.to_string()),
            other => NoteRef::Inline(ContinuationBuffer::seeded(other)),
        };
        let is_inline = matches!(note, NoteRef::Inline(_));
        let Some(notes) = self.notes_mut(slot) else {
            return;
        };
        notes.push(note);
        let index = notes.len() - 1;
        if is_inline {
            self.inline_note = Some(OpenInlineNote {
                level: line.level,
                slot,
                index,
            });
        }
    }

    /// Feeds `CONC`/`CONT` directly below an open inline note into it.
    ///
    /// Returns `None` when the line is not part of the inline note.
    fn continue_inline_note(&mut self, line: &ParsedLine<'_>) -> Option<bool> {
        let open = self.inline_note?;
        if line.level <= open.level {
            self.inline_note = None;
            return None;
        }
        if line.level != open.level + 1 || !tags::is_continuation(line.tag) {
            return Some(false);
        }
        match self
            .notes_mut(open.slot)
            .and_then(|notes| notes.get_mut(open.index))
        {
            Some(NoteRef::Inline(buffer)) => Some(buffer.push(line.tag, line.value)),
            _ => Some(false),
        }
    }

    fn notes_mut(&mut self, slot: NoteSlot) -> Option<&mut Vec<NoteRef>> {
        let entity = match slot.owner {
            Owner::Individual(index) => &mut self.records.individuals.get_mut(index)?.entity,
            Owner::Family(index) => &mut self.records.families.get_mut(index)?.entity,
        };
        match slot.event {
            Some(event) => entity.events.get_mut(event).map(|event| &mut event.notes),
            None => Some(&mut entity.notes),
        }
    }
}

/// Whether the first line ends with `\r\n`. In an LF document a carriage
/// return before the newline belongs to the line's value.
fn uses_crlf(text: &str) -> bool {
    text.split_once('\n')
        .is_some_and(|(first, _)| first.ends_with('\r'))
}

/// Splits a GEDCOM `NAME` value (`Given /Surname/ Suffix`) into given name
/// and surname. Text after the closing slash is dropped.
pub fn split_name(value: &str) -> (String, String) {
    let Some((given, rest)) = value.split_once('/') else {
        return (collapse_spaces(value), String::new());
    };
    let surname = rest.split_once('/').map_or(rest, |(surname, _)| surname);
    (collapse_spaces(given), collapse_spaces(surname))
}

fn collapse_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn apply_event_detail(events: &mut [EventAcc], line: &ParsedLine<'_>) -> bool {
    let Some(event) = events.last_mut() else {
        return false;
    };
    let value = line.value.map(str::to_string);
    match line.tag {
        DATE => event.date = value,
        PLAC => event.place = value,
        _ => return false,
    }
    true
}

fn push_reference(references: &mut Vec<String>, value: Option<&str>) {
    if let Some(value) = value {
        references.push(value.to_string());
    }
}

/// Label carried by a vendor tag line: its value, or the tag itself when bare.
fn tag_name<'a>(line: &ParsedLine<'a>) -> &'a str {
    line.value.unwrap_or(line.tag)
}

#[cfg(test)]
mod tests {
    use super::{assemble, split_name, NoteRef};
    use crate::gedcom::{ImportOptions, ImportReport};

    fn scan(text: &str) -> (super::AssembledRecords, ImportReport) {
        let mut report = ImportReport::default();
        let records = assemble(text, &ImportOptions::default(), &mut report).unwrap();
        (records, report)
    }

    #[test]
    fn split_name_follows_slash_convention() {
        assert_eq!(
            split_name("John  Paul /Smith/"),
            ("John Paul".to_string(), "Smith".to_string())
        );
        assert_eq!(split_name("/Smith/ Jr"), (String::new(), "Smith".to_string()));
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(split_name("Ann /Lee"), ("Ann".to_string(), "Lee".to_string()));
    }

    #[test]
    fn dates_attach_to_their_own_event() {
        let (records, _) = scan(
            "0 @I1@ INDI\n1 BIRT\n2 DATE 1 JAN 1900\n2 PLAC Oslo\n1 DEAT\n2 DATE 1 JAN 1980\n",
        );
        let person = &records.individuals[0];
        assert_eq!(person.entity.events.len(), 2);
        assert_eq!(person.entity.events[0].date.as_deref(), Some("1 JAN 1900"));
        assert_eq!(person.entity.events[1].date.as_deref(), Some("1 JAN 1980"));
        assert_eq!(person.entity.events[0].place.as_deref(), Some("Oslo"));
        assert_eq!(person.entity.events[1].place, None);
    }

    #[test]
    fn first_name_wins_over_later_names() {
        let (records, report) = scan(
            "0 @I1@ INDI\n1 NAME Mary /Smith/\n2 GIVN Mary Ann\n1 NAME Mary /Jones/\n2 SURN Jones\n",
        );
        let person = &records.individuals[0];
        assert_eq!(person.given_name, "Mary Ann");
        assert_eq!(person.surname, "Smith");
        assert_eq!(person.name_count, 2);
        assert_eq!(report.ignored_lines, 2);
    }

    #[test]
    fn level_zero_closes_previous_record() {
        let (records, report) = scan(
            "0 @N1@ NOTE first\n1 CONT second\n0 @I1@ INDI\n1 CONC stray\n0 TRLR\n",
        );
        assert_eq!(records.notes.len(), 1);
        assert_eq!(records.notes[0].text.clone().into_text(), "first\nsecond");
        assert_eq!(report.ignored_lines, 1);
    }

    #[test]
    fn inline_notes_collect_nested_continuations() {
        let (records, _) = scan(
            "0 @I1@ INDI\n1 BIRT\n2 NOTE born at\n3 CONC  home\n3 CONT by the sea\n1 NOTE @N7@\n",
        );
        let person = &records.individuals[0];
        match &person.entity.events[0].notes[0] {
            NoteRef::Inline(buffer) => {
                assert_eq!(buffer.clone().into_text(), "born at home\nby the sea");
            }
            other => panic!("expected inline note, got {other:?}"),
        }
        assert_eq!(person.entity.notes, vec![NoteRef::Xref("@N7@".to_string())]);
    }

    #[test]
    fn unknown_records_and_tags_are_ignored_not_fatal() {
        let (records, report) = scan(
            "0 HEAD\n1 GEDC\n2 VERS 5.5.1\n1 SOUR APP\n2 VERS 3\n0 @S1@ SOUR\n1 TITL Census\n0 @F1@ FAM\n1 XYZ what\n1 _TAG blue\n",
        );
        assert_eq!(records.metadata.gedcom_version.as_deref(), Some("5.5.1"));
        assert_eq!(records.metadata.source_name.as_deref(), Some("APP"));
        assert_eq!(records.metadata.source_version.as_deref(), Some("3"));
        assert_eq!(records.families[0].entity.tags, vec!["blue".to_string()]);
        assert_eq!(report.ignored_lines, 3);
    }
}
