//! Genealogical record model.
//!
//! # Responsibility
//! - Define the entities GEDCOM import produces and export consumes:
//!   individuals, families, events, notes and tags.
//! - Provide identity minting through a caller-owned generator.
//!
//! # Invariants
//! - A `RecordId` is unique within the `IdGenerator` that minted it.
//! - Notes and tags are owned by exactly one individual, family or event.
//! - Individual/family relations are id links, never duplicated objects.
//!
//! # See also
//! - docs/architecture/gedcom.md

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{3,4})\b").expect("valid year regex"));

/// Runtime identity of one record-graph entity.
///
/// Identities are only meaningful inside the graph that carries them; GEDCOM
/// cross-reference tokens are never reused as identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Wraps a raw identity value, e.g. one restored from a UI snapshot.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identity value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic identity source.
///
/// Import constructs one per call and threads it through resolution, so
/// concurrent imports never interleave identity assignment.
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Creates a generator whose first identity is `#1`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Mints the next identity.
    pub fn next_id(&mut self) -> RecordId {
        let id = RecordId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sex code carried by `SEX` lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    /// Maps a GEDCOM `SEX` value. Anything other than `M`/`F` is unknown.
    pub fn from_gedcom(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_uppercase()).as_deref() {
            Some("M") => Self::Male,
            Some("F") => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// GEDCOM `SEX` value for this code.
    pub fn as_gedcom(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }
}

/// Free-form text note.
///
/// Two notes with identical text but different ids are distinct entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: RecordId,
    /// Full text; may contain embedded newlines.
    pub text: String,
}

impl Note {
    pub fn new(id: RecordId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// User label attached to an individual or family (`_TAG` lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: RecordId,
    pub name: String,
}

impl Tag {
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Life event or attribute, e.g. `BIRT`, `MARR`, `OCCU`.
///
/// Empty strings mean "absent"; the serializer skips them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// GEDCOM tag of the event, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload carried on the event line itself (`1 OCCU Farmer`, `1 DEAT Y`).
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Event {
    /// Creates an event marker with no date, place or payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Builder-style date setter.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Builder-style place setter.
    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = place.into();
        self
    }

    pub fn is_kind(&self, tag: &str) -> bool {
        self.kind == tag
    }
}

/// One person in the record graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    pub id: RecordId,
    pub given_name: String,
    pub surname: String,
    pub sex: Sex,
    /// Derived from the first dated `BIRT`; see [`Individual::refresh_derived_years`].
    pub birth_year: Option<i32>,
    /// Derived from the first dated `DEAT`.
    pub death_year: Option<i32>,
    pub events: Vec<Event>,
    pub notes: Vec<Note>,
    pub tags: Vec<Tag>,
}

impl Individual {
    /// Creates an unnamed individual of unknown sex.
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            given_name: String::new(),
            surname: String::new(),
            sex: Sex::Unknown,
            birth_year: None,
            death_year: None,
            events: Vec::new(),
            notes: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Builder-style name setter.
    pub fn with_name(mut self, given_name: impl Into<String>, surname: impl Into<String>) -> Self {
        self.given_name = given_name.into();
        self.surname = surname.into();
        self
    }

    /// Recomputes `birth_year`/`death_year` from the first dated `BIRT`/`DEAT`.
    pub fn refresh_derived_years(&mut self) {
        self.birth_year = first_dated_year(&self.events, "BIRT");
        self.death_year = first_dated_year(&self.events, "DEAT");
    }
}

/// One couple/children unit in the record graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: RecordId,
    pub husband: Option<RecordId>,
    pub wife: Option<RecordId>,
    /// Children in birth-order as listed by `CHIL` lines.
    pub children: Vec<RecordId>,
    /// Derived from the first dated `MARR`.
    pub marriage_year: Option<i32>,
    pub events: Vec<Event>,
    pub notes: Vec<Note>,
    pub tags: Vec<Tag>,
}

impl Family {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            husband: None,
            wife: None,
            children: Vec::new(),
            marriage_year: None,
            events: Vec::new(),
            notes: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Whether `individual` is the husband or the wife of this family.
    pub fn has_spouse(&self, individual: RecordId) -> bool {
        self.husband == Some(individual) || self.wife == Some(individual)
    }

    pub fn has_child(&self, individual: RecordId) -> bool {
        self.children.contains(&individual)
    }

    /// Recomputes `marriage_year` from the first dated `MARR`.
    pub fn refresh_derived_years(&mut self) {
        self.marriage_year = first_dated_year(&self.events, "MARR");
    }
}

/// Year of the first `tag` event that carries a date. Undated markers such
/// as a bare `1 BIRT` are skipped.
fn first_dated_year(events: &[Event], tag: &str) -> Option<i32> {
    events
        .iter()
        .find(|event| event.is_kind(tag) && !event.date.trim().is_empty())
        .and_then(|event| year_from_date(&event.date))
}

/// Extracts the first 3-4 digit year from a GEDCOM date string.
///
/// `"1 JAN 1900"` -> `1900`, `"ABT 850"` -> `850`, `"BET 1900 AND 1910"` -> `1900`.
pub fn year_from_date(date: &str) -> Option<i32> {
    YEAR_RE
        .captures(date)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
