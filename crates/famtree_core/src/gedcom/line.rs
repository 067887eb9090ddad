//! GEDCOM line tokenizer and renderer.
//!
//! # Responsibility
//! - Decompose one physical line into `level [xref] tag [value]`.
//! - Render the same grammar back for the serializer.
//!
//! # Invariants
//! - Blank lines produce no token; malformed lines produce a `LineDefect`.
//! - Values are trimmed, except `CONC`/`CONT` values which only lose the
//!   single delimiter after the tag, so continuation text survives intact
//!   (a carriage return included).

use crate::gedcom::tags;
use std::fmt::{Display, Formatter};

/// One tokenized line. Borrows from the source text; never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub level: u32,
    pub xref: Option<&'a str>,
    pub tag: &'a str,
    pub value: Option<&'a str>,
}

/// Why a non-blank line could not be tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDefect {
    /// First segment is not a non-negative integer.
    InvalidLevel,
    /// Fewer than two segments, or an xref with no tag after it.
    MissingTag,
}

impl Display for LineDefect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel => write!(f, "level is not a non-negative integer"),
            Self::MissingTag => write!(f, "line has no tag"),
        }
    }
}

/// Tokenizes one physical line, given without its line terminator.
///
/// Returns `Ok(None)` for blank lines.
pub fn tokenize_line(line: &str) -> Result<Option<ParsedLine<'_>>, LineDefect> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let (level_token, rest) = next_segment(line).ok_or(LineDefect::MissingTag)?;
    if !level_token.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(LineDefect::InvalidLevel);
    }
    let level = level_token
        .parse::<u32>()
        .map_err(|_| LineDefect::InvalidLevel)?;

    let (second, rest) = next_segment(rest).ok_or(LineDefect::MissingTag)?;
    let (xref, tag, rest) = if is_xref(second) {
        let (tag, rest) = next_segment(rest).ok_or(LineDefect::MissingTag)?;
        (Some(second), tag, rest)
    } else {
        (None, second, rest)
    };

    let value = if tags::is_continuation(tag) {
        rest.strip_prefix([' ', '\t']).unwrap_or(rest)
    } else {
        rest.trim()
    };

    Ok(Some(ParsedLine {
        level,
        xref,
        tag,
        value: (!value.is_empty()).then_some(value),
    }))
}

/// Whether `token` is a cross-reference such as `@I1@`.
pub fn is_xref(token: &str) -> bool {
    token.len() > 2 && token.starts_with('@') && token.ends_with('@')
}

/// Renders one line. An absent or empty value leaves no trailing space.
pub fn render_line(level: u32, xref: Option<&str>, tag: &str, value: Option<&str>) -> String {
    let mut line = level.to_string();
    if let Some(xref) = xref {
        line.push(' ');
        line.push_str(xref);
    }
    line.push(' ');
    line.push_str(tag);
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        line.push(' ');
        line.push_str(value);
    }
    line
}

fn next_segment(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some(input.split_at(end))
}
