//! `CONC`/`CONT` continuation encoding and decoding.
//!
//! # Responsibility
//! - Split free text into continuation lines that respect the per-line
//!   value limit.
//! - Rebuild text from continuation lines for the assembler.
//!
//! # Invariants
//! - Decoding the encoded lines reproduces the text, including empty text,
//!   blank lines and leading/trailing newlines. A `\r\n` pair is one line
//!   break and decodes as `\n`; a lone `\r` is content.
//! - Empty text encodes to exactly one bare `CONT` line.
//! - A chunk followed by another chunk never ends with `\r`.
//! - A `CONT` before any content starts the text without a line break.

use crate::gedcom::line::render_line;
use crate::gedcom::tags::{CONC, CONT};

/// Maximum characters carried in one continuation value.
pub const MAX_VALUE_CHARS: usize = 248;

/// Encodes `text` as continuation lines rendered at `level`.
pub fn wrap_text(level: u32, text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![render_line(level, None, CONT, None)];
    }

    let segments = text.split('\n').collect::<Vec<_>>();
    let last = segments.len() - 1;
    let mut lines = Vec::new();
    for (index, segment) in segments.into_iter().enumerate() {
        let physical = if index < last {
            segment.strip_suffix('\r').unwrap_or(segment)
        } else {
            segment
        };
        let chunks = split_chars(physical, MAX_VALUE_CHARS);
        let mut chunks = chunks.into_iter();

        // The first physical line continues the record's inline value, so it
        // never opens with CONT. An empty first chunk still marks the start.
        let head_tag = if index == 0 { CONC } else { CONT };
        lines.push(render_line(level, None, head_tag, chunks.next()));
        lines.extend(chunks.map(|chunk| render_line(level, None, CONC, Some(chunk))));
    }
    lines
}

/// Text being rebuilt from continuation lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationBuffer {
    text: String,
    started: bool,
}

impl ContinuationBuffer {
    /// Starts a buffer from the value on the owning `NOTE` line, if any.
    pub fn seeded(initial: Option<&str>) -> Self {
        match initial {
            Some(value) => Self {
                text: value.to_string(),
                started: true,
            },
            None => Self::default(),
        }
    }

    /// `CONC`: append without a separator.
    pub fn push_conc(&mut self, value: Option<&str>) {
        self.text.push_str(value.unwrap_or_default());
        self.started = true;
    }

    /// `CONT`: append a newline, then the value.
    pub fn push_cont(&mut self, value: Option<&str>) {
        if self.started {
            self.text.push('\n');
        }
        self.text.push_str(value.unwrap_or_default());
        self.started = true;
    }

    /// Routes a continuation line by tag. Returns `false` for other tags.
    pub fn push(&mut self, tag: &str, value: Option<&str>) -> bool {
        match tag {
            CONC => self.push_conc(value),
            CONT => self.push_cont(value),
            _ => return false,
        }
        true
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

fn split_chars(line: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(offset, _)| offset)
            .unwrap_or(rest.len());
        let mut end = end;
        if end < rest.len() {
            // A value ending in CR would read back as a CRLF terminator.
            let kept = rest[..end].trim_end_matches('\r').len();
            if kept > 0 {
                end = kept;
            }
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}
