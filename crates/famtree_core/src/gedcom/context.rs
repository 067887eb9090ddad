//! Hierarchical context tracking for the import scan.
//!
//! # Invariants
//! - After `truncate_to(level)`, every frame has a level strictly below
//!   `level`, so the top frame is the nearest open ancestor.
//! - The stack is owned by one scan; nothing outlives the call.

/// One open structural ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub level: u32,
    pub tag: &'a str,
}

/// Stack of open `(level, tag)` frames.
#[derive(Debug, Default)]
pub struct ContextStack<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> ContextStack<'a> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Pops every frame whose level is `>= level`.
    pub fn truncate_to(&mut self, level: u32) {
        while self
            .frames
            .last()
            .is_some_and(|frame| frame.level >= level)
        {
            self.frames.pop();
        }
    }

    pub fn push(&mut self, level: u32, tag: &'a str) {
        self.frames.push(Frame { level, tag });
    }

    /// Nearest open ancestor.
    pub fn current(&self) -> Option<Frame<'a>> {
        self.frames.last().copied()
    }
}
