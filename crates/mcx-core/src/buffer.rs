//! Text buffer: the document store behind [`MemoryEditor`](crate::memory::MemoryEditor).
//!
//! A `Buffer` wraps a [`ropey::Rope`] with (line, col) addressing and a
//! batch edit operation that reports what changed. Line endings are
//! normalized to `\n` on load so that every column is a content column:
//! a valid position has `col <= line_content_len(line)`.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use ropey::Rope;

use crate::change::{ContentChange, TextEdit};
use crate::host::EditError;
use crate::position::{Position, Range};

pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a buffer from a string. `\r\n` and lone `\r` become `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&normalize_line_endings(text)),
        }
    }

    /// Load a buffer from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid UTF-8.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Total number of lines. An empty buffer has 1 line, and a buffer
    /// ending with `\n` has a trailing empty line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of chars in a line, excluding the trailing `\n`.
    /// Returns `None` if the line doesn't exist.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> Option<usize> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let rope_line = self.rope.line(line);
        let total = rope_line.len_chars();
        if total > 0 && rope_line.char(total - 1) == '\n' {
            Some(total - 1)
        } else {
            Some(total)
        }
    }

    /// Line content without its line break, or an empty string past the end.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        let Some(len) = self.line_content_len(line) else {
            return String::new();
        };
        self.rope.line(line).slice(..len).to_string()
    }

    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let idx = self.pos_to_char_idx(pos)?;
        (idx < self.rope.len_chars()).then(|| self.rope.char(idx))
    }

    /// Text in `range`, clamping both ends into the buffer.
    #[must_use]
    pub fn text(&self, range: Range) -> String {
        let start = self.clamped_char_idx(range.start);
        let end = self.clamped_char_idx(range.end);
        self.rope.slice(start..end.max(start)).to_string()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Absolute char index of a position, or `None` when the position is
    /// past the end of its line or the line doesn't exist.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        let len = self.line_content_len(pos.line)?;
        if pos.col > len {
            return None;
        }
        Some(self.rope.line_to_char(pos.line) + pos.col)
    }

    #[must_use]
    pub fn char_idx_to_pos(&self, char_idx: usize) -> Option<Position> {
        if char_idx > self.rope.len_chars() {
            return None;
        }
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        Some(Position::new(line, char_idx - line_start))
    }

    /// Clamp a position to the nearest valid position in the buffer.
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        let max_col = self.line_content_len(line).unwrap_or(0);
        Position::new(line, pos.col.min(max_col))
    }

    fn clamped_char_idx(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    /// End of the buffer.
    #[must_use]
    pub fn end(&self) -> Position {
        let last = self.line_count().saturating_sub(1);
        Position::new(last, self.line_content_len(last).unwrap_or(0))
    }

    // -- Editing ------------------------------------------------------------

    /// Apply a batch of edits whose ranges all refer to the current text.
    ///
    /// Edits are applied from the bottom of the document up, so earlier
    /// ranges stay valid while later ones are replaced. The returned changes
    /// are in that same descending order.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfBounds`] if any endpoint is invalid, and
    /// [`EditError::Conflict`] if two edits overlap. Nothing is applied in
    /// either case.
    pub fn apply(&mut self, edits: &[TextEdit]) -> Result<Vec<ContentChange>, EditError> {
        let mut resolved = Vec::with_capacity(edits.len());
        for edit in edits {
            let start = self
                .pos_to_char_idx(edit.range.start)
                .ok_or(EditError::OutOfBounds(edit.range.start))?;
            let end = self
                .pos_to_char_idx(edit.range.end)
                .ok_or(EditError::OutOfBounds(edit.range.end))?;
            resolved.push((start, end, edit));
        }
        resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        for pair in resolved.windows(2) {
            let (later, earlier) = (&pair[0], &pair[1]);
            if earlier.1 > later.0 {
                return Err(EditError::Conflict);
            }
        }

        let mut changes = Vec::with_capacity(resolved.len());
        for (start, end, edit) in resolved {
            if start == end && edit.text.is_empty() {
                continue;
            }
            self.rope.remove(start..end);
            self.rope.insert(start, &edit.text);
            changes.push(ContentChange::new(edit.range, edit.text.clone()));
        }
        Ok(changes)
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .finish()
    }
}

/// Turn `\r\n` and lone `\r` into `\n`.
fn normalize_line_endings(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\r' {
            result.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
