//! Document edits and the changes they report.
//!
//! A [`TextEdit`] is a request: replace `range` (in the pre-edit document)
//! with `text`. A [`ContentChange`] is the host's report of one replacement
//! that actually happened. They carry the same data; the split keeps the
//! direction of flow readable at call sites.
//!
//! Positions that live across edits (marks, selections, a pending yank
//! anchor) are carried forward with [`ContentChange::transform`], which comes
//! in two gravities:
//!
//! - [`Gravity::Left`]: a position at the edit start stays put. Marks use
//!   this, so inserting at the mark leaves the mark before the new text.
//! - [`Gravity::Right`]: a position at the edit end moves with the inserted
//!   text. Cursors use this, so typing advances the cursor.

use crate::position::{Position, Range};

/// A single replacement to apply to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub text: String,
}

impl TextEdit {
    #[must_use]
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn insert(pos: Position, text: impl Into<String>) -> Self {
        Self::replace(Range::point(pos), text)
    }

    #[must_use]
    pub fn delete(range: Range) -> Self {
        Self::replace(range, String::new())
    }
}

/// Which way a position leans when an edit touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Left,
    Right,
}

/// One replacement reported by the host after it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    /// The replaced range, in coordinates from before the change.
    pub range: Range,
    pub text: String,
}

impl ContentChange {
    #[must_use]
    pub fn new(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    /// Carry `pos` across this change.
    ///
    /// Positions before the change are untouched. Positions inside the
    /// replaced range collapse to its start. Positions after it shift by the
    /// line and column delta of the replacement.
    #[must_use]
    pub fn transform(&self, pos: Position, gravity: Gravity) -> Position {
        let Range { start, end } = self.range;
        let before = match gravity {
            Gravity::Left => pos <= start,
            Gravity::Right => pos < start,
        };
        if before {
            return pos;
        }
        if pos < end {
            return start;
        }
        self.shift_after_end(pos)
    }

    /// Where the end of the inserted text lands.
    #[must_use]
    pub fn inserted_end(&self) -> Position {
        let (extra_lines, last_len) = text_extent(&self.text);
        if extra_lines == 0 {
            Position::new(self.range.start.line, self.range.start.col + last_len)
        } else {
            Position::new(self.range.start.line + extra_lines, last_len)
        }
    }

    fn shift_after_end(&self, pos: Position) -> Position {
        let end = self.range.end;
        let new_end = self.inserted_end();
        let line = pos.line - end.line + new_end.line;
        if pos.line == end.line {
            Position::new(line, new_end.col + (pos.col - end.col))
        } else {
            Position::new(line, pos.col)
        }
    }
}

/// Number of line breaks in `text` and the char length of its last line.
#[must_use]
pub fn text_extent(text: &str) -> (usize, usize) {
    let mut lines = 0;
    let mut last = 0;
    for ch in text.chars() {
        if ch == '\n' {
            lines += 1;
            last = 0;
        } else {
            last += 1;
        }
    }
    (lines, last)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn change(a: Position, b: Position, text: &str) -> ContentChange {
        ContentChange::new(Range::new(a, b), text)
    }

    #[test]
    fn insert_at_position_respects_gravity() {
        let c = change(p(0, 3), p(0, 3), "xy");
        assert_eq!(c.transform(p(0, 3), Gravity::Left), p(0, 3));
        assert_eq!(c.transform(p(0, 3), Gravity::Right), p(0, 5));
    }

    #[test]
    fn position_before_change_untouched() {
        let c = change(p(2, 0), p(3, 1), "");
        assert_eq!(c.transform(p(1, 9), Gravity::Left), p(1, 9));
        assert_eq!(c.transform(p(1, 9), Gravity::Right), p(1, 9));
    }

    #[test]
    fn position_inside_deletion_collapses() {
        let c = change(p(0, 2), p(1, 4), "");
        assert_eq!(c.transform(p(1, 0), Gravity::Left), p(0, 2));
        assert_eq!(c.transform(p(0, 5), Gravity::Right), p(0, 2));
    }

    #[test]
    fn same_line_after_multiline_delete() {
        // "ab|cd\nef|gh" -> delete between the bars; "h" was at (1, 3).
        let c = change(p(0, 2), p(1, 2), "");
        assert_eq!(c.transform(p(1, 3), Gravity::Left), p(0, 3));
    }

    #[test]
    fn later_line_shifts_by_line_delta() {
        let c = change(p(0, 1), p(0, 1), "a\nb\nc");
        assert_eq!(c.transform(p(4, 7), Gravity::Left), p(6, 7));
    }

    #[test]
    fn same_line_after_multiline_insert_uses_last_line_length() {
        // Insert "xx\nyyy" at (0, 4); a position at (0, 6) follows "yyy".
        let c = change(p(0, 4), p(0, 4), "xx\nyyy");
        assert_eq!(c.transform(p(0, 6), Gravity::Left), p(1, 5));
    }

    #[test]
    fn replacement_shifts_trailing_column() {
        // "abcdefg" -> "aZefg"; "g" moves from 6 to 4.
        let c = change(p(0, 1), p(0, 4), "Z");
        assert_eq!(c.transform(p(0, 6), Gravity::Left), p(0, 4));
    }

    #[test]
    fn extent_counts_lines_and_tail() {
        assert_eq!(text_extent(""), (0, 0));
        assert_eq!(text_extent("abc"), (0, 3));
        assert_eq!(text_extent("ab\n"), (1, 0));
        assert_eq!(text_extent("a\nbcd"), (1, 3));
    }
}
