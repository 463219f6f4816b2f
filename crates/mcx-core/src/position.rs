//! Position, range, and selection types.
//!
//! All coordinates are **0-indexed**. Line 0 is the first line, column 0 is the
//! first character. Columns count Unicode scalar values (chars), not bytes or
//! grapheme clusters, the same unit `ropey` indexes by.
//!
//! A [`Selection`] is what a host editor reports per cursor: an `anchor` that
//! stays put and an `active` end that moves. Marks, regions and kill ranges
//! are all derived from selections, so they share these coordinates.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in a text document: (line, column), both 0-indexed.
///
/// Positions are ordered lexicographically: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// The origin: line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for humans.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open range in a document: `[start, end)`, always `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a range. Panics in debug if `start > end`.
    #[inline]
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.line < end.line || (start.line == end.line && start.col <= end.col),
            "Range::new requires start <= end"
        );
        Self { start, end }
    }

    /// Create a range from two arbitrary positions, swapping if needed.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range at the given position.
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.line == self.end.line && self.start.col == self.end.col
    }

    /// True when the given position falls within `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// True when the two ranges overlap or touch.
    ///
    /// Touching counts: an edit that ends exactly where a selection starts
    /// still intersects it, which is what a host reports for adjacent edits.
    #[inline]
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range({}:{} .. {}:{})",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// One cursor as the host sees it: an anchor plus an active (moving) end.
///
/// The selection is empty when both ends coincide, a plain caret. Unlike
/// [`Range`], a selection keeps its direction: `active` may come before
/// `anchor` when the user selected backwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    #[inline]
    #[must_use]
    pub const fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// An empty selection (a caret) at `pos`.
    #[inline]
    #[must_use]
    pub const fn caret(pos: Position) -> Self {
        Self {
            anchor: pos,
            active: pos,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.anchor.line == self.active.line && self.anchor.col == self.active.col
    }

    /// True when the active end comes before the anchor.
    #[inline]
    #[must_use]
    pub fn is_reversed(self) -> bool {
        self.active < self.anchor
    }

    /// The ordered range covered by this selection.
    #[inline]
    #[must_use]
    pub fn range(self) -> Range {
        Range::ordered(self.anchor, self.active)
    }

    #[inline]
    #[must_use]
    pub fn start(self) -> Position {
        self.range().start
    }

    #[inline]
    #[must_use]
    pub fn end(self) -> Position {
        self.range().end
    }

    /// Collapse to a caret at the active end.
    #[inline]
    #[must_use]
    pub const fn collapsed(self) -> Self {
        Self::caret(self.active)
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sel({}:{} -> {}:{})",
            self.anchor.line, self.anchor.col, self.active.line, self.active.col
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Position -----------------------------------------------------------

    #[test]
    fn position_ordering_different_lines() {
        let a = Position::new(0, 100);
        let b = Position::new(1, 0);
        assert!(a < b);
    }

    #[test]
    fn position_ord_is_consistent() {
        let positions = [
            Position::ZERO,
            Position::new(0, 1),
            Position::new(0, 100),
            Position::new(1, 0),
            Position::new(10, 0),
        ];
        for window in positions.windows(2) {
            assert!(window[0] <= window[1], "{:?} should be <= {:?}", window[0], window[1]);
        }
    }

    #[test]
    fn position_display_is_1_indexed() {
        assert_eq!(format!("{}", Position::new(9, 14)), "10:15");
        assert_eq!(format!("{:?}", Position::new(2, 5)), "Pos(2:5)");
    }

    // -- Range --------------------------------------------------------------

    #[test]
    fn range_ordered_needs_swap() {
        let a = Position::new(5, 0);
        let b = Position::new(2, 3);
        let r = Range::ordered(a, b);
        assert_eq!(r.start, b);
        assert_eq!(r.end, a);
    }

    #[test]
    fn range_contains_excludes_end() {
        let r = Range::new(Position::new(1, 0), Position::new(1, 5));
        assert!(r.contains(Position::new(1, 0)));
        assert!(!r.contains(Position::new(1, 5)));
    }

    #[test]
    fn range_intersects_touching() {
        let a = Range::new(Position::new(0, 0), Position::new(0, 3));
        let b = Range::new(Position::new(0, 3), Position::new(0, 6));
        let c = Range::new(Position::new(0, 4), Position::new(0, 6));
        assert!(a.intersects(b));
        assert!(!a.intersects(c));
        assert!(Range::point(Position::new(0, 2)).intersects(a));
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn caret_is_empty() {
        let s = Selection::caret(Position::new(3, 3));
        assert!(s.is_empty());
        assert!(!s.is_reversed());
    }

    #[test]
    fn reversed_selection_keeps_direction() {
        let s = Selection::new(Position::new(2, 5), Position::new(1, 0));
        assert!(s.is_reversed());
        assert_eq!(s.start(), Position::new(1, 0));
        assert_eq!(s.end(), Position::new(2, 5));
        assert_eq!(s.collapsed(), Selection::caret(Position::new(1, 0)));
    }

    #[test]
    fn selection_debug_format() {
        let s = Selection::new(Position::new(0, 1), Position::new(2, 3));
        assert_eq!(format!("{s:?}"), "Sel(0:1 -> 2:3)");
    }
}
