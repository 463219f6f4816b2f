//! Marks and the mark ring.
//!
//! A [`Mark`] is one saved position per cursor. It is captured from either
//! end of each selection and can be turned back into selections: as carets
//! ([`Mark::to_cursor`]) or as anchors with the current active points kept
//! ([`Mark::to_anchor`]), which is how a region is re-expanded.
//!
//! The [`MarkRing`] is a bounded ring with one rotation pointer. Popping
//! rotates; it never removes anything.

use mcx_core::change::{ContentChange, Gravity};
use mcx_core::position::{Position, Selection};

use crate::options::DEFAULT_MARK_RING_MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    positions: Vec<Position>,
}

impl Mark {
    #[must_use]
    pub const fn new(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Capture each selection's anchor.
    #[must_use]
    pub fn from_anchor(selections: &[Selection]) -> Self {
        Self::new(selections.iter().map(|s| s.anchor).collect())
    }

    /// Capture each selection's active end.
    #[must_use]
    pub fn from_cursor(selections: &[Selection]) -> Self {
        Self::new(selections.iter().map(|s| s.active).collect())
    }

    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Carets at the marked positions.
    ///
    /// Given the current selections, the result keeps their count: each one
    /// with a marked counterpart becomes a caret there, the rest are kept.
    #[must_use]
    pub fn to_cursor(&self, selections: Option<&[Selection]>) -> Vec<Selection> {
        match selections {
            None => self.positions.iter().copied().map(Selection::caret).collect(),
            Some(sels) => sels
                .iter()
                .enumerate()
                .map(|(i, sel)| self.positions.get(i).map_or(*sel, |&p| Selection::caret(p)))
                .collect(),
        }
    }

    /// Selections anchored at the marked positions, active ends unchanged.
    #[must_use]
    pub fn to_anchor(&self, selections: &[Selection]) -> Vec<Selection> {
        selections
            .iter()
            .enumerate()
            .map(|(i, sel)| {
                self.positions
                    .get(i)
                    .map_or(*sel, |&p| Selection::new(p, sel.active))
            })
            .collect()
    }

    /// Carry every position across `change`. Positions inside a replaced
    /// range collapse to its start.
    pub fn transform(&mut self, change: &ContentChange) {
        for pos in &mut self.positions {
            *pos = change.transform(*pos, Gravity::Left);
        }
    }

    /// Carry every position across a batch reported in descending order.
    pub fn apply_changes(&mut self, changes: &[ContentChange]) {
        for change in changes {
            self.transform(change);
        }
    }
}

// ── Mark ring ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MarkRing {
    max: usize,
    ring: Vec<Mark>,
    pointer: usize,
}

impl MarkRing {
    /// A ring holding at most `max` marks (at least one).
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            max: max.max(1),
            ring: Vec::new(),
            pointer: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[must_use]
    pub const fn pointer(&self) -> usize {
        self.pointer
    }

    /// Save `mark`.
    ///
    /// Unless `force` is set, pushing a mark equal to the current top does
    /// nothing. With `replace` the entry under the pointer is overwritten;
    /// otherwise the mark goes in front, the pointer resets to it and the
    /// oldest entry is evicted once the ring is full.
    pub fn push(&mut self, mark: Mark, replace: bool, force: bool) {
        let Some(top) = self.top() else {
            self.ring = vec![mark];
            self.pointer = 0;
            return;
        };
        if !force && *top == mark {
            return;
        }
        if replace {
            self.ring[self.pointer] = mark;
        } else {
            self.ring.insert(0, mark);
            self.pointer = 0;
            self.ring.truncate(self.max);
        }
    }

    /// The mark under the pointer.
    #[must_use]
    pub fn top(&self) -> Option<&Mark> {
        self.ring.get(self.pointer)
    }

    /// Return the mark under the pointer and rotate past it.
    pub fn pop(&mut self) -> Option<Mark> {
        let mark = self.ring.get(self.pointer).cloned()?;
        self.pointer = (self.pointer + 1) % self.ring.len();
        Some(mark)
    }

    /// Carry every saved mark across a batch of changes.
    pub fn apply_changes(&mut self, changes: &[ContentChange]) {
        for mark in &mut self.ring {
            mark.apply_changes(changes);
        }
    }
}

impl Default for MarkRing {
    fn default() -> Self {
        Self::new(DEFAULT_MARK_RING_MAX)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
