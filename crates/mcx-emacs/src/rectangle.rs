//! Rectangle mark mode and the rectangle kill/yank commands.
//!
//! In rectangle mode the emulator keeps the real selections (the
//! "natives") to itself and shows the editor a projection: one selection
//! per line between each native's anchor and active end, spanning the
//! same visual columns. Motions move the natives' active ends and the
//! projection is rebuilt after every single step.
//!
//! Columns are visual, so tabs and wide characters line up: a tab advances
//! to the next multiple of [`TAB_WIDTH`] and other characters take their
//! Unicode display width.

use unicode_width::UnicodeWidthChar;

use mcx_core::change::{ContentChange, Gravity, TextEdit};
use mcx_core::host::{ContextValue, Motion, TextEditor, context};
use mcx_core::position::{Position, Range, Selection};

use crate::emulator::Emulator;
use crate::error::Result;
use crate::kill_ring::AppendDirection;
use crate::mark::Mark;

pub const TAB_WIDTH: usize = 4;

/// The selections rectangle mode is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectangleState {
    pub natives: Vec<Selection>,
    /// Visual column each native's active end keeps across line motions.
    goal_columns: Vec<Option<usize>>,
}

impl RectangleState {
    #[must_use]
    pub fn new(natives: Vec<Selection>) -> Self {
        let goal_columns = vec![None; natives.len()];
        Self {
            natives,
            goal_columns,
        }
    }

    pub(crate) fn apply_changes(&mut self, changes: &[ContentChange]) {
        for sel in &mut self.natives {
            for change in changes {
                sel.anchor = change.transform(sel.anchor, Gravity::Right);
                sel.active = change.transform(sel.active, Gravity::Right);
            }
        }
    }
}

fn char_width(ch: char, at: usize) -> usize {
    if ch == '\t' {
        TAB_WIDTH - at % TAB_WIDTH
    } else {
        ch.width().unwrap_or(0)
    }
}

/// Display column of char column `col` in `line`.
#[must_use]
pub fn visual_column(line: &str, col: usize) -> usize {
    line.chars()
        .take(col)
        .fold(0, |acc, ch| acc + char_width(ch, acc))
}

/// First char column whose display column is at least `vcol`, or the line
/// length when the line is too short.
#[must_use]
pub fn column_at_visual(line: &str, vcol: usize) -> usize {
    let mut acc = 0;
    for (idx, ch) in line.chars().enumerate() {
        if acc >= vcol {
            return idx;
        }
        acc += char_width(ch, acc);
    }
    line.chars().count()
}

/// The per-line selections a native selection stands for, ordered from
/// the anchor's line toward the active end's line.
pub fn project<E: TextEditor>(editor: &E, native: Selection) -> Vec<Selection> {
    let anchor_v = visual_column(&editor.line_text(native.anchor.line), native.anchor.col);
    let active_v = visual_column(&editor.line_text(native.active.line), native.active.col);
    let (left, right) = (anchor_v.min(active_v), anchor_v.max(active_v));

    let lines: Vec<usize> = if native.anchor.line <= native.active.line {
        (native.anchor.line..=native.active.line).collect()
    } else {
        (native.active.line..=native.anchor.line).rev().collect()
    };

    lines
        .into_iter()
        .map(|line| {
            let text = editor.line_text(line);
            let start = Position::new(line, column_at_visual(&text, left));
            let end = Position::new(line, column_at_visual(&text, right));
            if active_v >= anchor_v {
                Selection::new(start, end)
            } else {
                Selection::new(end, start)
            }
        })
        .collect()
}

impl<E: TextEditor> Emulator<E> {
    /// Turn rectangle mode on, setting the mark first when it is inactive.
    pub fn enter_rectangle_mode(&mut self) {
        if self.rectangle.is_some() {
            return;
        }
        if !self.is_mark_active() {
            self.push_mark(None, true, true);
            self.editor_mut().show_message("Mark set (rectangle mode)");
        }
        let natives = self.get_region();
        self.rectangle = Some(RectangleState::new(natives));
        self.editor_mut()
            .set_context(context::IN_RECTANGLE_MARK_MODE, ContextValue::Bool(true));
        self.show_rectangle();
    }

    /// Leave rectangle mode, giving the editor back the native selections.
    pub fn exit_rectangle_mode(&mut self) {
        if let Some(state) = self.rectangle.take() {
            self.editor_mut().set_selections(state.natives);
            self.editor_mut()
                .set_context(context::IN_RECTANGLE_MARK_MODE, ContextValue::Bool(false));
        }
    }

    /// Step every native's active end by `motion`, `count` times, one step
    /// at a time. Line motions keep the visual column the active end had
    /// before the first of them, so short lines in between do not pull the
    /// rectangle narrower.
    pub fn move_rectangle(&mut self, motion: Motion, count: usize) {
        let vertical = matches!(motion, Motion::LineDown | Motion::LineUp);
        for _ in 0..count {
            let Some(mut state) = self.rectangle.take() else {
                return;
            };
            for (sel, goal) in state.natives.iter_mut().zip(&mut state.goal_columns) {
                let active = sel.active;
                let moved = self.editor().move_position(active, motion, 1);
                sel.active = if vertical {
                    let vcol = *goal.get_or_insert_with(|| {
                        visual_column(&self.editor().line_text(active.line), active.col)
                    });
                    let text = self.editor().line_text(moved.line);
                    Position::new(moved.line, column_at_visual(&text, vcol))
                } else {
                    *goal = None;
                    moved
                };
            }
            self.rectangle = Some(state);
            self.show_rectangle();
        }
    }

    fn show_rectangle(&mut self) {
        let Some(state) = &self.rectangle else {
            return;
        };
        let projected: Vec<Selection> = state
            .natives
            .iter()
            .flat_map(|&native| project(self.editor(), native))
            .collect();
        self.editor_mut().set_selections(projected);
    }

    /// The rectangle to operate on: the one being shown, or the one the
    /// region spans.
    fn rectangle_ranges(&self) -> Vec<Range> {
        let natives = match &self.rectangle {
            Some(state) => state.natives.clone(),
            None => self.get_region(),
        };
        natives
            .into_iter()
            .flat_map(|native| project(self.editor(), native))
            .map(Selection::range)
            .collect()
    }

    fn save_rectangle(&mut self) -> Option<Vec<Range>> {
        let ranges = self.rectangle_ranges();
        if ranges.is_empty() {
            self.editor_mut().show_message("No mark set in this buffer");
            return None;
        }
        self.killed_rectangle = ranges.iter().map(|&r| self.editor().text(r)).collect();
        Some(ranges)
    }

    /// Put the rectangle's rows in a fresh kill ring entry, one line per
    /// row. Blank rows stay so the lines keep their places.
    fn save_rectangle_rows(&mut self, ranges: &[Range]) -> Result<()> {
        self.kill_yanker.cancel_kill_append();
        if ranges.iter().any(|r| !r.is_empty()) {
            self.copy_ranges(ranges, false, AppendDirection::Forward)?;
        }
        Ok(())
    }

    /// Delete the rectangle, saving its lines for [`yank_rectangle`] and
    /// as a kill ring entry. Leaves the cursor at its top-left corner.
    ///
    /// [`yank_rectangle`]: Self::yank_rectangle
    ///
    /// # Errors
    ///
    /// Same as [`kill`](Self::kill).
    pub fn kill_rectangle(&mut self) -> Result<()> {
        let Some(ranges) = self.save_rectangle() else {
            return Ok(());
        };
        let top_left = ranges.iter().map(|r| r.start).min().unwrap_or(Position::ZERO);

        if self.rectangle.take().is_some() {
            self.editor_mut()
                .set_context(context::IN_RECTANGLE_MARK_MODE, ContextValue::Bool(false));
        }
        self.deactivate_mark(false);
        self.editor_mut().set_selections(vec![Selection::caret(top_left)]);

        self.save_rectangle_rows(&ranges)?;
        let deletions: Vec<Range> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
        if !deletions.is_empty() {
            self.delete_with_retry(&deletions)?;
            self.pump();
        }
        self.editor_mut().set_selections(vec![Selection::caret(top_left)]);
        Ok(())
    }

    /// Save the rectangle without deleting it.
    ///
    /// # Errors
    ///
    /// Same as [`copy`](Self::copy).
    pub fn copy_rectangle_as_kill(&mut self) -> Result<()> {
        let Some(ranges) = self.save_rectangle() else {
            return Ok(());
        };
        self.save_rectangle_rows(&ranges)?;
        self.exit_rectangle_mode();
        self.deactivate_mark(true);
        Ok(())
    }

    /// Insert the saved rectangle with its top-left corner at the cursor.
    ///
    /// Each line goes at the cursor's visual column on successive lines.
    /// Short lines are padded with spaces and missing lines are added at
    /// the end of the document.
    ///
    /// # Errors
    ///
    /// Rejected edits.
    pub fn yank_rectangle(&mut self) -> Result<()> {
        if self.killed_rectangle.is_empty() {
            return Ok(());
        }
        self.deactivate_mark(true);

        let Some(origin) = self.editor().selections().first().map(|s| s.active) else {
            return Ok(());
        };
        let vcol = visual_column(&self.editor().line_text(origin.line), origin.col);

        let needed = origin.line + self.killed_rectangle.len();
        let line_count = self.editor().line_count();
        if needed > line_count {
            let end = self.editor().document_end();
            self.editor_mut()
                .edit(&[TextEdit::insert(end, "\n".repeat(needed - line_count))])?;
            self.pump();
        }

        let mut edits = Vec::with_capacity(self.killed_rectangle.len());
        let mut cursor = origin;
        for (i, fragment) in self.killed_rectangle.iter().enumerate() {
            let line = origin.line + i;
            let text = self.editor().line_text(line);
            let len = text.chars().count();
            let width = visual_column(&text, len);
            let (col, pad) = if width < vcol {
                (len, " ".repeat(vcol - width))
            } else {
                (column_at_visual(&text, vcol), String::new())
            };
            cursor = Position::new(line, col + pad.len() + fragment.chars().count());
            edits.push(TextEdit::insert(Position::new(line, col), format!("{pad}{fragment}")));
        }
        self.editor_mut().edit(&edits)?;
        self.pump();

        self.push_mark(Some(Mark::new(vec![origin])), true, false);
        self.editor_mut().set_selections(vec![Selection::caret(cursor)]);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
