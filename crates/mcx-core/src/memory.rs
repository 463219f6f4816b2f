//! An in-memory [`TextEditor`] and [`Clipboard`].
//!
//! `MemoryEditor` is a complete host over a [`Buffer`]: it applies edit
//! batches, keeps selections in step with the text, queues notifications,
//! and records messages, context keys and scroll requests so they can be
//! inspected. The headless driver runs on it, and so do the tests.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::buffer::Buffer;
use crate::change::{Gravity, TextEdit};
use crate::host::{
    Clipboard, ClipboardError, ContextValue, EditError, Motion, Notification, RevealType,
    SelectionChangeKind, TextEditor,
};
use crate::motion;
use crate::position::{Position, Range, Selection};
use crate::word;

#[derive(Debug)]
pub struct MemoryEditor {
    buffer: Buffer,
    selections: Vec<Selection>,
    pending: Vec<Notification>,
    messages: Vec<String>,
    contexts: HashMap<&'static str, ContextValue>,
    revealed: Option<(Position, RevealType)>,
    viewport: Option<(usize, usize)>,
    fail_next_edits: usize,
}

impl MemoryEditor {
    /// A new editor over `text` with a single caret at the start.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self::with_buffer(Buffer::from_text(text))
    }

    #[must_use]
    pub fn with_buffer(buffer: Buffer) -> Self {
        Self {
            buffer,
            selections: vec![Selection::caret(Position::ZERO)],
            pending: Vec::new(),
            messages: Vec::new(),
            contexts: HashMap::new(),
            revealed: None,
            viewport: None,
            fail_next_edits: 0,
        }
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.contents()
    }

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Every message shown so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    #[must_use]
    pub fn context(&self, key: &str) -> Option<ContextValue> {
        self.contexts.get(key).copied()
    }

    /// The last reveal request.
    #[must_use]
    pub const fn revealed(&self) -> Option<(Position, RevealType)> {
        self.revealed
    }

    pub const fn set_viewport(&mut self, first: usize, last: usize) {
        self.viewport = Some((first, last));
    }

    /// Reject the next `n` edit batches with [`EditError::Conflict`].
    pub const fn fail_next_edits(&mut self, n: usize) {
        self.fail_next_edits = n;
    }

    /// Replace the selections as if the user did it, tagged with `kind`.
    ///
    /// This is how a test or the driver simulates a mouse drag or an
    /// arrow-key move that the engine did not initiate.
    pub fn select_as_user(&mut self, selections: Vec<Selection>, kind: SelectionChangeKind) {
        let selections = self.clamp_selections(selections);
        if selections != self.selections {
            self.selections = selections;
            self.pending.push(Notification::SelectionChanged(kind));
        }
    }

    /// Apply edits as if the user typed them, outside any engine command.
    ///
    /// # Errors
    ///
    /// Same as [`TextEditor::edit`].
    pub fn edit_as_user(&mut self, edits: &[TextEdit]) -> Result<(), EditError> {
        self.apply(edits)
    }

    fn apply(&mut self, edits: &[TextEdit]) -> Result<(), EditError> {
        if self.fail_next_edits > 0 {
            self.fail_next_edits -= 1;
            trace!(remaining = self.fail_next_edits, "rejecting edit batch");
            return Err(EditError::Conflict);
        }
        let changes = self.buffer.apply(edits)?;
        if changes.is_empty() {
            return Ok(());
        }

        let before = self.selections.clone();
        for sel in &mut self.selections {
            for change in &changes {
                sel.anchor = change.transform(sel.anchor, Gravity::Right);
                sel.active = change.transform(sel.active, Gravity::Right);
            }
        }
        self.pending.push(Notification::DocumentChanged(changes));
        if self.selections != before {
            self.pending
                .push(Notification::SelectionChanged(SelectionChangeKind::Command));
        }
        Ok(())
    }

    fn clamp_selections(&self, selections: Vec<Selection>) -> Vec<Selection> {
        if selections.is_empty() {
            return self.selections.clone();
        }
        selections
            .into_iter()
            .map(|s| {
                Selection::new(
                    self.buffer.clamp_position(s.anchor),
                    self.buffer.clamp_position(s.active),
                )
            })
            .collect()
    }
}

impl TextEditor for MemoryEditor {
    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        self.select_as_user(selections, SelectionChangeKind::Command);
    }

    fn text(&self, range: Range) -> String {
        self.buffer.text(range)
    }

    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn line_text(&self, line: usize) -> String {
        self.buffer.line_text(line)
    }

    fn line_len(&self, line: usize) -> usize {
        self.buffer.line_content_len(line).unwrap_or(0)
    }

    fn edit(&mut self, edits: &[TextEdit]) -> Result<(), EditError> {
        self.apply(edits)
    }

    fn move_position(&self, pos: Position, motion: Motion, count: usize) -> Position {
        motion::apply(&self.buffer, pos, motion, count)
    }

    fn word_end_after(&self, pos: Position) -> Position {
        word::word_end_after(&self.buffer, pos)
    }

    fn word_start_before(&self, pos: Position) -> Position {
        word::word_start_before(&self.buffer, pos)
    }

    fn reveal(&mut self, pos: Position, how: RevealType) {
        self.revealed = Some((pos, how));
    }

    fn visible_lines(&self) -> Option<(usize, usize)> {
        self.viewport
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }

    fn set_context(&mut self, key: &'static str, value: ContextValue) {
        self.contexts.insert(key, value);
    }

    fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    fn document_end(&self) -> Position {
        self.buffer.end()
    }
}

/// A clipboard that lives in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: RefCell<String>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            text: RefCell::new(text.to_owned()),
        }
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.text.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        Ok(self.text.borrow().clone())
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        text.clone_into(&mut self.text.borrow_mut());
        Ok(())
    }
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

    #[test]
    fn insert_at_cursor_moves_cursor() {
        let mut ed = MemoryEditor::new("abc");
        ed.set_selections(vec![Selection::caret(p(0, 1))]);
        ed.take_notifications();

        ed.edit(&[TextEdit::insert(p(0, 1), "XY")]).unwrap();
        assert_eq!(ed.contents(), "aXYbc");
        assert_eq!(ed.selections(), vec![Selection::caret(p(0, 3))]);

        let notes = ed.take_notifications();
        assert!(matches!(notes[0], Notification::DocumentChanged(_)));
        assert_eq!(
            notes[1],
            Notification::SelectionChanged(SelectionChangeKind::Command)
        );
    }

    #[test]
    fn multi_cursor_deletes_keep_cursors_in_place() {
        let mut ed = MemoryEditor::new("0123\nabcd");
        ed.set_selections(vec![
            Selection::new(p(0, 0), p(0, 2)),
            Selection::new(p(1, 0), p(1, 2)),
        ]);
        ed.edit(&[
            TextEdit::delete(Range::new(p(0, 0), p(0, 2))),
            TextEdit::delete(Range::new(p(1, 0), p(1, 2))),
        ])
        .unwrap();
        assert_eq!(ed.contents(), "23\ncd");
        assert_eq!(
            ed.selections(),
            vec![Selection::caret(p(0, 0)), Selection::caret(p(1, 0))]
        );
    }

    #[test]
    fn set_selections_notifies_only_on_change() {
        let mut ed = MemoryEditor::new("abc");
        ed.set_selections(vec![Selection::caret(Position::ZERO)]);
        assert!(ed.take_notifications().is_empty());
        ed.set_selections(vec![Selection::caret(p(0, 2))]);
        assert_eq!(ed.take_notifications().len(), 1);
    }

    #[test]
    fn selections_are_clamped() {
        let mut ed = MemoryEditor::new("ab\ncd");
        ed.set_selections(vec![Selection::caret(p(7, 7))]);
        assert_eq!(ed.selections(), vec![Selection::caret(p(1, 2))]);
    }

    #[test]
    fn failed_edits_leave_text_alone() {
        let mut ed = MemoryEditor::new("abc");
        ed.fail_next_edits(1);
        assert_eq!(
            ed.edit(&[TextEdit::insert(p(0, 0), "x")]),
            Err(EditError::Conflict)
        );
        assert_eq!(ed.contents(), "abc");
        ed.edit(&[TextEdit::insert(p(0, 0), "x")]).unwrap();
        assert_eq!(ed.contents(), "xabc");
    }

    #[test]
    fn clipboard_round_trip() {
        let cb = MemoryClipboard::new("start");
        assert_eq!(cb.read_text().unwrap(), "start");
        cb.write_text("next").unwrap();
        assert_eq!(cb.contents(), "next");
    }
}
