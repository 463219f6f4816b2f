//! The boundary between the emulation engine and whatever editor hosts it.
//!
//! The engine never touches a text store directly. Everything goes through
//! [`TextEditor`], which a host implements over its own document model, and
//! [`Clipboard`] for the system clipboard.
//!
//! Hosts report what happened via [`Notification`]s. They are queued by the
//! host and drained by the engine at well-defined points (after each of its
//! own edits, or when the host asks it to catch up), so no callback ever
//! re-enters the engine while it is mid-command.

use thiserror::Error;

use crate::change::{ContentChange, TextEdit};
use crate::position::{Position, Range, Selection};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The document was modified concurrently and the batch was rejected.
    #[error("edit conflicted with a concurrent change")]
    Conflict,
    #[error("position {0} is outside the document")]
    OutOfBounds(Position),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// What caused a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChangeKind {
    Keyboard,
    Mouse,
    /// An editor command or an API call.
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// One edit batch. Changes are listed in descending document order so
    /// that each one's range is valid against the text before any of them.
    DocumentChanged(Vec<ContentChange>),
    SelectionChanged(SelectionChangeKind),
}

// ---------------------------------------------------------------------------
// Motions and view hints
// ---------------------------------------------------------------------------

/// Cursor motions the host knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    CharForward,
    CharBackward,
    LineDown,
    LineUp,
    LineStart,
    LineEnd,
    /// Forward to the end of the next word.
    WordForward,
    /// Backward to the start of the previous word.
    WordBackward,
    /// First non-blank character of the line.
    Indentation,
    BufferStart,
    BufferEnd,
    ParagraphForward,
    ParagraphBackward,
}

/// How to scroll a position into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealType {
    Minimal,
    Center,
    Top,
    /// Center the position only when it is currently off screen.
    CenterIfOutside,
}

/// Values the engine publishes for key-binding conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextValue {
    Bool(bool),
    Number(Option<i32>),
}

/// Context keys published through [`TextEditor::set_context`].
pub mod context {
    pub const IN_MARK_MODE: &str = "inMarkMode";
    pub const IN_RECTANGLE_MARK_MODE: &str = "inRectangleMarkMode";
    pub const PREFIX_ARGUMENT: &str = "prefixArgument";
    pub const PREFIX_ARGUMENT_EXISTS: &str = "prefixArgumentExists";
    pub const ACCEPTING_ARGUMENT: &str = "acceptingArgument";
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A text editor instance the engine can drive.
///
/// The first selection is the primary cursor. Hosts must keep at least one
/// selection at all times.
pub trait TextEditor {
    fn selections(&self) -> Vec<Selection>;
    fn set_selections(&mut self, selections: Vec<Selection>);

    fn text(&self, range: Range) -> String;
    fn line_count(&self) -> usize;
    /// Line content without its line break.
    fn line_text(&self, line: usize) -> String;
    fn line_len(&self, line: usize) -> usize;

    /// Apply a batch of edits atomically. All ranges refer to the document
    /// before the batch. On error nothing is applied.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] when the host rejects the batch.
    fn edit(&mut self, edits: &[TextEdit]) -> Result<(), EditError>;

    /// Where `pos` ends up after applying `motion` `count` times.
    fn move_position(&self, pos: Position, motion: Motion, count: usize) -> Position;

    /// End of the first word after `pos`, or the document end.
    fn word_end_after(&self, pos: Position) -> Position;
    /// Start of the first word before `pos`, or the document start.
    fn word_start_before(&self, pos: Position) -> Position;

    fn reveal(&mut self, pos: Position, how: RevealType);
    /// First and last visible lines, when the host has a viewport.
    fn visible_lines(&self) -> Option<(usize, usize)>;

    fn show_message(&mut self, message: &str);
    fn set_context(&mut self, key: &'static str, value: ContextValue);

    /// Drain everything that happened since the last call.
    fn take_notifications(&mut self) -> Vec<Notification>;

    /// End of the document.
    fn document_end(&self) -> Position {
        let last = self.line_count().saturating_sub(1);
        Position::new(last, self.line_len(last))
    }
}

/// The system clipboard.
pub trait Clipboard {
    /// # Errors
    ///
    /// Returns [`ClipboardError`] when the clipboard cannot be read.
    fn read_text(&self) -> Result<String, ClipboardError>;

    /// # Errors
    ///
    /// Returns [`ClipboardError`] when the clipboard cannot be written.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}
