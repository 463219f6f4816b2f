//! Plain editing commands: `C-d`, `DEL` and `RET`.

use mcx_core::change::TextEdit;
use mcx_core::host::{Motion, RevealType, TextEditor};
use mcx_core::position::{Range, Selection};

use super::{Command, CommandRegistry, Invocation, make};
use crate::emulator::Emulator;
use crate::error::Result;

pub const DELETE_BACKWARD_CHAR: &str = "deleteBackwardChar";
pub const DELETE_FORWARD_CHAR: &str = "deleteForwardChar";
pub const NEW_LINE: &str = "newLine";

pub(crate) fn register<E: TextEditor>(registry: &mut CommandRegistry<E>) {
    registry.register(DELETE_BACKWARD_CHAR, make::<E, DeleteBackwardChar>);
    registry.register(DELETE_FORWARD_CHAR, make::<E, DeleteForwardChar>);
    registry.register(NEW_LINE, make::<E, NewLine>);
}

/// Delete the selections if any is non-empty, otherwise `count` chars at
/// every cursor (backward for a negative count). One edit batch.
fn delete_chars<E: TextEditor>(emacs: &mut Emulator<E>, count: i32) -> Result<()> {
    let ranges: Vec<Range> = if emacs.is_region_active() {
        emacs
            .editor()
            .selections()
            .into_iter()
            .map(Selection::range)
            .filter(|r| !r.is_empty())
            .collect()
    } else {
        let motion = if count < 0 {
            Motion::CharBackward
        } else {
            Motion::CharForward
        };
        let n = count.unsigned_abs() as usize;
        emacs.ranges_from_cursors(|editor, sel| editor.move_position(sel.active, motion, n))
    };

    if !ranges.is_empty() {
        let edits: Vec<TextEdit> = ranges.into_iter().map(TextEdit::delete).collect();
        emacs.editor_mut().edit(&edits)?;
    }
    emacs.deactivate_mark(true);
    emacs.reveal_primary_cursor(RevealType::Minimal);
    Ok(())
}

#[derive(Debug, Default)]
pub struct DeleteBackwardChar;

impl<E: TextEditor> Command<E> for DeleteBackwardChar {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        delete_chars(emacs, inv.repeat().saturating_neg())
    }
}

#[derive(Debug, Default)]
pub struct DeleteForwardChar;

impl<E: TextEditor> Command<E> for DeleteForwardChar {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        delete_chars(emacs, inv.repeat())
    }
}

/// Insert `count` newlines at every cursor, dropping the mark and region
/// first.
#[derive(Debug, Default)]
pub struct NewLine;

impl<E: TextEditor> Command<E> for NewLine {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        emacs.deactivate_mark(true);
        emacs.deactivate_region();

        let count = usize::try_from(inv.repeat()).unwrap_or(0);
        if count == 0 {
            return Ok(());
        }
        let text = "\n".repeat(count);
        let edits: Vec<TextEdit> = emacs
            .editor()
            .selections()
            .into_iter()
            .map(|sel| TextEdit::insert(sel.active, text.clone()))
            .collect();
        emacs.editor_mut().edit(&edits)?;
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
