//! Multi-cursor housekeeping: rotate which cursor is primary, or drop it.

use mcx_core::host::{RevealType, TextEditor};

use super::{Command, CommandRegistry, Invocation, make};
use crate::emulator::Emulator;
use crate::error::Result;

pub const ROTATE_PRIMARY_CURSOR_NEXT: &str = "rotatePrimaryCursorNext";
pub const ROTATE_PRIMARY_CURSOR_PREV: &str = "rotatePrimaryCursorPrev";
pub const DELETE_PRIMARY_CURSOR: &str = "deletePrimaryCursor";

pub(crate) fn register<E: TextEditor>(registry: &mut CommandRegistry<E>) {
    registry.register(ROTATE_PRIMARY_CURSOR_NEXT, make::<E, RotatePrimaryCursorNext>);
    registry.register(ROTATE_PRIMARY_CURSOR_PREV, make::<E, RotatePrimaryCursorPrev>);
    registry.register(DELETE_PRIMARY_CURSOR, make::<E, DeletePrimaryCursor>);
}

#[derive(Debug, Default)]
pub struct RotatePrimaryCursorNext;

impl<E: TextEditor> Command<E> for RotatePrimaryCursorNext {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        let mut selections = emacs.editor().selections();
        if selections.len() > 1 {
            selections.rotate_left(1);
            emacs.editor_mut().set_selections(selections);
        }
        emacs.reveal_primary_cursor(RevealType::CenterIfOutside);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RotatePrimaryCursorPrev;

impl<E: TextEditor> Command<E> for RotatePrimaryCursorPrev {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        let mut selections = emacs.editor().selections();
        if selections.len() > 1 {
            selections.rotate_right(1);
            emacs.editor_mut().set_selections(selections);
        }
        emacs.reveal_primary_cursor(RevealType::CenterIfOutside);
        Ok(())
    }
}

/// Remove the primary cursor; the next one becomes primary. The last
/// cursor is never removed.
#[derive(Debug, Default)]
pub struct DeletePrimaryCursor;

impl<E: TextEditor> Command<E> for DeletePrimaryCursor {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        let mut selections = emacs.editor().selections();
        if selections.len() > 1 {
            selections.remove(0);
            emacs.editor_mut().set_selections(selections);
        }
        emacs.reveal_primary_cursor(RevealType::CenterIfOutside);
        Ok(())
    }
}
