//! Mark commands: `C-SPC`, `C-u C-SPC`, `C-x C-x` and `C-x SPC`.

use mcx_core::host::{RevealType, TextEditor};

use super::{Command, CommandRegistry, Invocation, make};
use crate::emulator::Emulator;
use crate::error::Result;

pub const SET_MARK_COMMAND: &str = "setMarkCommand";
pub const POP_MARK: &str = "popMark";
pub const EXCHANGE_POINT_AND_MARK: &str = "exchangePointAndMark";
pub const RECTANGLE_MARK_MODE: &str = "rectangleMarkMode";

pub(crate) fn register<E: TextEditor>(registry: &mut CommandRegistry<E>) {
    registry.register(SET_MARK_COMMAND, make::<E, SetMarkCommand>);
    registry.register(POP_MARK, make::<E, PopMark>);
    registry.register(EXCHANGE_POINT_AND_MARK, make::<E, ExchangePointAndMark>);
    registry.register(RECTANGLE_MARK_MODE, make::<E, RectangleMarkMode>);
}

/// Set the mark at the cursors and activate it.
///
/// With a single `C-u`, or right after popping, pops instead. Repeating the
/// command toggles the existing mark without pushing a new one.
#[derive(Debug, Default)]
pub struct SetMarkCommand;

impl<E: TextEditor> Command<E> for SetMarkCommand {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        if inv.single_universal || emacs.last_command() == Some(POP_MARK) {
            return emacs.run_command(POP_MARK, &[]);
        }
        if emacs.last_command() == Some(SET_MARK_COMMAND) {
            if emacs.is_mark_active() {
                emacs.deactivate_mark(true);
                emacs.editor_mut().show_message("Mark deactivated");
            } else {
                emacs.activate_mark(false);
            }
            return Ok(());
        }
        emacs.deactivate_mark(true);
        emacs.push_mark(None, false, true);
        Ok(())
    }
}

/// Jump to the mark and rotate the mark ring.
#[derive(Debug, Default)]
pub struct PopMark;

impl<E: TextEditor> Command<E> for PopMark {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        emacs.deactivate_mark(true);
        let Some(mark) = emacs.mark().cloned() else {
            emacs.editor_mut().show_message("No mark set in this buffer");
            return Ok(());
        };
        let selections = mark.to_cursor(Some(&emacs.editor().selections()));
        emacs.editor_mut().set_selections(selections);
        emacs.reveal_primary_cursor(RevealType::Minimal);
        emacs.pop_mark();
        Ok(())
    }
}

/// Swap point and mark. A single `C-u` activates the mark first.
#[derive(Debug, Default)]
pub struct ExchangePointAndMark;

impl<E: TextEditor> Command<E> for ExchangePointAndMark {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        if inv.single_universal && emacs.mark().is_some() {
            emacs.activate_mark(true);
        }
        emacs.exchange_point_and_mark();
        Ok(())
    }
}

/// Toggle rectangle mark mode.
#[derive(Debug, Default)]
pub struct RectangleMarkMode;

impl<E: TextEditor> Command<E> for RectangleMarkMode {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        if emacs.is_in_rectangle_mode() {
            emacs.deactivate_mark(true);
        } else {
            emacs.enter_rectangle_mode();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
