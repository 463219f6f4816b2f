//! `C-l`: cycle the cursor line through the center, top and bottom of the
//! view.

use mcx_core::host::{RevealType, TextEditor};
use mcx_core::position::Position;
use tracing::trace;

use super::{Command, CommandRegistry, Interruptible, Invocation, make};
use crate::emulator::Emulator;
use crate::error::Result;

pub const RECENTER_TOP_BOTTOM: &str = "recenterTopBottom";

pub(crate) fn register<E: TextEditor>(registry: &mut CommandRegistry<E>) {
    registry.register_interruptible(RECENTER_TOP_BOTTOM, make::<E, RecenterTopBottom>);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Placement {
    #[default]
    Center,
    Top,
    Bottom,
}

/// Each consecutive `C-l` moves on to the next placement. Any other
/// command in between, or an outside change, starts over at the center.
#[derive(Debug, Default)]
pub struct RecenterTopBottom {
    next: Placement,
}

impl<E: TextEditor> Command<E> for RecenterTopBottom {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        if emacs.last_command() != Some(RECENTER_TOP_BOTTOM) {
            self.next = Placement::Center;
        }
        let Some(active) = emacs.editor().selections().first().map(|s| s.active) else {
            return Ok(());
        };
        trace!(placement = ?self.next, "recenter");

        match self.next {
            Placement::Center => {
                emacs.editor_mut().reveal(active, RevealType::Center);
                self.next = Placement::Top;
            }
            Placement::Top => {
                emacs.editor_mut().reveal(active, RevealType::Top);
                self.next = Placement::Bottom;
            }
            Placement::Bottom => {
                // No host reveal puts a line at the bottom, so scroll the
                // line one screen above it to the top instead.
                let Some((first, last)) = emacs.editor().visible_lines() else {
                    return Ok(());
                };
                let height = last.saturating_sub(first);
                let top = Position::new(active.line.saturating_sub(height), 0);
                emacs.editor_mut().reveal(top, RevealType::Top);
                self.next = Placement::Center;
            }
        }
        Ok(())
    }

    fn as_interruptible(&mut self) -> Option<&mut dyn Interruptible> {
        Some(self)
    }
}

impl Interruptible for RecenterTopBottom {
    fn on_interrupted(&mut self) {
        self.next = Placement::Center;
    }
}
