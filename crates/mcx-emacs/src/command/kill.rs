//! Kill and yank commands.
//!
//! Kill commands compute one range per cursor and hand them to
//! [`Emulator::kill`], which takes care of append runs and retries.
//! Ranges are clamped to the document first, so `C-u 5 C-k` on the
//! second-to-last line kills through the end of the buffer.

use mcx_core::host::{RevealType, TextEditor};
use mcx_core::position::{Position, Range, Selection};

use super::{Command, CommandRegistry, Invocation, make};
use crate::emulator::Emulator;
use crate::error::Result;
use crate::kill_ring::AppendDirection;

pub const KILL_WORD: &str = "killWord";
pub const BACKWARD_KILL_WORD: &str = "backwardKillWord";
pub const KILL_LINE: &str = "killLine";
pub const KILL_WHOLE_LINE: &str = "killWholeLine";
pub const KILL_REGION: &str = "killRegion";
pub const COPY_REGION: &str = "copyRegion";
pub const YANK: &str = "yank";
pub const YANK_POP: &str = "yank-pop";
pub const KILL_RECTANGLE: &str = "killRectangle";
pub const COPY_RECTANGLE_AS_KILL: &str = "copyRectangleAsKill";
pub const YANK_RECTANGLE: &str = "yankRectangle";

pub(crate) fn register<E: TextEditor>(registry: &mut CommandRegistry<E>) {
    registry.register(KILL_WORD, make::<E, KillWord>);
    registry.register(BACKWARD_KILL_WORD, make::<E, BackwardKillWord>);
    registry.register(KILL_LINE, make::<E, KillLine>);
    registry.register(KILL_WHOLE_LINE, make::<E, KillWholeLine>);
    registry.register(KILL_REGION, make::<E, KillRegion>);
    registry.register(COPY_REGION, make::<E, CopyRegion>);
    registry.register(YANK, make::<E, Yank>);
    registry.register(YANK_POP, make::<E, YankPop>);
    registry.register(KILL_RECTANGLE, make::<E, KillRectangle>);
    registry.register(COPY_RECTANGLE_AS_KILL, make::<E, CopyRectangleAsKill>);
    registry.register(YANK_RECTANGLE, make::<E, YankRectangle>);
}

/// `pos` moved inside the document.
fn clamp<E: TextEditor>(editor: &E, pos: Position) -> Position {
    if pos.line >= editor.line_count() {
        editor.document_end()
    } else {
        Position::new(pos.line, pos.col.min(editor.line_len(pos.line)))
    }
}

/// Start of line `line`, or the document end past the last line.
fn line_start<E: TextEditor>(editor: &E, line: usize) -> Position {
    clamp(editor, Position::new(line, 0))
}

fn word_ends<E: TextEditor>(editor: &E, sel: Selection, count: usize, forward: bool) -> Position {
    (0..count).fold(sel.active, |pos, _| {
        if forward {
            editor.word_end_after(pos)
        } else {
            editor.word_start_before(pos)
        }
    })
}

/// Kill `count` words forward, or backward for a negative count.
fn kill_words<E: TextEditor>(emacs: &mut Emulator<E>, count: i32) -> Result<()> {
    let forward = count >= 0;
    let n = count.unsigned_abs() as usize;
    let ranges = emacs.ranges_from_cursors(|editor, sel| word_ends(editor, sel, n, forward));
    let direction = if forward {
        AppendDirection::Forward
    } else {
        AppendDirection::Backward
    };
    emacs.kill(ranges, direction)?;
    emacs.reveal_primary_cursor(RevealType::Minimal);
    Ok(())
}

/// `M-d`.
#[derive(Debug, Default)]
pub struct KillWord;

impl<E: TextEditor> Command<E> for KillWord {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        kill_words(emacs, inv.repeat())
    }
}

/// `M-DEL`.
#[derive(Debug, Default)]
pub struct BackwardKillWord;

impl<E: TextEditor> Command<E> for BackwardKillWord {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        kill_words(emacs, inv.repeat().saturating_neg())
    }
}

/// `C-k`.
///
/// Without an argument kills to the end of the line, or the newline itself
/// when already there. With `kill-whole-line` set, a cursor at column 0
/// takes the whole line. An argument N kills from the cursor to the start
/// of the Nth line after it; zero or negative counts go backward.
#[derive(Debug, Default)]
pub struct KillLine;

impl<E: TextEditor> Command<E> for KillLine {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        let kill_whole_line = emacs.options().kill_whole_line;
        let prefix = inv.prefix_argument;
        let ranges = emacs.ranges_from_cursors(|editor, sel| {
            let cursor = sel.active;
            if let Some(n) = prefix {
                let line = cursor.line.saturating_add_signed(n as isize);
                return line_start(editor, line);
            }
            let line_end = Position::new(cursor.line, editor.line_len(cursor.line));
            if (kill_whole_line && cursor.col == 0) || cursor == line_end {
                line_start(editor, cursor.line + 1)
            } else {
                line_end
            }
        });
        let direction = match prefix {
            Some(n) if n <= 0 => AppendDirection::Backward,
            _ => AppendDirection::Forward,
        };

        emacs.deactivate_mark(false);
        emacs.kill(ranges, direction)?;
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

/// `C-S-backspace`: the cursor's line including its newline.
#[derive(Debug, Default)]
pub struct KillWholeLine;

impl<E: TextEditor> Command<E> for KillWholeLine {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        let editor = emacs.editor();
        let ranges: Vec<Range> = editor
            .selections()
            .iter()
            .map(|sel| {
                Range::new(
                    Position::new(sel.active.line, 0),
                    line_start(editor, sel.active.line + 1),
                )
            })
            .collect();
        emacs.deactivate_mark(false);
        emacs.kill(ranges, AppendDirection::Forward)?;
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

fn region_ranges<E: TextEditor>(emacs: &Emulator<E>) -> Vec<Range> {
    emacs
        .get_region()
        .into_iter()
        .map(Selection::range)
        .filter(|r| !r.is_empty())
        .collect()
}

/// `C-w`. In rectangle mode kills the rectangle.
#[derive(Debug, Default)]
pub struct KillRegion;

impl<E: TextEditor> Command<E> for KillRegion {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        if emacs.is_in_rectangle_mode() {
            return emacs.kill_rectangle();
        }
        let ranges = region_ranges(emacs);
        emacs.kill(ranges, AppendDirection::Forward)?;
        emacs.deactivate_mark(true);
        emacs.kill_yanker.cancel_kill_append();
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

/// `M-w`. In rectangle mode copies the rectangle.
#[derive(Debug, Default)]
pub struct CopyRegion;

impl<E: TextEditor> Command<E> for CopyRegion {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        if emacs.is_in_rectangle_mode() {
            return emacs.copy_rectangle_as_kill();
        }
        let ranges = region_ranges(emacs);
        emacs.copy(&ranges)?;
        emacs.deactivate_mark(true);
        emacs.kill_yanker.cancel_kill_append();
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

/// `C-y`.
#[derive(Debug, Default)]
pub struct Yank;

impl<E: TextEditor> Command<E> for Yank {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        emacs.yank()?;
        emacs.deactivate_mark(false);
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

/// `M-y`.
///
/// Right after a yank, replaces the yanked text with the next older kill.
/// Otherwise an index argument (as listed by
/// [`KillRing::labels`](crate::kill_ring::KillRing::labels)) yanks that
/// entry.
#[derive(Debug, Default)]
pub struct YankPop;

impl<E: TextEditor> Command<E> for YankPop {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        let after_yank = !emacs.kill_yanker().doc_changed_after_yank()
            && emacs.last_command() == Some(YANK);
        let picked = inv.args.first().and_then(|arg| arg.parse::<usize>().ok());

        match picked {
            Some(index) if !after_yank && emacs.kill_ring().is_some() => {
                emacs.yank_from_ring(index)?;
            }
            _ => emacs.yank_pop()?,
        }
        emacs.deactivate_mark(false);
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

/// `C-x r k`.
#[derive(Debug, Default)]
pub struct KillRectangle;

impl<E: TextEditor> Command<E> for KillRectangle {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        emacs.kill_rectangle()
    }
}

/// `C-x r M-w`.
#[derive(Debug, Default)]
pub struct CopyRectangleAsKill;

impl<E: TextEditor> Command<E> for CopyRectangleAsKill {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        emacs.copy_rectangle_as_kill()
    }
}

/// `C-x r y`.
#[derive(Debug, Default)]
pub struct YankRectangle;

impl<E: TextEditor> Command<E> for YankRectangle {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        emacs.yank_rectangle()?;
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
