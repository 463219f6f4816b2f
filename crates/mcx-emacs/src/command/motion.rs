//! Cursor motion commands.
//!
//! With the mark active a motion extends every selection instead of
//! moving a caret. In rectangle mode the rectangle's corners move instead,
//! one step at a time. A negative prefix argument reverses direction.

use mcx_core::host::{Motion, RevealType, TextEditor};
use mcx_core::position::{Position, Selection};

use super::{Command, CommandRegistry, Invocation, make};
use crate::emulator::Emulator;
use crate::error::Result;

pub const FORWARD_CHAR: &str = "forwardChar";
pub const BACKWARD_CHAR: &str = "backwardChar";
pub const NEXT_LINE: &str = "nextLine";
pub const PREVIOUS_LINE: &str = "previousLine";
pub const MOVE_BEGINNING_OF_LINE: &str = "moveBeginningOfLine";
pub const MOVE_END_OF_LINE: &str = "moveEndOfLine";
pub const FORWARD_WORD: &str = "forwardWord";
pub const BACKWARD_WORD: &str = "backwardWord";
pub const BACK_TO_INDENTATION: &str = "backToIndentation";
pub const BEGINNING_OF_BUFFER: &str = "beginningOfBuffer";
pub const END_OF_BUFFER: &str = "endOfBuffer";
pub const FORWARD_PARAGRAPH: &str = "forwardParagraph";
pub const BACKWARD_PARAGRAPH: &str = "backwardParagraph";
pub const SCROLL_UP_COMMAND: &str = "scrollUpCommand";
pub const SCROLL_DOWN_COMMAND: &str = "scrollDownCommand";

pub(crate) fn register<E: TextEditor>(registry: &mut CommandRegistry<E>) {
    registry.register(FORWARD_CHAR, make::<E, ForwardChar>);
    registry.register(BACKWARD_CHAR, make::<E, BackwardChar>);
    registry.register(NEXT_LINE, make::<E, NextLine>);
    registry.register(PREVIOUS_LINE, make::<E, PreviousLine>);
    registry.register(MOVE_BEGINNING_OF_LINE, make::<E, MoveBeginningOfLine>);
    registry.register(MOVE_END_OF_LINE, make::<E, MoveEndOfLine>);
    registry.register(FORWARD_WORD, make::<E, ForwardWord>);
    registry.register(BACKWARD_WORD, make::<E, BackwardWord>);
    registry.register(BACK_TO_INDENTATION, make::<E, BackToIndentation>);
    registry.register(BEGINNING_OF_BUFFER, make::<E, BeginningOfBuffer>);
    registry.register(END_OF_BUFFER, make::<E, EndOfBuffer>);
    registry.register(FORWARD_PARAGRAPH, make::<E, ForwardParagraph>);
    registry.register(BACKWARD_PARAGRAPH, make::<E, BackwardParagraph>);
    registry.register(SCROLL_UP_COMMAND, make::<E, ScrollUpCommand>);
    registry.register(SCROLL_DOWN_COMMAND, make::<E, ScrollDownCommand>);
}

// ── Helpers ──────────────────────────────────────────────────

/// Move every cursor to `target(cursor)`, extending when the mark is
/// active.
fn move_each<E: TextEditor>(emacs: &mut Emulator<E>, target: impl Fn(&E, Position) -> Position) {
    let extend = emacs.is_mark_active();
    let editor = emacs.editor();
    let selections = editor
        .selections()
        .into_iter()
        .map(|sel| {
            let active = target(editor, sel.active);
            if extend {
                Selection::new(sel.anchor, active)
            } else {
                Selection::caret(active)
            }
        })
        .collect();
    emacs.editor_mut().set_selections(selections);
}

fn move_cursors<E: TextEditor>(emacs: &mut Emulator<E>, motion: Motion, count: usize) {
    if count == 0 {
        return;
    }
    if emacs.is_in_rectangle_mode() {
        emacs.move_rectangle(motion, count);
    } else {
        move_each(emacs, |editor, pos| editor.move_position(pos, motion, count));
    }
    emacs.reveal_primary_cursor(RevealType::Minimal);
}

/// Split a repeat count into a direction and a distance.
fn directed(repeat: i32, forward: Motion, backward: Motion) -> (Motion, usize) {
    let distance = repeat.unsigned_abs() as usize;
    if repeat < 0 {
        (backward, distance)
    } else {
        (forward, distance)
    }
}

/// Commands that are one motion repeated, with an opposite for negative
/// counts.
macro_rules! directed_motion {
    ($(#[$doc:meta])* $name:ident, $forward:expr, $backward:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name;

        impl<E: TextEditor> Command<E> for $name {
            fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
                let (motion, count) = directed(inv.repeat(), $forward, $backward);
                move_cursors(emacs, motion, count);
                Ok(())
            }
        }
    };
}

directed_motion!(
    /// `C-f`.
    ForwardChar, Motion::CharForward, Motion::CharBackward
);
directed_motion!(
    /// `C-b`.
    BackwardChar, Motion::CharBackward, Motion::CharForward
);
directed_motion!(
    /// `C-n`.
    NextLine, Motion::LineDown, Motion::LineUp
);
directed_motion!(
    /// `C-p`.
    PreviousLine, Motion::LineUp, Motion::LineDown
);
directed_motion!(
    /// `M-f`.
    ForwardWord, Motion::WordForward, Motion::WordBackward
);
directed_motion!(
    /// `M-b`.
    BackwardWord, Motion::WordBackward, Motion::WordForward
);
directed_motion!(
    /// `M-}`.
    ForwardParagraph, Motion::ParagraphForward, Motion::ParagraphBackward
);
directed_motion!(
    /// `M-{`.
    BackwardParagraph, Motion::ParagraphBackward, Motion::ParagraphForward
);

/// Move `repeat - 1` lines first, the way `C-a`/`C-e` treat an argument.
fn line_offset<E: TextEditor>(editor: &E, pos: Position, repeat: i32) -> Position {
    let (motion, count) = directed(repeat - 1, Motion::LineDown, Motion::LineUp);
    if count == 0 {
        pos
    } else {
        editor.move_position(pos, motion, count)
    }
}

/// `C-a`.
///
/// With `strict-emacs-move` set this always goes to column 0. Otherwise it
/// goes to the indentation, or to column 0 when already there.
#[derive(Debug, Default)]
pub struct MoveBeginningOfLine;

impl<E: TextEditor> Command<E> for MoveBeginningOfLine {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        if emacs.is_in_rectangle_mode() {
            move_cursors(emacs, Motion::LineStart, 1);
            return Ok(());
        }
        let strict = emacs.options().strict_emacs_move;
        let repeat = inv.repeat();
        move_each(emacs, |editor, pos| {
            let pos = line_offset(editor, pos, repeat);
            let indentation = editor.move_position(pos, Motion::Indentation, 1);
            if strict || pos == indentation {
                editor.move_position(pos, Motion::LineStart, 1)
            } else {
                indentation
            }
        });
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

/// `C-e`.
#[derive(Debug, Default)]
pub struct MoveEndOfLine;

impl<E: TextEditor> Command<E> for MoveEndOfLine {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        if emacs.is_in_rectangle_mode() {
            move_cursors(emacs, Motion::LineEnd, 1);
            return Ok(());
        }
        let repeat = inv.repeat();
        move_each(emacs, |editor, pos| {
            let pos = line_offset(editor, pos, repeat);
            editor.move_position(pos, Motion::LineEnd, 1)
        });
        emacs.reveal_primary_cursor(RevealType::Minimal);
        Ok(())
    }
}

/// `M-m`.
#[derive(Debug, Default)]
pub struct BackToIndentation;

impl<E: TextEditor> Command<E> for BackToIndentation {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        move_cursors(emacs, Motion::Indentation, 1);
        Ok(())
    }
}

/// `M-<` and `M->` leave the mark behind unless it is already active.
fn move_to_buffer_edge<E: TextEditor>(emacs: &mut Emulator<E>, motion: Motion) {
    if !emacs.is_mark_active() {
        emacs.push_mark(None, false, false);
    }
    move_cursors(emacs, motion, 1);
}

/// `M-<`.
#[derive(Debug, Default)]
pub struct BeginningOfBuffer;

impl<E: TextEditor> Command<E> for BeginningOfBuffer {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        move_to_buffer_edge(emacs, Motion::BufferStart);
        Ok(())
    }
}

/// `M->`.
#[derive(Debug, Default)]
pub struct EndOfBuffer;

impl<E: TextEditor> Command<E> for EndOfBuffer {
    fn execute(&mut self, emacs: &mut Emulator<E>, _inv: &Invocation) -> Result<()> {
        move_to_buffer_edge(emacs, Motion::BufferEnd);
        Ok(())
    }
}

/// Move a screenful, or `repeat` lines when given an argument other than 1.
/// Without a viewport there is no screen to page by.
fn scroll<E: TextEditor>(
    emacs: &mut Emulator<E>,
    repeat: i32,
    forward: Motion,
    backward: Motion,
) {
    if repeat != 1 {
        let (motion, count) = directed(repeat, forward, backward);
        move_cursors(emacs, motion, count);
        return;
    }
    let Some((first, last)) = emacs.editor().visible_lines() else {
        return;
    };
    let page = last.saturating_sub(first).max(1);
    move_cursors(emacs, forward, page);
}

/// `C-v`: the text scrolls up, so the cursor goes down a page.
#[derive(Debug, Default)]
pub struct ScrollUpCommand;

impl<E: TextEditor> Command<E> for ScrollUpCommand {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        scroll(emacs, inv.repeat(), Motion::LineDown, Motion::LineUp);
        Ok(())
    }
}

/// `M-v`.
#[derive(Debug, Default)]
pub struct ScrollDownCommand;

impl<E: TextEditor> Command<E> for ScrollDownCommand {
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()> {
        scroll(emacs, inv.repeat(), Motion::LineUp, Motion::LineDown);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use mcx_core::host::TextEditor;
    use mcx_core::memory::{MemoryClipboard, MemoryEditor};
    use mcx_core::position::{Position, Selection};
    use pretty_assertions::assert_eq;

    use crate::emulator::Emulator;
    use crate::options::Options;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn emulator_with(text: &str, options: Options) -> Emulator<MemoryEditor> {
        Emulator::standalone(
            MemoryEditor::new(text),
            Rc::new(MemoryClipboard::default()),
            options,
        )
    }

    fn emulator(text: &str) -> Emulator<MemoryEditor> {
        emulator_with(text, Options::default())
    }

    fn at(emacs: &mut Emulator<MemoryEditor>, pos: Position) {
        emacs.editor_mut().set_selections(vec![Selection::caret(pos)]);
        emacs.process_notifications();
    }

    fn cursor(emacs: &Emulator<MemoryEditor>) -> Position {
        emacs.editor().selections()[0].active
    }

    #[test]
    fn char_motions_with_counts() {
        let mut emacs = emulator("abcdef");
        emacs.digit_argument(3);
        emacs.run_command("forwardChar", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 3));

        emacs.negative_argument();
        emacs.run_command("forwardChar", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 2));

        emacs.run_command("backwardChar", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 1));
    }

    #[test]
    fn line_motions() {
        let mut emacs = emulator("one\ntwo\nthree");
        at(&mut emacs, p(0, 2));
        emacs.run_command("nextLine", &[]).unwrap();
        emacs.run_command("nextLine", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(2, 2));
        emacs.run_command("previousLine", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(1, 2));
    }

    #[test]
    fn motion_extends_while_mark_is_active() {
        let mut emacs = emulator("hello world");
        emacs.run_command("setMarkCommand", &[]).unwrap();
        emacs.run_command("forwardWord", &[]).unwrap();
        emacs.run_command("forwardWord", &[]).unwrap();
        assert_eq!(
            emacs.editor().selections(),
            vec![Selection::new(p(0, 0), p(0, 11))]
        );
        emacs.run_command("backwardWord", &[]).unwrap();
        assert_eq!(
            emacs.editor().selections(),
            vec![Selection::new(p(0, 0), p(0, 6))]
        );
    }

    #[test]
    fn beginning_of_line_toggles_indentation() {
        let mut emacs = emulator("    indented");
        at(&mut emacs, p(0, 8));
        emacs.run_command("moveBeginningOfLine", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 4));
        emacs.run_command("moveBeginningOfLine", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 0));
    }

    #[test]
    fn strict_beginning_of_line_goes_to_column_zero() {
        let options = Options {
            strict_emacs_move: true,
            ..Options::default()
        };
        let mut emacs = emulator_with("    indented", options);
        at(&mut emacs, p(0, 8));
        emacs.run_command("moveBeginningOfLine", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 0));
    }

    #[test]
    fn end_of_line_with_count_moves_down_first() {
        let mut emacs = emulator("a\nbb\nccc");
        emacs.run_command("moveEndOfLine", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 1));
        emacs.digit_argument(3);
        emacs.run_command("moveEndOfLine", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(2, 3));
    }

    #[test]
    fn back_to_indentation() {
        let mut emacs = emulator("\t  x");
        at(&mut emacs, p(0, 4));
        emacs.run_command("backToIndentation", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 3));
    }

    #[test]
    fn buffer_edges_leave_a_mark() {
        let mut emacs = emulator("one\ntwo\nthree");
        at(&mut emacs, p(1, 1));
        emacs.run_command("endOfBuffer", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(2, 5));
        assert_eq!(emacs.mark().unwrap().positions(), &[p(1, 1)]);
        assert!(!emacs.is_mark_active());

        emacs.run_command("beginningOfBuffer", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 0));
        assert_eq!(emacs.mark().unwrap().positions(), &[p(2, 5)]);
        assert_eq!(emacs.mark_ring().len(), 2);
    }

    #[test]
    fn paragraph_motions() {
        let mut emacs = emulator("a\nb\n\nc\nd");
        emacs.run_command("forwardParagraph", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(2, 0));
        emacs.run_command("backwardParagraph", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 0));
    }

    #[test]
    fn rectangle_mode_moves_the_corner() {
        let mut emacs = emulator("abcd\nabcd\nabcd");
        at(&mut emacs, p(0, 1));
        emacs.run_command("rectangleMarkMode", &[]).unwrap();
        emacs.digit_argument(2);
        emacs.run_command("forwardChar", &[]).unwrap();
        emacs.run_command("nextLine", &[]).unwrap();
        assert_eq!(
            emacs.editor().selections(),
            vec![
                Selection::new(p(0, 1), p(0, 3)),
                Selection::new(p(1, 1), p(1, 3)),
            ]
        );
    }

    fn numbered_lines(n: usize) -> String {
        (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn scrolling_pages_by_the_visible_height() {
        let mut emacs = emulator(&numbered_lines(40));
        emacs.editor_mut().set_viewport(0, 10);
        emacs.run_command("scrollUpCommand", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(10, 0));
        emacs.run_command("scrollUpCommand", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(20, 0));
        emacs.run_command("scrollDownCommand", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(10, 0));
    }

    #[test]
    fn scrolling_with_an_argument_moves_that_many_lines() {
        let mut emacs = emulator(&numbered_lines(40));
        emacs.editor_mut().set_viewport(0, 10);
        emacs.digit_argument(3);
        emacs.run_command("scrollUpCommand", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(3, 0));

        emacs.negative_argument();
        emacs.digit_argument(2);
        emacs.run_command("scrollUpCommand", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(1, 0));

        emacs.digit_argument(5);
        emacs.run_command("scrollDownCommand", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 0));
    }

    #[test]
    fn scrolling_extends_an_active_mark() {
        let mut emacs = emulator(&numbered_lines(40));
        emacs.editor_mut().set_viewport(0, 10);
        at(&mut emacs, p(2, 3));
        emacs.run_command("setMarkCommand", &[]).unwrap();
        emacs.run_command("scrollUpCommand", &[]).unwrap();
        assert_eq!(
            emacs.editor().selections(),
            vec![Selection::new(p(2, 3), p(12, 3))]
        );
    }

    #[test]
    fn scrolling_without_a_viewport_stays_put() {
        let mut emacs = emulator(&numbered_lines(5));
        emacs.run_command("scrollUpCommand", &[]).unwrap();
        assert_eq!(cursor(&emacs), p(0, 0));
    }
}
