//! Cursor motions over a [`Buffer`].
//!
//! Every motion is a pure function of the buffer and a starting position.
//! Character motions wrap across line breaks the way Emacs `C-f`/`C-b` do;
//! line motions keep the column, clamped to the target line.

use crate::buffer::Buffer;
use crate::host::Motion;
use crate::position::Position;
use crate::word;

/// Apply `motion` to `pos` `count` times.
#[must_use]
pub fn apply(buf: &Buffer, pos: Position, motion: Motion, count: usize) -> Position {
    let pos = buf.clamp_position(pos);
    match motion {
        Motion::CharForward => {
            let idx = buf.pos_to_char_idx(pos).unwrap_or(0);
            let target = (idx + count).min(buf.len_chars());
            buf.char_idx_to_pos(target).unwrap_or(pos)
        }
        Motion::CharBackward => {
            let idx = buf.pos_to_char_idx(pos).unwrap_or(0);
            buf.char_idx_to_pos(idx.saturating_sub(count)).unwrap_or(pos)
        }
        Motion::LineDown => {
            let last = buf.line_count().saturating_sub(1);
            buf.clamp_position(Position::new((pos.line + count).min(last), pos.col))
        }
        Motion::LineUp => {
            buf.clamp_position(Position::new(pos.line.saturating_sub(count), pos.col))
        }
        Motion::LineStart => Position::new(pos.line, 0),
        Motion::LineEnd => Position::new(pos.line, buf.line_content_len(pos.line).unwrap_or(0)),
        Motion::WordForward => (0..count).fold(pos, |p, _| word::word_end_after(buf, p)),
        Motion::WordBackward => (0..count).fold(pos, |p, _| word::word_start_before(buf, p)),
        Motion::Indentation => Position::new(pos.line, first_non_blank(buf, pos.line)),
        Motion::BufferStart => Position::ZERO,
        Motion::BufferEnd => buf.end(),
        Motion::ParagraphForward => paragraph_forward(buf, pos, count),
        Motion::ParagraphBackward => paragraph_backward(buf, pos, count),
    }
}

/// Column of the first non-blank character, or the line length when the
/// line is blank.
#[must_use]
pub fn first_non_blank(buf: &Buffer, line: usize) -> usize {
    buf.line_text(line)
        .chars()
        .take_while(|ch| ch.is_whitespace())
        .count()
}

fn is_blank_line(buf: &Buffer, line: usize) -> bool {
    buf.line_content_len(line).unwrap_or(0) == 0
}

/// Next blank line after the current paragraph, or the buffer end.
fn paragraph_forward(buf: &Buffer, pos: Position, count: usize) -> Position {
    let line_count = buf.line_count();
    let mut line = pos.line;

    for _ in 0..count {
        let mut i = line + 1;
        if is_blank_line(buf, line) {
            while i < line_count && is_blank_line(buf, i) {
                i += 1;
            }
        }
        while i < line_count && !is_blank_line(buf, i) {
            i += 1;
        }
        if i >= line_count {
            return buf.end();
        }
        line = i;
    }

    Position::new(line, 0)
}

/// Previous blank line before the current paragraph, or the buffer start.
fn paragraph_backward(buf: &Buffer, pos: Position, count: usize) -> Position {
    let mut line = pos.line;

    for _ in 0..count {
        if line == 0 {
            break;
        }
        let mut i = line - 1;
        if is_blank_line(buf, line) {
            while i > 0 && is_blank_line(buf, i) {
                i -= 1;
            }
        }
        while i > 0 && !is_blank_line(buf, i) {
            i -= 1;
        }
        line = i;
    }

    Position::new(line, 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
