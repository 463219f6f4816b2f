//! Word boundaries, Emacs style.
//!
//! A word is a run of alphanumeric characters. Everything else (blanks,
//! punctuation, line breaks) separates words, so `forward-word` from
//! `foo.|bar baz` lands after `bar`, skipping the punctuation on the way.
//!
//! | Function | Emacs | Lands on |
//! |----------|-------|----------|
//! | [`word_end_after`] | `M-f` | end of the next word |
//! | [`word_start_before`] | `M-b` | start of the previous word |

use crate::buffer::Buffer;
use crate::position::Position;

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Word,
    /// Anything that is not part of a word.
    Separator,
}

pub(crate) fn classify(ch: char) -> CharClass {
    if ch.is_alphanumeric() {
        CharClass::Word
    } else {
        CharClass::Separator
    }
}

/// Forward to the end of the next word. Stays at the buffer end when no
/// word follows.
#[must_use]
pub fn word_end_after(buf: &Buffer, pos: Position) -> Position {
    let rope = buf.rope();
    let total = rope.len_chars();
    let Some(mut idx) = buf.pos_to_char_idx(buf.clamp_position(pos)) else {
        return pos;
    };

    // Phase 1: skip separators.
    while idx < total && classify(rope.char(idx)) == CharClass::Separator {
        idx += 1;
    }
    // Phase 2: skip the word itself.
    while idx < total && classify(rope.char(idx)) == CharClass::Word {
        idx += 1;
    }

    buf.char_idx_to_pos(idx).unwrap_or(pos)
}

/// Backward to the start of the previous word. Stays at the buffer start
/// when no word precedes.
#[must_use]
pub fn word_start_before(buf: &Buffer, pos: Position) -> Position {
    let rope = buf.rope();
    let Some(mut idx) = buf.pos_to_char_idx(buf.clamp_position(pos)) else {
        return pos;
    };

    while idx > 0 && classify(rope.char(idx - 1)) == CharClass::Separator {
        idx -= 1;
    }
    while idx > 0 && classify(rope.char(idx - 1)) == CharClass::Word {
        idx -= 1;
    }

    buf.char_idx_to_pos(idx).unwrap_or(pos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
