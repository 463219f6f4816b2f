//! End-to-end behavior of the engine over an in-memory editor.

use std::rc::Rc;

use mcx_core::change::TextEdit;
use mcx_core::host::{Clipboard, ContextValue, SelectionChangeKind, TextEditor, context};
use mcx_core::memory::{MemoryClipboard, MemoryEditor};
use mcx_core::position::{Position, Range, Selection};
use mcx_emacs::kill_ring::{AppendDirection, flatten};
use mcx_emacs::{Emulator, EmulatorError, EmulatorManager, Options};
use pretty_assertions::assert_eq;

fn p(line: usize, col: usize) -> Position {
    Position::new(line, col)
}

fn emulator(text: &str) -> (Emulator<MemoryEditor>, Rc<MemoryClipboard>) {
    let clipboard = Rc::new(MemoryClipboard::default());
    let emacs = Emulator::standalone(
        MemoryEditor::new(text),
        clipboard.clone(),
        Options::default(),
    );
    (emacs, clipboard)
}

fn place(emacs: &mut Emulator<MemoryEditor>, positions: &[Position]) {
    let selections = positions.iter().copied().map(Selection::caret).collect();
    emacs.editor_mut().set_selections(selections);
    emacs.process_notifications();
}

fn ring_texts(emacs: &Emulator<MemoryEditor>) -> Vec<String> {
    emacs
        .kill_ring()
        .map(|ring| ring.borrow().labels().into_iter().map(|(_, l)| l).collect())
        .unwrap_or_default()
}

// ── Kill ring ordering ───────────────────────────────────────

#[test]
fn multi_cursor_kill_yanks_in_document_order() {
    let mut mgr: EmulatorManager<u32, &str, MemoryEditor> =
        EmulatorManager::new(Rc::new(MemoryClipboard::default()), Options::default());

    let source = mgr.get_or_create(1, "source", || {
        MemoryEditor::new("0123456789\nabcdefghij\nABCDEFGHIJ")
    });
    // Cursors declared out of document order.
    place(source, &[p(1, 0), p(0, 0), p(2, 0)]);
    let ranges = [1, 0, 2]
        .into_iter()
        .map(|line| Range::new(p(line, 0), p(line, 3)))
        .collect();
    source.kill(ranges, AppendDirection::Forward).unwrap();
    assert_eq!(source.editor().contents(), "3456789\ndefghij\nDEFGHIJ");

    let target = mgr.get_or_create(2, "target", || MemoryEditor::new(""));
    target.run_command("yank", &[]).unwrap();
    assert_eq!(target.editor().contents(), "012\nabc\nABC");
}

// ── Append runs ──────────────────────────────────────────────

#[test]
fn consecutive_kills_fuse_until_the_cursor_moves() {
    let (mut emacs, clipboard) = emulator("one two three four");
    emacs.run_command("killWord", &[]).unwrap();
    emacs.run_command("killWord", &[]).unwrap();
    assert_eq!(ring_texts(&emacs), vec!["\"one two\""]);
    assert_eq!(clipboard.read_text().unwrap(), "one two");

    emacs.run_command("forwardChar", &[]).unwrap();
    emacs.run_command("killWord", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "  four");
    assert_eq!(ring_texts(&emacs), vec!["\"three\"", "\"one two\""]);
}

#[test]
fn copy_between_kills_breaks_the_run() {
    let (mut emacs, _) = emulator("alpha beta gamma");
    emacs.run_command("killWord", &[]).unwrap();
    emacs.copy(&[Range::new(p(0, 1), p(0, 5))]).unwrap();
    emacs.run_command("killWord", &[]).unwrap();
    assert_eq!(
        ring_texts(&emacs),
        vec!["\" beta\"", "\"beta\"", "\"alpha\""]
    );
}

// ── Yank-pop ─────────────────────────────────────────────────

fn with_two_kills() -> Emulator<MemoryEditor> {
    let (mut emacs, _) = emulator("first second");
    emacs.run_command("killWord", &[]).unwrap();
    emacs.cancel();
    emacs.run_command("killWord", &[]).unwrap();
    emacs
}

#[test]
fn yank_pop_without_yank_does_nothing() {
    let mut emacs = with_two_kills();
    let before = ring_texts(&emacs);
    emacs.run_command("yank-pop", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "");
    assert_eq!(ring_texts(&emacs), before);
    assert_eq!(
        emacs.editor().last_message(),
        Some("Previous command was not a yank")
    );
}

#[test]
fn yank_pop_after_outside_edit_does_nothing() {
    let mut emacs = with_two_kills();
    emacs.run_command("yank", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), " second");

    emacs
        .editor_mut()
        .edit_as_user(&[TextEdit::insert(p(0, 0), ">")])
        .unwrap();
    emacs.process_notifications();
    let before = ring_texts(&emacs);

    emacs.run_command("yank-pop", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "> second");
    assert_eq!(ring_texts(&emacs), before);
}

#[test]
fn yank_pop_replaces_the_yank() {
    let mut emacs = with_two_kills();
    emacs.run_command("yank", &[]).unwrap();
    emacs.run_command("yank-pop", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "first");
    assert_eq!(emacs.editor().selections(), vec![Selection::caret(p(0, 5))]);
}

// ── Prefix argument ──────────────────────────────────────────

#[test]
fn prefix_values_and_contexts() {
    let (mut emacs, _) = emulator("");

    emacs.universal_argument();
    emacs.universal_argument();
    assert_eq!(emacs.prefix_argument(), Some(16));
    assert_eq!(
        emacs.editor().context(context::PREFIX_ARGUMENT),
        Some(ContextValue::Number(Some(16)))
    );
    emacs.cancel();
    assert_eq!(emacs.prefix_argument(), None);
    assert_eq!(
        emacs.editor().context(context::PREFIX_ARGUMENT_EXISTS),
        Some(ContextValue::Bool(false))
    );

    emacs.digit_argument(3);
    emacs.subsequent_argument_digit(2).unwrap();
    assert_eq!(emacs.prefix_argument(), Some(32));
    emacs.cancel();

    emacs.negative_argument();
    emacs.subsequent_argument_digit(3).unwrap();
    assert_eq!(emacs.prefix_argument(), Some(-3));
    assert_eq!(
        emacs.editor().context(context::ACCEPTING_ARGUMENT),
        Some(ContextValue::Bool(true))
    );
}

#[test]
fn typed_characters_repeat_and_digits_fall_through() {
    let (mut emacs, _) = emulator("");
    emacs.universal_argument();
    emacs.subsequent_argument_digit(4).unwrap();
    emacs.type_char('x').unwrap();
    assert_eq!(emacs.editor().contents(), "xxxx");

    // No argument being entered: the digit is just text.
    emacs.subsequent_argument_digit(7).unwrap();
    assert_eq!(emacs.editor().contents(), "xxxx7");

    emacs.universal_argument();
    emacs.type_char('-').unwrap();
    emacs.type_char('y').unwrap();
    assert_eq!(emacs.editor().contents(), "xxxx7");
    assert_eq!(
        emacs.editor().last_message(),
        Some("Negative repetition argument -1")
    );
}

// ── Outside changes ──────────────────────────────────────────

#[test]
fn mouse_selection_becomes_the_active_region() {
    let (mut emacs, _) = emulator("hello world");
    emacs
        .editor_mut()
        .select_as_user(vec![Selection::new(p(0, 6), p(0, 11))], SelectionChangeKind::Mouse);
    emacs.process_notifications();
    assert!(emacs.is_mark_active());
    assert_eq!(emacs.mark().unwrap().positions(), &[p(0, 6)]);

    emacs.run_command("killRegion", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "hello ");

    emacs
        .editor_mut()
        .select_as_user(vec![Selection::caret(p(0, 2))], SelectionChangeKind::Mouse);
    emacs.process_notifications();
    assert!(!emacs.is_mark_active());
}

#[test]
fn keyboard_collapse_stretches_back_to_the_mark() {
    let (mut emacs, _) = emulator("hello world");
    emacs.run_command("setMarkCommand", &[]).unwrap();
    emacs.run_command("forwardWord", &[]).unwrap();

    emacs
        .editor_mut()
        .select_as_user(vec![Selection::caret(p(0, 8))], SelectionChangeKind::Keyboard);
    emacs.process_notifications();
    assert_eq!(
        emacs.editor().selections(),
        vec![Selection::new(p(0, 0), p(0, 8))]
    );
    assert_eq!(emacs.this_command(), None);
}

#[test]
fn keyboard_selection_sets_the_mark_with_messages() {
    let (mut emacs, _) = emulator("hello world");
    emacs
        .editor_mut()
        .select_as_user(vec![Selection::new(p(0, 0), p(0, 5))], SelectionChangeKind::Keyboard);
    emacs.process_notifications();
    assert!(emacs.is_mark_active());
    assert_eq!(emacs.mark().unwrap().positions(), &[p(0, 0)]);
    assert_eq!(emacs.editor().messages(), &["Mark activated", "Mark set"]);

    // A mouse selection updates the mark quietly.
    emacs
        .editor_mut()
        .select_as_user(vec![Selection::new(p(0, 6), p(0, 11))], SelectionChangeKind::Mouse);
    emacs.process_notifications();
    assert_eq!(emacs.mark().unwrap().positions(), &[p(0, 6)]);
    assert_eq!(emacs.editor().messages().len(), 2);
}

#[test]
fn outside_edit_touching_the_region_drops_the_mark() {
    let (mut emacs, _) = emulator("hello world");
    emacs.run_command("setMarkCommand", &[]).unwrap();
    emacs.run_command("forwardWord", &[]).unwrap();

    // Another extension deletes the selected text.
    emacs
        .editor_mut()
        .edit_as_user(&[TextEdit::delete(Range::new(p(0, 0), p(0, 5)))])
        .unwrap();
    emacs.process_notifications();
    assert_eq!(emacs.editor().contents(), " world");
    assert!(!emacs.is_mark_active());
    assert_eq!(
        emacs.editor().context(context::IN_MARK_MODE),
        Some(ContextValue::Bool(false))
    );
}

#[test]
fn mark_follows_outside_edits() {
    let (mut emacs, _) = emulator("abc\ndef");
    place(&mut emacs, &[p(1, 1)]);
    emacs.run_command("setMarkCommand", &[]).unwrap();
    emacs.cancel();

    emacs
        .editor_mut()
        .edit_as_user(&[TextEdit::insert(p(0, 0), "new line\n")])
        .unwrap();
    emacs.process_notifications();
    assert_eq!(emacs.mark().unwrap().positions(), &[p(2, 1)]);
}

// ── Failures ─────────────────────────────────────────────────

#[test]
fn transient_edit_failures_are_retried() {
    let (mut emacs, _) = emulator("hello world");
    emacs.editor_mut().fail_next_edits(2);
    emacs.run_command("killWord", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), " world");
}

#[test]
fn persistent_edit_failure_clears_state() {
    let (mut emacs, _) = emulator("hello world");
    emacs.editor_mut().fail_next_edits(3);
    emacs.digit_argument(2);

    let err = emacs.run_command("killWord", &[]).unwrap_err();
    assert!(matches!(err, EmulatorError::EditFailed { attempts: 3, .. }));
    assert_eq!(emacs.editor().contents(), "hello world");
    assert_eq!(emacs.prefix_argument(), None);
    assert!(!emacs.kill_yanker().is_appending());
}

#[test]
fn unknown_command_is_an_error() {
    let (mut emacs, _) = emulator("");
    let err = emacs.run_command("noSuchCommand", &[]).unwrap_err();
    assert!(matches!(err, EmulatorError::CommandNotFound(ref name) if name == "noSuchCommand"));
}

// ── Rectangles ───────────────────────────────────────────────

#[test]
fn rectangle_kill_and_yank() {
    let (mut emacs, _) = emulator("abcdef\nabcdef\nabcdef");
    place(&mut emacs, &[p(0, 1)]);
    emacs.run_command("rectangleMarkMode", &[]).unwrap();
    emacs.digit_argument(2);
    emacs.run_command("forwardChar", &[]).unwrap();
    emacs.digit_argument(2);
    emacs.run_command("nextLine", &[]).unwrap();
    assert_eq!(emacs.editor().selections().len(), 3);

    emacs.run_command("killRegion", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "adef\nadef\nadef");
    assert_eq!(emacs.killed_rectangle(), &["bc", "bc", "bc"]);
    assert!(!emacs.is_in_rectangle_mode());
    assert_eq!(emacs.editor().selections(), vec![Selection::caret(p(0, 1))]);
    let top = emacs.kill_ring().unwrap().borrow().top().map(flatten);
    assert_eq!(top.as_deref(), Some("bc\nbc\nbc"));

    place(&mut emacs, &[p(0, 4)]);
    emacs.run_command("yankRectangle", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "adefbc\nadefbc\nadefbc");
    assert_eq!(emacs.editor().selections(), vec![Selection::caret(p(2, 6))]);

    // Past the end: lines are added and padded.
    emacs.run_command("yankRectangle", &[]).unwrap();
    assert_eq!(
        emacs.editor().contents(),
        "adefbc\nadefbc\nadefbcbc\n      bc\n      bc"
    );
    assert_eq!(emacs.editor().selections(), vec![Selection::caret(p(4, 8))]);
}

#[test]
fn copy_rectangle_leaves_text() {
    let (mut emacs, _) = emulator("abcd\nabcd");
    emacs.run_command("rectangleMarkMode", &[]).unwrap();
    emacs.run_command("forwardChar", &[]).unwrap();
    emacs.run_command("nextLine", &[]).unwrap();
    emacs.run_command("copyRectangleAsKill", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "abcd\nabcd");
    assert_eq!(emacs.killed_rectangle(), &["a", "a"]);
    assert!(!emacs.is_mark_active());
}

#[test]
fn rectangle_kill_keeps_blank_rows() {
    let (mut emacs, clipboard) = emulator("abc\n\nabc");
    emacs.run_command("rectangleMarkMode", &[]).unwrap();
    emacs.digit_argument(2);
    emacs.run_command("nextLine", &[]).unwrap();
    emacs.run_command("forwardChar", &[]).unwrap();

    emacs.run_command("killRegion", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "bc\n\nbc");
    assert_eq!(emacs.killed_rectangle(), &["a", "", "a"]);
    let top = emacs.kill_ring().unwrap().borrow().top().map(flatten);
    assert_eq!(top.as_deref(), Some("a\n\na"));
    assert_eq!(clipboard.contents(), "a\n\na");
}

#[test]
fn copy_rectangle_keeps_blank_rows() {
    let (mut emacs, clipboard) = emulator("abc\n\nabc");
    emacs.run_command("rectangleMarkMode", &[]).unwrap();
    emacs.run_command("forwardChar", &[]).unwrap();
    emacs.digit_argument(2);
    emacs.run_command("nextLine", &[]).unwrap();
    emacs.run_command("copyRectangleAsKill", &[]).unwrap();
    assert_eq!(emacs.editor().contents(), "abc\n\nabc");
    assert_eq!(clipboard.contents(), "a\n\na");
}

#[test]
fn rectangle_keeps_its_width_across_short_lines() {
    let (mut emacs, _) = emulator("abc\n\nabc");
    emacs.run_command("rectangleMarkMode", &[]).unwrap();
    emacs.run_command("forwardChar", &[]).unwrap();
    emacs.digit_argument(2);
    emacs.run_command("nextLine", &[]).unwrap();
    assert_eq!(
        emacs.editor().selections(),
        vec![
            Selection::new(p(0, 0), p(0, 1)),
            Selection::new(p(1, 0), p(1, 0)),
            Selection::new(p(2, 0), p(2, 1)),
        ]
    );

    // A sideways step replaces the remembered column.
    emacs.run_command("forwardChar", &[]).unwrap();
    emacs.digit_argument(2);
    emacs.run_command("previousLine", &[]).unwrap();
    assert_eq!(
        emacs.editor().selections(),
        vec![Selection::new(p(0, 0), p(0, 2))]
    );
}

// ── Cancel ───────────────────────────────────────────────────

#[test]
fn cancel_collapses_to_the_primary_cursor() {
    let (mut emacs, _) = emulator("a\nb\nc");
    place(&mut emacs, &[p(2, 0), p(0, 0), p(1, 0)]);
    emacs.cancel();
    assert_eq!(emacs.editor().selections(), vec![Selection::caret(p(2, 0))]);
    assert_eq!(emacs.editor().last_message(), Some("Quit"));
}
