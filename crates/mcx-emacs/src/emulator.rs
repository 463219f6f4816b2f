//! One Emacs emulator per editor.
//!
//! The emulator owns the mark ring, the kill/yank state and the command
//! registry for a single [`TextEditor`]. It keeps its own idea of where the
//! mark is and whether it is active, and it reconciles that with the
//! editor whenever the editor reports something.
//!
//! ## Attribution
//!
//! The editor queues [`Notification`]s; the emulator drains them in
//! [`pump`](Emulator::process_notifications). Notifications drained while a
//! command runs are the command's own side effects. Anything else came from
//! outside (a mouse click, another extension, an undo) and triggers
//! resynchronization:
//!
//! - a mouse selection makes its anchors the mark and activates it when
//!   non-empty, and deactivates the mark otherwise;
//! - any other selection change does the same when non-empty, but when the
//!   selection collapsed while the mark is active the region is stretched
//!   back out to the mark.
//!
//! Either way, interruption-aware commands are told.
//!
//! ## Region
//!
//! The region is active exactly when some selection is non-empty. The mark
//! being active only means the next motion extends the selection.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use mcx_core::change::{ContentChange, TextEdit};
use mcx_core::host::{
    Clipboard, ContextValue, Notification, RevealType, SelectionChangeKind, TextEditor, context,
};
use mcx_core::position::{Position, Range, Selection};

use crate::command::{CommandRegistry, Invocation};
use crate::error::{EmulatorError, Result};
use crate::kill_ring::KillRing;
use crate::kill_yank::KillYanker;
use crate::mark::{Mark, MarkRing};
use crate::options::Options;
use crate::prefix::{PrefixArgumentHandler, PrefixSignals};
use crate::rectangle::RectangleState;

/// Pseudo-command ids for the entry points that do not go through the
/// registry but still count as commands.
pub const TYPE_CHAR: &str = "typeChar";
pub const CANCEL: &str = "cancel";

pub struct Emulator<E: TextEditor> {
    editor: E,
    pub(crate) clipboard: Rc<dyn Clipboard>,
    prefix: Rc<RefCell<PrefixArgumentHandler>>,
    pub(crate) options: Options,

    mark_ring: MarkRing,
    mark_active: bool,
    pub(crate) kill_yanker: KillYanker,
    pub(crate) killed_rectangle: Vec<String>,
    pub(crate) rectangle: Option<RectangleState>,

    this_command: Option<&'static str>,
    last_command: Option<&'static str>,
    in_command: bool,
    last_selections: Vec<Selection>,

    registry: CommandRegistry<E>,
}

impl<E: TextEditor> Emulator<E> {
    /// An emulator over `editor`.
    ///
    /// `kill_ring` may be shared with other emulators; `None` runs in
    /// clipboard-only mode. The prefix handler is shared the same way.
    pub fn new(
        editor: E,
        kill_ring: Option<Rc<RefCell<KillRing>>>,
        clipboard: Rc<dyn Clipboard>,
        prefix: Rc<RefCell<PrefixArgumentHandler>>,
        options: Options,
    ) -> Self {
        let last_selections = editor.selections();
        Self {
            editor,
            clipboard,
            prefix,
            mark_ring: MarkRing::new(options.mark_ring_max),
            options,
            mark_active: false,
            kill_yanker: KillYanker::new(kill_ring),
            killed_rectangle: Vec::new(),
            rectangle: None,
            this_command: None,
            last_command: None,
            in_command: false,
            last_selections,
            registry: CommandRegistry::standard(),
        }
    }

    /// An emulator with its own kill ring (unless `options` turn it off)
    /// and its own prefix handler.
    pub fn standalone(editor: E, clipboard: Rc<dyn Clipboard>, options: Options) -> Self {
        let kill_ring = options
            .kill_ring
            .then(|| Rc::new(RefCell::new(KillRing::new(options.kill_ring_max))));
        let prefix = Rc::new(RefCell::new(PrefixArgumentHandler::new()));
        Self::new(editor, kill_ring, clipboard, prefix, options)
    }

    // -- Accessors ----------------------------------------------------------

    pub const fn editor(&self) -> &E {
        &self.editor
    }

    /// Mutable access to the editor, for the host to act on it directly.
    /// Call [`process_notifications`](Self::process_notifications) after.
    pub const fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// The current mark (top of the mark ring).
    #[must_use]
    pub fn mark(&self) -> Option<&Mark> {
        self.mark_ring.top()
    }

    pub const fn mark_ring(&self) -> &MarkRing {
        &self.mark_ring
    }

    pub const fn is_mark_active(&self) -> bool {
        self.mark_active
    }

    #[must_use]
    pub fn is_region_active(&self) -> bool {
        self.editor.selections().iter().any(|s| !s.is_empty())
    }

    /// Selections from the mark to each cursor; empty without a mark.
    #[must_use]
    pub fn get_region(&self) -> Vec<Selection> {
        self.mark()
            .map(|mark| mark.to_anchor(&self.editor.selections()))
            .unwrap_or_default()
    }

    pub const fn this_command(&self) -> Option<&'static str> {
        self.this_command
    }

    pub const fn last_command(&self) -> Option<&'static str> {
        self.last_command
    }

    pub(crate) const fn set_this_command(&mut self, id: &'static str) {
        self.this_command = Some(id);
    }

    #[must_use]
    pub fn kill_ring(&self) -> Option<Rc<RefCell<KillRing>>> {
        self.kill_yanker.kill_ring().cloned()
    }

    pub const fn kill_yanker(&self) -> &KillYanker {
        &self.kill_yanker
    }

    /// Lines saved by the last rectangle kill or copy.
    #[must_use]
    pub fn killed_rectangle(&self) -> &[String] {
        &self.killed_rectangle
    }

    pub const fn is_in_rectangle_mode(&self) -> bool {
        self.rectangle.is_some()
    }

    #[must_use]
    pub fn prefix_argument(&self) -> Option<i32> {
        self.prefix.borrow().value()
    }

    #[must_use]
    pub fn is_accepting_argument(&self) -> bool {
        self.prefix.borrow().is_accepting()
    }

    // -- Dispatch -----------------------------------------------------------

    /// Run the command registered as `name`.
    ///
    /// The prefix argument is cleared afterwards whether the command
    /// succeeded or not.
    ///
    /// # Errors
    ///
    /// [`EmulatorError::CommandNotFound`] for unknown names, otherwise
    /// whatever the command returns.
    pub fn run_command(&mut self, name: &str, args: &[&str]) -> Result<()> {
        let Some((id, mut command)) = self.registry.take(name) else {
            return Err(EmulatorError::CommandNotFound(name.to_owned()));
        };

        let was_in_command = std::mem::replace(&mut self.in_command, true);
        self.last_command = self.this_command;
        self.this_command = Some(id);

        let invocation = {
            let prefix = self.prefix.borrow();
            Invocation {
                mark_active: self.mark_active,
                prefix_argument: prefix.value(),
                single_universal: prefix.preceding_single_ctrl_u(),
                args: args.iter().map(ToString::to_string).collect(),
            }
        };
        debug!(command = id, prefix = ?invocation.prefix_argument, "run command");

        let result = command.execute(self, &invocation);
        self.registry.restore(id, command);

        if let Err(err) = &result {
            debug!(command = id, %err, "command failed");
            self.kill_yanker.cancel_kill_append();
        }
        self.after_command();
        self.in_command = was_in_command;
        result
    }

    /// Run `f` as if it were a command named `id`.
    pub(crate) fn with_command_scope<T>(
        &mut self,
        id: &'static str,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let was_in_command = std::mem::replace(&mut self.in_command, true);
        self.last_command = self.this_command;
        self.this_command = Some(id);
        let out = f(self);
        self.after_command();
        self.in_command = was_in_command;
        out
    }

    fn after_command(&mut self) {
        let signals = self.prefix.borrow_mut().cancel();
        self.publish_prefix(signals);
        self.pump();
        self.last_selections = self.editor.selections();
    }

    // -- Notifications ------------------------------------------------------

    /// Catch up with everything the editor reported since the last call.
    ///
    /// Hosts call this after changing the editor outside the emulator.
    pub fn process_notifications(&mut self) {
        self.pump();
    }

    /// Drain notifications until the editor has nothing more to say.
    pub(crate) fn pump(&mut self) {
        loop {
            let notifications = self.editor.take_notifications();
            if notifications.is_empty() {
                break;
            }
            for notification in notifications {
                match notification {
                    Notification::DocumentChanged(changes) => self.on_document_changed(&changes),
                    Notification::SelectionChanged(kind) => self.on_selection_changed(kind),
                }
            }
        }
    }

    fn on_document_changed(&mut self, changes: &[ContentChange]) {
        self.mark_ring.apply_changes(changes);
        self.kill_yanker.apply_changes(changes);
        if let Some(rect) = &mut self.rectangle {
            rect.apply_changes(changes);
        }

        let selections = self.editor.selections();
        let touches_selection = changes.iter().any(|change| {
            selections
                .iter()
                .any(|sel| change.range.intersects(sel.range()))
        });
        if touches_selection {
            self.deactivate_mark(false);
        }

        self.kill_yanker.on_document_changed();
        if !self.in_command {
            self.registry.notify_interrupted();
        }
    }

    fn on_selection_changed(&mut self, kind: SelectionChangeKind) {
        if self.in_command {
            return;
        }
        let selections = self.editor.selections();
        if selections == self.last_selections {
            return;
        }

        debug!(?kind, "selection changed outside a command");
        self.this_command = None;
        if self.rectangle.take().is_some() {
            self.editor
                .set_context(context::IN_RECTANGLE_MARK_MODE, ContextValue::Bool(false));
        }
        match kind {
            SelectionChangeKind::Mouse => self.sync_editor_state(),
            SelectionChangeKind::Keyboard | SelectionChangeKind::Command => {
                self.sync_mark_and_selection();
            }
        }
        self.last_selections = self.editor.selections();
        self.kill_yanker.on_selection_changed();
        self.registry.notify_interrupted();
    }

    /// Mouse selections replace the mark outright.
    fn sync_editor_state(&mut self) {
        if self.is_region_active() {
            let mark = Mark::from_anchor(&self.editor.selections());
            self.mark_ring.push(mark, true, false);
            self.activate_mark(true);
        } else {
            self.deactivate_mark(false);
        }
    }

    /// Keyboard and command selections become the region, with the usual
    /// messages. A collapsed selection is stretched back to an active mark.
    fn sync_mark_and_selection(&mut self) {
        if self.is_region_active() {
            let mark = Mark::from_anchor(&self.editor.selections());
            self.activate_mark(false);
            if self.mark() != Some(&mark) {
                self.push_mark(Some(mark), false, false);
            }
        } else if self.mark_active {
            if let Some(mark) = self.mark() {
                let selections = mark.to_anchor(&self.editor.selections());
                self.editor.set_selections(selections);
            }
        }
    }

    // -- Mark and region ----------------------------------------------------

    /// Save a mark, the cursors' positions by default.
    pub fn push_mark(&mut self, mark: Option<Mark>, nomsg: bool, activate: bool) {
        let mark = mark.unwrap_or_else(|| Mark::from_cursor(&self.editor.selections()));
        self.mark_ring.push(mark, false, false);
        if !nomsg {
            self.editor.show_message("Mark set");
        }
        if activate {
            self.activate_mark(true);
        }
    }

    /// Return the current mark and rotate the ring.
    pub fn pop_mark(&mut self) -> Option<Mark> {
        self.mark_ring.pop()
    }

    pub fn activate_mark(&mut self, nomsg: bool) {
        if self.mark_active {
            return;
        }
        self.mark_active = true;
        self.editor
            .set_context(context::IN_MARK_MODE, ContextValue::Bool(true));
        if !nomsg {
            self.editor.show_message("Mark activated");
        }
    }

    /// Deactivate the mark, and with `and_region` collapse the selections.
    pub fn deactivate_mark(&mut self, and_region: bool) {
        if !self.mark_active {
            return;
        }
        self.mark_active = false;
        self.exit_rectangle_mode();
        if and_region {
            self.deactivate_region();
        }
        self.editor
            .set_context(context::IN_MARK_MODE, ContextValue::Bool(false));
    }

    /// Select from the mark to every cursor.
    pub fn activate_region(&mut self) {
        if let Some(mark) = self.mark() {
            let selections = mark.to_anchor(&self.editor.selections());
            self.editor.set_selections(selections);
        }
    }

    /// Collapse every selection to its active end.
    pub fn deactivate_region(&mut self) {
        let selections = self
            .editor
            .selections()
            .into_iter()
            .map(Selection::collapsed)
            .collect();
        self.editor.set_selections(selections);
    }

    /// Swap the cursors and the mark (`C-x C-x`).
    pub fn exchange_point_and_mark(&mut self) {
        let Some(mark) = self.mark().cloned() else {
            self.editor.show_message("No mark set in this buffer");
            return;
        };
        let selections = self.editor.selections();
        let cursor = Mark::from_cursor(&selections);
        let mut next = mark.to_cursor(Some(&selections));
        if self.mark_active {
            next = cursor.to_anchor(&next);
        }
        self.editor.set_selections(next);
        self.mark_ring.push(cursor, true, false);
        self.reveal_primary_cursor(RevealType::Minimal);
    }

    pub fn reveal_primary_cursor(&mut self, how: RevealType) {
        if let Some(primary) = self.editor.selections().first() {
            self.editor.reveal(primary.active, how);
        }
    }

    // -- Typing and quitting ------------------------------------------------

    /// Insert `ch` the way a typed key would, honoring the prefix argument.
    ///
    /// # Errors
    ///
    /// Returns the editor's error when the insertion is rejected.
    pub fn type_char(&mut self, ch: char) -> Result<()> {
        if ch == '-' && self.prefix.borrow().minus_sign_acceptable() {
            self.negative_argument();
            return Ok(());
        }
        self.with_command_scope(TYPE_CHAR, |emacs| {
            emacs.deactivate_mark(true);
            let repeat = emacs.prefix_argument().unwrap_or(1);
            let signals = emacs.prefix.borrow_mut().cancel();
            emacs.publish_prefix(signals);

            if repeat < 0 {
                emacs
                    .editor
                    .show_message(&format!("Negative repetition argument {repeat}"));
                return Ok(());
            }
            let text = ch.to_string().repeat(usize::try_from(repeat).unwrap_or(0));
            if text.is_empty() {
                return Ok(());
            }
            let edits: Vec<_> = emacs
                .editor
                .selections()
                .into_iter()
                .map(|sel| TextEdit::replace(sel.range(), text.clone()))
                .collect();
            emacs.editor.edit(&edits)?;
            Ok(())
        })
    }

    /// `C-g`: drop the mark, the region, the prefix argument and any kill
    /// append run.
    pub fn cancel(&mut self) {
        self.with_command_scope(CANCEL, |emacs| {
            if emacs.mark_active {
                emacs.deactivate_mark(true);
            } else if emacs.is_region_active() {
                emacs.deactivate_region();
            } else {
                let selections = emacs.editor.selections();
                if selections.len() > 1 {
                    emacs.editor.set_selections(selections[..1].to_vec());
                }
            }
            emacs.exit_rectangle_mode();
            emacs.kill_yanker.cancel_kill_append();
            emacs.registry.notify_interrupted();
            emacs.editor.show_message("Quit");
        });
    }

    // -- Prefix argument ----------------------------------------------------

    /// `C-u`.
    pub fn universal_argument(&mut self) {
        let signals = self.prefix.borrow_mut().universal_argument();
        self.publish_prefix(signals);
    }

    /// `M-<digit>`.
    pub fn digit_argument(&mut self, digit: u8) {
        let signals = self.prefix.borrow_mut().digit_argument(digit);
        self.publish_prefix(signals);
    }

    /// `M--`.
    pub fn negative_argument(&mut self) {
        let signals = self.prefix.borrow_mut().negative_argument();
        self.publish_prefix(signals);
    }

    /// A digit typed after `C-u`. When no argument is being entered the
    /// digit is typed as text.
    ///
    /// # Errors
    ///
    /// See [`type_char`](Self::type_char).
    pub fn subsequent_argument_digit(&mut self, digit: u8) -> Result<()> {
        if !self.is_accepting_argument() {
            return self.type_char(char::from(b'0' + digit.min(9)));
        }
        let signals = self.prefix.borrow_mut().subsequent_argument_digit(digit);
        self.publish_prefix(signals);
        Ok(())
    }

    fn publish_prefix(&mut self, signals: PrefixSignals) {
        if let Some(value) = signals.argument {
            self.editor
                .set_context(context::PREFIX_ARGUMENT, ContextValue::Number(value));
            self.editor.set_context(
                context::PREFIX_ARGUMENT_EXISTS,
                ContextValue::Bool(value.is_some()),
            );
        }
        if let Some(accepting) = signals.accepting {
            self.editor
                .set_context(context::ACCEPTING_ARGUMENT, ContextValue::Bool(accepting));
        }
    }

    // -- Helpers for commands -----------------------------------------------

    /// Ranges from each cursor to `target(cursor)`, skipping empty ones.
    pub(crate) fn ranges_from_cursors(
        &self,
        target: impl Fn(&E, Selection) -> Position,
    ) -> Vec<Range> {
        self.editor
            .selections()
            .into_iter()
            .map(|sel| Range::ordered(sel.active, target(&self.editor, sel)))
            .filter(|range| !range.is_empty())
            .collect()
    }
}
