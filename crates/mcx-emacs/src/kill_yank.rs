//! Kill, copy, yank and yank-pop.
//!
//! [`KillYanker`] holds the state that connects consecutive kills and
//! yanks: whether an append run is going, where the last kill left the
//! cursors, and whether the document changed since the last yank. The
//! operations themselves live on [`Emulator`] because they need the
//! editor, the clipboard and the mark ring together.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use mcx_core::change::{ContentChange, TextEdit};
use mcx_core::host::{EditError, TextEditor};
use mcx_core::position::{Range, Selection};

use crate::command::kill::YANK;
use crate::emulator::Emulator;
use crate::error::{EmulatorError, Result};
use crate::kill_ring::{self, AppendDirection, KillRing, KillRingEntity, RegionText, flatten};
use crate::mark::Mark;

/// Kill/yank state for one emulator.
#[derive(Debug)]
pub struct KillYanker {
    /// `None` in clipboard-only mode.
    kill_ring: Option<Rc<RefCell<KillRing>>>,
    is_appending: bool,
    prev_kill_position: Option<Mark>,
    doc_changed_after_yank: bool,
    /// Where a yank in progress started; follows edits until it is pushed.
    yank_anchor: Option<Mark>,
}

impl KillYanker {
    #[must_use]
    pub const fn new(kill_ring: Option<Rc<RefCell<KillRing>>>) -> Self {
        Self {
            kill_ring,
            is_appending: false,
            prev_kill_position: None,
            doc_changed_after_yank: false,
            yank_anchor: None,
        }
    }

    #[must_use]
    pub const fn kill_ring(&self) -> Option<&Rc<RefCell<KillRing>>> {
        self.kill_ring.as_ref()
    }

    #[must_use]
    pub const fn is_appending(&self) -> bool {
        self.is_appending
    }

    #[must_use]
    pub const fn doc_changed_after_yank(&self) -> bool {
        self.doc_changed_after_yank
    }

    /// Make the next kill start a new ring entry.
    pub const fn cancel_kill_append(&mut self) {
        self.is_appending = false;
    }

    pub(crate) fn apply_changes(&mut self, changes: &[ContentChange]) {
        if let Some(anchor) = &mut self.yank_anchor {
            anchor.apply_changes(changes);
        }
    }

    pub(crate) const fn on_document_changed(&mut self) {
        self.doc_changed_after_yank = true;
        self.is_appending = false;
    }

    pub(crate) const fn on_selection_changed(&mut self) {
        self.doc_changed_after_yank = true;
        self.is_appending = false;
    }
}

impl<E: TextEditor> Emulator<E> {
    /// Kill `ranges` (one per cursor): save them to the kill ring and the
    /// clipboard, then delete them.
    ///
    /// A kill made where the previous kill left the cursors appends to the
    /// previous ring entry in `direction`. Empty ranges are ignored.
    ///
    /// # Errors
    ///
    /// [`EmulatorError::EditFailed`] when the deletion keeps failing,
    /// [`EmulatorError::Clipboard`] when the clipboard cannot be written.
    pub fn kill(&mut self, ranges: Vec<Range>, direction: AppendDirection) -> Result<()> {
        let ranges: Vec<Range> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
        if ranges.is_empty() {
            return Ok(());
        }

        let cursor = Mark::from_cursor(&self.editor().selections());
        if self.kill_yanker.prev_kill_position.as_ref() != Some(&cursor) {
            self.kill_yanker.is_appending = false;
        }

        let append = self.kill_yanker.is_appending;
        self.copy_ranges(&ranges, append, direction)?;
        self.delete_with_retry(&ranges)?;
        self.pump();

        self.kill_yanker.is_appending = true;
        self.kill_yanker.prev_kill_position =
            Some(Mark::from_cursor(&self.editor().selections()));
        Ok(())
    }

    /// Save `ranges` without deleting them. Never appends, and ends any
    /// append run.
    ///
    /// # Errors
    ///
    /// [`EmulatorError::Clipboard`] when the clipboard cannot be written.
    pub fn copy(&mut self, ranges: &[Range]) -> Result<()> {
        let ranges: Vec<Range> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
        if !ranges.is_empty() {
            self.copy_ranges(&ranges, false, AppendDirection::Forward)?;
        }
        self.kill_yanker.cancel_kill_append();
        Ok(())
    }

    pub(crate) fn copy_ranges(
        &mut self,
        ranges: &[Range],
        append: bool,
        direction: AppendDirection,
    ) -> Result<()> {
        let regions = ranges
            .iter()
            .map(|&range| RegionText::new(self.editor().text(range), range))
            .collect();
        let entity = KillRingEntity::from_regions(regions);

        let text = match self.kill_yanker.kill_ring() {
            Some(ring) => {
                let mut ring = ring.borrow_mut();
                if let Some(top) = ring
                    .top_mut()
                    .filter(|top| append && kill_ring::can_append(top, &entity))
                {
                    kill_ring::append(top, entity, direction);
                    debug!(?direction, "kill appended");
                    flatten(top)
                } else {
                    let text = flatten(&entity);
                    ring.push(entity);
                    text
                }
            }
            None => flatten(&entity),
        };
        self.clipboard.write_text(&text)?;
        Ok(())
    }

    pub(crate) fn delete_with_retry(&mut self, ranges: &[Range]) -> Result<()> {
        let edits: Vec<TextEdit> = ranges.iter().copied().map(TextEdit::delete).collect();
        let attempts = self.options.kill_retry_limit.max(1);
        let mut last_error = EditError::Conflict;
        for attempt in 1..=attempts {
            match self.editor_mut().edit(&edits) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(attempt, attempts, %err, "kill deletion failed");
                    last_error = err;
                }
            }
        }
        Err(EmulatorError::EditFailed {
            attempts,
            source: last_error,
        })
    }

    /// Paste the newest kill.
    ///
    /// Text on the system clipboard that differs from the newest ring entry
    /// is pushed first, so copies made in other programs are yanked too. In
    /// clipboard-only mode the clipboard is pasted directly.
    ///
    /// # Errors
    ///
    /// Clipboard read failures and rejected edits.
    pub fn yank(&mut self) -> Result<()> {
        let clipboard_text = self.clipboard.read_text()?;
        let Some(ring) = self.kill_yanker.kill_ring().cloned() else {
            if !clipboard_text.is_empty() {
                self.yank_entity(&KillRingEntity::Clipboard(clipboard_text))?;
            }
            return Ok(());
        };

        {
            let mut ring = ring.borrow_mut();
            let known = ring
                .newest()
                .is_some_and(|newest| flatten(newest) == clipboard_text);
            if !known && !clipboard_text.is_empty() {
                debug!("yank picked up external clipboard text");
                ring.push(KillRingEntity::Clipboard(clipboard_text));
            }
        }
        self.yank_top()
    }

    /// Paste the kill ring entry under the pointer.
    ///
    /// # Errors
    ///
    /// Rejected edits.
    pub fn yank_top(&mut self) -> Result<()> {
        let entity = self
            .kill_yanker
            .kill_ring()
            .and_then(|ring| ring.borrow().top().cloned());
        match entity {
            Some(entity) => self.yank_entity(&entity),
            None => {
                self.editor_mut().show_message("Kill ring is empty");
                Ok(())
            }
        }
    }

    /// Pick entry `index` of the kill ring (counted from the newest) and
    /// yank it. A following `yank-pop` continues from there.
    ///
    /// # Errors
    ///
    /// Rejected edits.
    pub fn yank_from_ring(&mut self, index: usize) -> Result<()> {
        self.with_command_scope(YANK, |emacs| {
            match emacs.kill_yanker.kill_ring() {
                Some(ring) => ring.borrow_mut().set_top(index),
                None => return Ok(()),
            }
            emacs.deactivate_mark(true);
            emacs.yank_top()
        })
    }

    fn yank_entity(&mut self, entity: &KillRingEntity) -> Result<()> {
        let selections = self.editor().selections();
        let anchor = Mark::from_anchor(&selections);
        self.kill_yanker.yank_anchor = Some(anchor.clone());

        if let Err(err) = self.paste(entity, &selections) {
            self.kill_yanker.yank_anchor = None;
            self.kill_yanker.doc_changed_after_yank = true;
            return Err(err);
        }
        self.pump();

        let anchor = self.kill_yanker.yank_anchor.take().unwrap_or(anchor);
        self.kill_yanker.doc_changed_after_yank = false;
        self.push_mark(Some(anchor), true, false);
        self.deactivate_region();
        Ok(())
    }

    /// Replace every selection with the entity's text. With several
    /// cursors and at least as many per-cursor texts, each cursor gets its
    /// own text; otherwise every cursor gets the flattened text.
    fn paste(&mut self, entity: &KillRingEntity, selections: &[Selection]) -> Result<()> {
        let chunks = entity.region_texts();
        let per_cursor =
            selections.len() > 1 && chunks.len() > 1 && chunks.len() >= selections.len();
        let flattened = flatten(entity);

        let edits: Vec<TextEdit> = selections
            .iter()
            .enumerate()
            .map(|(i, sel)| {
                let text = if per_cursor {
                    chunks[i].appended_text()
                } else {
                    flattened.clone()
                };
                TextEdit::replace(sel.range(), text)
            })
            .collect();
        self.editor_mut().edit(&edits)?;
        Ok(())
    }

    /// Replace the text just yanked with the next older kill.
    ///
    /// Only valid right after a yank (or another yank-pop) with no edit in
    /// between; otherwise a message is shown and nothing changes.
    ///
    /// # Errors
    ///
    /// Rejected edits.
    pub fn yank_pop(&mut self) -> Result<()> {
        let ring = self.kill_yanker.kill_ring().cloned();
        let after_yank =
            !self.kill_yanker.doc_changed_after_yank && self.last_command() == Some(YANK);
        let (Some(ring), true, Some(mark)) = (ring, after_yank, self.mark().cloned()) else {
            self.editor_mut()
                .show_message("Previous command was not a yank");
            return Ok(());
        };

        self.set_this_command(YANK);
        let selections = mark.to_anchor(&self.editor().selections());
        self.editor_mut().set_selections(selections);
        self.pump();

        let Some(entity) = ring.borrow_mut().pop_next().cloned() else {
            return Ok(());
        };
        let selections = self.editor().selections();
        self.paste(&entity, &selections)?;
        self.pump();
        self.kill_yanker.doc_changed_after_yank = false;
        self.deactivate_region();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
