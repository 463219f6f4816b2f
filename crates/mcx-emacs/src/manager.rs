//! One emulator per editor, sharing the kill ring and prefix argument.
//!
//! A host can show the same document in several editors (split views).
//! Each editor gets its own [`Emulator`] with its own mark ring, while the
//! kill ring, the prefix-argument accumulator, the clipboard and the
//! options are shared by all of them. Closing a document disposes every
//! emulator showing it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use tracing::debug;

use mcx_core::host::{Clipboard, TextEditor};

use crate::emulator::Emulator;
use crate::error::Result;
use crate::kill_ring::KillRing;
use crate::options::Options;
use crate::prefix::PrefixArgumentHandler;

/// Emulators keyed by editor `K`, grouped by document `D`.
pub struct EmulatorManager<K, D, E: TextEditor> {
    emulators: HashMap<K, Emulator<E>>,
    documents: HashMap<D, Vec<K>>,
    kill_ring: Option<Rc<RefCell<KillRing>>>,
    prefix: Rc<RefCell<PrefixArgumentHandler>>,
    clipboard: Rc<dyn Clipboard>,
    options: Options,
}

impl<K, D, E> EmulatorManager<K, D, E>
where
    K: Eq + Hash + Clone,
    D: Eq + Hash,
    E: TextEditor,
{
    /// A manager with a fresh kill ring, unless `options` turn it off.
    pub fn new(clipboard: Rc<dyn Clipboard>, options: Options) -> Self {
        let kill_ring = options
            .kill_ring
            .then(|| Rc::new(RefCell::new(KillRing::new(options.kill_ring_max))));
        Self {
            emulators: HashMap::new(),
            documents: HashMap::new(),
            kill_ring,
            prefix: Rc::new(RefCell::new(PrefixArgumentHandler::new())),
            clipboard,
            options,
        }
    }

    /// The emulator for editor `key`, created over `make_editor()` on first
    /// use.
    pub fn get_or_create(
        &mut self,
        key: K,
        document: D,
        make_editor: impl FnOnce() -> E,
    ) -> &mut Emulator<E> {
        let Self {
            emulators,
            documents,
            kill_ring,
            prefix,
            clipboard,
            options,
        } = self;
        emulators.entry(key).or_insert_with_key(|key| {
            debug!("new emulator");
            documents.entry(document).or_default().push(key.clone());
            Emulator::new(
                make_editor(),
                kill_ring.clone(),
                Rc::clone(clipboard),
                Rc::clone(prefix),
                options.clone(),
            )
        })
    }

    pub fn get(&self, key: &K) -> Option<&Emulator<E>> {
        self.emulators.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Emulator<E>> {
        self.emulators.get_mut(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emulators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emulators.is_empty()
    }

    /// Drop every emulator showing `document`, returning how many went.
    pub fn on_document_closed(&mut self, document: &D) -> usize {
        let Some(keys) = self.documents.remove(document) else {
            return 0;
        };
        for key in &keys {
            self.emulators.remove(key);
        }
        debug!(disposed = keys.len(), "document closed");
        keys.len()
    }

    #[must_use]
    pub fn kill_ring(&self) -> Option<&Rc<RefCell<KillRing>>> {
        self.kill_ring.as_ref()
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    // -- Prefix argument ----------------------------------------------------
    //
    // The accumulator is shared, but its context keys are published to the
    // editor the key was typed in.

    pub fn universal_argument(&mut self, key: &K) {
        if let Some(emacs) = self.emulators.get_mut(key) {
            emacs.universal_argument();
        }
    }

    pub fn digit_argument(&mut self, key: &K, digit: u8) {
        if let Some(emacs) = self.emulators.get_mut(key) {
            emacs.digit_argument(digit);
        }
    }

    pub fn negative_argument(&mut self, key: &K) {
        if let Some(emacs) = self.emulators.get_mut(key) {
            emacs.negative_argument();
        }
    }

    /// # Errors
    ///
    /// See [`Emulator::subsequent_argument_digit`].
    pub fn subsequent_argument_digit(&mut self, key: &K, digit: u8) -> Result<()> {
        match self.emulators.get_mut(key) {
            Some(emacs) => emacs.subsequent_argument_digit(digit),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn prefix_argument(&self) -> Option<i32> {
        self.prefix.borrow().value()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mcx_core::memory::{MemoryClipboard, MemoryEditor};
    use mcx_core::position::{Position, Selection};
    use pretty_assertions::assert_eq;

    type Manager = EmulatorManager<u32, &'static str, MemoryEditor>;

    fn manager(options: Options) -> Manager {
        EmulatorManager::new(Rc::new(MemoryClipboard::default()), options)
    }

    #[test]
    fn get_or_create_reuses_emulators() {
        let mut mgr = manager(Options::default());
        mgr.get_or_create(1, "a.txt", || MemoryEditor::new("one"));
        mgr.get_or_create(1, "a.txt", || panic!("must not rebuild"));
        mgr.get_or_create(2, "a.txt", || MemoryEditor::new("one"));
        assert_eq!(mgr.len(), 2);
    }

    #[test]
    fn closing_a_document_drops_its_editors() {
        let mut mgr = manager(Options::default());
        mgr.get_or_create(1, "a.txt", || MemoryEditor::new("a"));
        mgr.get_or_create(2, "a.txt", || MemoryEditor::new("a"));
        mgr.get_or_create(3, "b.txt", || MemoryEditor::new("b"));

        assert_eq!(mgr.on_document_closed(&"a.txt"), 2);
        assert!(mgr.get(&1).is_none());
        assert!(mgr.get(&3).is_some());
        assert_eq!(mgr.on_document_closed(&"a.txt"), 0);
    }

    #[test]
    fn kill_ring_is_shared_between_editors() {
        let mut mgr = manager(Options::default());
        mgr.get_or_create(1, "a.txt", || MemoryEditor::new("hello world"))
            .run_command("killWord", &[])
            .unwrap();

        let other = mgr.get_or_create(2, "b.txt", || MemoryEditor::new(""));
        other.run_command("yank", &[]).unwrap();
        assert_eq!(other.editor().contents(), "hello");
        assert_eq!(mgr.kill_ring().unwrap().borrow().len(), 1);
    }

    #[test]
    fn prefix_argument_is_shared() {
        let mut mgr = manager(Options::default());
        mgr.get_or_create(1, "a.txt", || MemoryEditor::new("abcdef"));
        mgr.get_or_create(2, "b.txt", || MemoryEditor::new("abcdef"));

        mgr.universal_argument(&1);
        mgr.universal_argument(&2);
        assert_eq!(mgr.prefix_argument(), Some(16));

        mgr.digit_argument(&1, 3);
        mgr.get_mut(&1)
            .unwrap()
            .run_command("forwardChar", &[])
            .unwrap();
        assert_eq!(
            mgr.get(&1).unwrap().editor().selections(),
            vec![Selection::caret(Position::new(0, 3))]
        );
        assert_eq!(mgr.prefix_argument(), None);
    }

    #[test]
    fn clipboard_only_manager_has_no_ring() {
        let options = Options {
            kill_ring: false,
            ..Options::default()
        };
        let mgr = manager(options);
        assert!(mgr.kill_ring().is_none());
    }
}
