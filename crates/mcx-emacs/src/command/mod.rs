//! Command objects and the registry that dispatches to them.
//!
//! Every emulated Emacs command is a type implementing [`Command`],
//! registered under a stable string id. The registry builds each command
//! lazily on first use and keeps the instance, so commands can carry state
//! between invocations (`recenterTopBottom` remembers where it is in its
//! cycle).
//!
//! Commands that need to hear about outside changes expose
//! [`Interruptible`] and are registered with
//! [`CommandRegistry::register_interruptible`]. The registry keeps those in
//! their own list, in registration order, and only they are notified.

pub mod cursor;
pub mod edit;
pub mod kill;
pub mod mark;
pub mod motion;
pub mod recenter;

use std::collections::HashMap;

use mcx_core::host::TextEditor;

use crate::emulator::Emulator;
use crate::error::Result;

/// What a command gets besides the emulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub mark_active: bool,
    pub prefix_argument: Option<i32>,
    /// The prefix argument is exactly one plain `C-u`.
    pub single_universal: bool,
    /// Extra arguments passed to `run_command`.
    pub args: Vec<String>,
}

impl Invocation {
    /// The prefix argument as a repeat count, 1 when absent.
    #[must_use]
    pub fn repeat(&self) -> i32 {
        self.prefix_argument.unwrap_or(1)
    }
}

pub trait Command<E: TextEditor> {
    /// # Errors
    ///
    /// Whatever the command's edits or clipboard access return.
    fn execute(&mut self, emacs: &mut Emulator<E>, inv: &Invocation) -> Result<()>;

    /// The command's interruption hook, if it has one.
    fn as_interruptible(&mut self) -> Option<&mut dyn Interruptible> {
        None
    }
}

/// Commands that reset state when the editor changes under them.
pub trait Interruptible {
    fn on_interrupted(&mut self);
}

pub type Factory<E> = fn() -> Box<dyn Command<E>>;

/// Factory for any default-constructible command.
#[must_use]
pub fn make<E: TextEditor, C: Command<E> + Default + 'static>() -> Box<dyn Command<E>> {
    Box::<C>::default()
}

struct Entry<E: TextEditor> {
    id: &'static str,
    factory: Factory<E>,
    instance: Option<Box<dyn Command<E>>>,
}

pub struct CommandRegistry<E: TextEditor> {
    entries: Vec<Entry<E>>,
    index: HashMap<&'static str, usize>,
    interruptibles: Vec<usize>,
}

impl<E: TextEditor> CommandRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            interruptibles: Vec::new(),
        }
    }

    /// A registry holding every built-in command.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        mark::register(&mut registry);
        motion::register(&mut registry);
        edit::register(&mut registry);
        kill::register(&mut registry);
        cursor::register(&mut registry);
        recenter::register(&mut registry);
        registry
    }

    /// Register `factory` under `id`. A second registration of the same id
    /// replaces the first.
    pub fn register(&mut self, id: &'static str, factory: Factory<E>) {
        self.insert(id, factory);
    }

    /// Register a command whose [`Interruptible`] hook should be called.
    pub fn register_interruptible(&mut self, id: &'static str, factory: Factory<E>) {
        let idx = self.insert(id, factory);
        if !self.interruptibles.contains(&idx) {
            self.interruptibles.push(idx);
        }
    }

    fn insert(&mut self, id: &'static str, factory: Factory<E>) -> usize {
        let entry = Entry {
            id,
            factory,
            instance: None,
        };
        if let Some(&idx) = self.index.get(id) {
            self.entries[idx] = entry;
            idx
        } else {
            self.entries.push(entry);
            let idx = self.entries.len() - 1;
            self.index.insert(id, idx);
            idx
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Take the command out for one invocation, building it if needed.
    ///
    /// A command that is already taken (a command running itself) gets a
    /// fresh instance.
    pub fn take(&mut self, id: &str) -> Option<(&'static str, Box<dyn Command<E>>)> {
        let &idx = self.index.get(id)?;
        let entry = &mut self.entries[idx];
        let command = entry.instance.take().unwrap_or_else(entry.factory);
        Some((entry.id, command))
    }

    /// Put a taken command back.
    pub fn restore(&mut self, id: &str, command: Box<dyn Command<E>>) {
        if let Some(&idx) = self.index.get(id) {
            self.entries[idx].instance = Some(command);
        }
    }

    /// Call every interruptible command that has been built, in
    /// registration order.
    pub fn notify_interrupted(&mut self) {
        for &idx in &self.interruptibles {
            if let Some(interruptible) = self.entries[idx]
                .instance
                .as_mut()
                .and_then(|command| command.as_interruptible())
            {
                interruptible.on_interrupted();
            }
        }
    }
}

impl<E: TextEditor> Default for CommandRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
