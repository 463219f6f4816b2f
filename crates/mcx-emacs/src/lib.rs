//! # mcx-emacs: Emacs editing semantics over a host editor
//!
//! The engine gives any [`TextEditor`](mcx_core::host::TextEditor) the parts
//! of Emacs that are about state rather than keys:
//!
//! - **[`prefix`]**: the `C-u` / `M-<digit>` / `M--` argument accumulator
//! - **[`mark`]**: multi-cursor marks and the mark ring
//! - **[`kill_ring`]** and **[`kill_yank`]**: kill entries that remember
//!   one text per cursor, append runs, yank and yank-pop
//! - **[`rectangle`]**: rectangle mark mode and rectangle kill/yank
//! - **[`command`]**: command objects registered by id, dispatched through
//!   [`Emulator::run_command`]
//! - **[`emulator`]**: per-editor state and reconciliation with changes the
//!   engine did not make
//! - **[`manager`]**: one emulator per editor with a shared kill ring
//! - **[`options`]**: `:set`-style configuration
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use mcx_core::memory::{MemoryClipboard, MemoryEditor};
//! use mcx_emacs::{Emulator, Options};
//!
//! let mut emacs = Emulator::standalone(
//!     MemoryEditor::new("hello world"),
//!     Rc::new(MemoryClipboard::default()),
//!     Options::default(),
//! );
//! emacs.run_command("killWord", &[]).unwrap();
//! emacs.run_command("endOfBuffer", &[]).unwrap();
//! emacs.run_command("yank", &[]).unwrap();
//! assert_eq!(emacs.editor().contents(), " worldhello");
//! ```

pub mod command;
pub mod emulator;
pub mod error;
pub mod kill_ring;
pub mod kill_yank;
pub mod manager;
pub mod mark;
pub mod options;
pub mod prefix;
pub mod rectangle;

pub use emulator::Emulator;
pub use error::{EmulatorError, Result};
pub use manager::EmulatorManager;
pub use options::Options;
