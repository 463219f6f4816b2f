//! # mcx-core: host primitives for the mcx Emacs engine
//!
//! This crate holds everything the engine needs to know about a text editor
//! without being one:
//!
//! - **[`position`]**: `Position` (line, col), `Range` and `Selection`, 0-indexed
//! - **[`change`]**: `TextEdit` requests, `ContentChange` reports and the
//!   position-drift transform that carries positions across edits
//! - **[`host`]**: the `TextEditor` and `Clipboard` traits, notifications,
//!   motions and context keys
//! - **[`buffer`]**: a rope-backed `Buffer` with batch edits
//! - **[`word`]** and **[`motion`]**: Emacs word boundaries and cursor motions
//! - **[`memory`]**: `MemoryEditor` and `MemoryClipboard`, a complete
//!   in-memory host

pub mod buffer;
pub mod change;
pub mod host;
pub mod memory;
pub mod motion;
pub mod position;
pub mod word;
