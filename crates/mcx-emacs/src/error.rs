//! Engine errors.
//!
//! Only contract violations and host failures are errors. Conditions a user
//! can trigger at the keyboard (yank-pop without a yank, exchanging with no
//! mark) are reported through the host's message channel and are not errors.

use thiserror::Error;

use mcx_core::host::{ClipboardError, EditError};

use crate::options::OptionError;

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("command {0} is not found")]
    CommandNotFound(String),

    /// A kill's deletion kept failing after every retry.
    #[error("edit failed after {attempts} attempts")]
    EditFailed {
        attempts: usize,
        #[source]
        source: EditError,
    },

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Option(#[from] OptionError),
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
