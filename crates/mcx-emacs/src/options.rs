//! Engine options and the `set` directive parser.
//!
//! Options are set with the same small directive language everywhere (the
//! driver's `--set` flag, tests, an embedding host):
//!
//! | Syntax         | Effect                         |
//! |----------------|--------------------------------|
//! | `option`       | Enable boolean / query numeric |
//! | `nooption`     | Disable boolean                |
//! | `option!`      | Toggle boolean                 |
//! | `option?`      | Query current value            |
//! | `option=N`     | Assign a value                 |
//!
//! | Name                | Type    | Default |
//! |---------------------|---------|---------|
//! | `mark-ring-max`     | integer | 16      |
//! | `kill-ring-max`     | integer | 60      |
//! | `kill-retry-limit`  | integer | 3       |
//! | `kill-whole-line`   | bool    | false   |
//! | `strict-emacs-move` | bool    | false   |
//! | `kill-ring`         | bool    | true    |

use thiserror::Error;

pub const DEFAULT_MARK_RING_MAX: usize = 16;
pub const DEFAULT_KILL_RING_MAX: usize = 60;
pub const DEFAULT_KILL_RETRY_LIMIT: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    On(String),
    Off(String),
    Toggle(String),
    Query(String),
    Assign(String, String),
}

#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "kill-whole-line" | "strict-emacs-move" | "kill-ring")
}

#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    matches!(name, "mark-ring-max" | "kill-ring-max" | "kill-retry-limit")
}

/// Parse whitespace-separated directives (`"kill-whole-line kill-ring-max=10"`).
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // Only strip "no" when the rest is a real boolean option.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub mark_ring_max: usize,
    pub kill_ring_max: usize,
    /// Attempts made for a kill's deletion before giving up.
    pub kill_retry_limit: usize,
    /// `killLine` at column 0 also kills the line break.
    pub kill_whole_line: bool,
    /// `moveBeginningOfLine` always goes to column 0.
    pub strict_emacs_move: bool,
    /// When off, kills only go to the clipboard and yank pastes from it.
    pub kill_ring: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mark_ring_max: DEFAULT_MARK_RING_MAX,
            kill_ring_max: DEFAULT_KILL_RING_MAX,
            kill_retry_limit: DEFAULT_KILL_RETRY_LIMIT,
            kill_whole_line: false,
            strict_emacs_move: false,
            kill_ring: true,
        }
    }
}

impl Options {
    /// Apply one directive. Queries return the formatted current value.
    ///
    /// # Errors
    ///
    /// [`OptionError::Unknown`] for unknown names or a boolean directive on
    /// a numeric option, [`OptionError::InvalidValue`] for unparsable values.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::On(name) => self.set_bool(name, |_| true).map(|()| None),
            SetDirective::Off(name) => self.set_bool(name, |_| false).map(|()| None),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v).map(|()| None),
            SetDirective::Query(name) => self.query(name).map(Some),
            SetDirective::Assign(name, value) => self.assign(name, value).map(|()| None),
        }
    }

    /// Apply every directive in `args`, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn apply_all(&mut self, args: &str) -> Result<(), OptionError> {
        for directive in parse_set(args) {
            self.apply(&directive)?;
        }
        Ok(())
    }

    fn bool_slot(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "kill-whole-line" => Some(&mut self.kill_whole_line),
            "strict-emacs-move" => Some(&mut self.strict_emacs_move),
            "kill-ring" => Some(&mut self.kill_ring),
            _ => None,
        }
    }

    fn numeric_slot(&mut self, name: &str) -> Option<&mut usize> {
        match name {
            "mark-ring-max" => Some(&mut self.mark_ring_max),
            "kill-ring-max" => Some(&mut self.kill_ring_max),
            "kill-retry-limit" => Some(&mut self.kill_retry_limit),
            _ => None,
        }
    }

    fn set_bool(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> Result<(), OptionError> {
        let slot = self
            .bool_slot(name)
            .ok_or_else(|| OptionError::Unknown(name.to_string()))?;
        *slot = f(*slot);
        Ok(())
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        let invalid = || OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        if let Some(slot) = self.numeric_slot(name) {
            let n: usize = value.parse().map_err(|_| invalid())?;
            if n == 0 {
                return Err(invalid());
            }
            *slot = n;
            return Ok(());
        }
        if let Some(slot) = self.bool_slot(name) {
            *slot = match value {
                "true" | "on" | "1" => true,
                "false" | "off" | "0" => false,
                _ => return Err(invalid()),
            };
            return Ok(());
        }
        Err(OptionError::Unknown(name.to_string()))
    }

    fn query(&mut self, name: &str) -> Result<String, OptionError> {
        if let Some(slot) = self.numeric_slot(name) {
            return Ok(format!("{name}={slot}"));
        }
        if let Some(slot) = self.bool_slot(name) {
            return Ok(format_bool(name, *slot));
        }
        Err(OptionError::Unknown(name.to_string()))
    }
}

/// `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
