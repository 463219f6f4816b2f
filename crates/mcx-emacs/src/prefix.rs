//! Prefix argument accumulation (`C-u`, `M-<digit>`, `M--`).
//!
//! The accumulator lives between commands only. It is cleared after every
//! dispatch, so a command sees at most one argument.
//!
//! | Keys            | Value | Accepting |
//! |-----------------|-------|-----------|
//! | `C-u`           | 4     | yes       |
//! | `C-u C-u`       | 16    | yes       |
//! | `C-u 1 2`       | 12    | yes       |
//! | `C-u 1 2 C-u`   | 12    | no        |
//! | `M-- 3`         | -3    | yes       |
//! | `M-3 1`         | 31    | yes       |
//!
//! Each mutator reports which of the two observable signals (argument value
//! and accepting flag) changed, so the caller can surface exactly those.

use tracing::debug;

/// Signals that changed during one mutating call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefixSignals {
    /// `Some(new_value)` when the argument changed.
    pub argument: Option<Option<i32>>,
    /// `Some(flag)` when the accepting flag changed.
    pub accepting: Option<bool>,
}

impl PrefixSignals {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.argument.is_none() && self.accepting.is_none()
    }
}

#[derive(Debug, Default)]
pub struct PrefixArgumentHandler {
    value: Option<i32>,
    accepting: bool,
    has_digits: bool,
    negative: bool,
    /// How many `C-u` presses built the current value.
    universal_count: u32,
}

impl PrefixArgumentHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current argument, if any.
    #[must_use]
    pub const fn value(&self) -> Option<i32> {
        self.value
    }

    #[must_use]
    pub const fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// True when a typed `-` should become a sign rather than text: the
    /// accumulator is accepting and no digit has been typed yet.
    #[must_use]
    pub const fn minus_sign_acceptable(&self) -> bool {
        self.accepting && !self.has_digits
    }

    /// True when the argument is exactly one plain `C-u`.
    #[must_use]
    pub const fn preceding_single_ctrl_u(&self) -> bool {
        matches!(self.value, Some(4))
            && self.universal_count == 1
            && !self.has_digits
            && !self.negative
    }

    /// `C-u`.
    pub fn universal_argument(&mut self) -> PrefixSignals {
        let before = self.snapshot();
        if self.accepting && (self.has_digits || self.negative) {
            // A second C-u after digits or a sign ends the argument.
            self.accepting = false;
        } else if self.accepting {
            self.value = Some(self.value.unwrap_or(1).saturating_mul(4));
            self.universal_count += 1;
        } else {
            self.value = Some(4);
            self.accepting = true;
            self.has_digits = false;
            self.negative = false;
            self.universal_count = 1;
        }
        self.signals_since(before)
    }

    /// `M-<digit>`.
    pub fn digit_argument(&mut self, digit: u8) -> PrefixSignals {
        let before = self.snapshot();
        let d = i32::from(digit.min(9));
        if self.accepting && self.has_digits {
            self.fold_digit(d);
        } else {
            self.value = Some(if self.accepting && self.negative { -d } else { d });
            self.negative = self.accepting && self.negative;
            self.has_digits = true;
            self.accepting = true;
            self.universal_count = 0;
        }
        self.signals_since(before)
    }

    /// `M--`.
    pub fn negative_argument(&mut self) -> PrefixSignals {
        let before = self.snapshot();
        self.value = Some(-1);
        self.negative = true;
        self.accepting = true;
        self.has_digits = false;
        self.universal_count = 0;
        self.signals_since(before)
    }

    /// A plain digit typed while accepting. Ignored otherwise.
    pub fn subsequent_argument_digit(&mut self, digit: u8) -> PrefixSignals {
        if !self.accepting {
            return PrefixSignals::default();
        }
        let before = self.snapshot();
        let d = i32::from(digit.min(9));
        if self.has_digits {
            self.fold_digit(d);
        } else {
            self.value = Some(if self.negative { -d } else { d });
            self.has_digits = true;
        }
        self.signals_since(before)
    }

    /// Clear everything. Called after every dispatched command.
    pub fn cancel(&mut self) -> PrefixSignals {
        let before = self.snapshot();
        *self = Self::default();
        self.signals_since(before)
    }

    fn fold_digit(&mut self, d: i32) {
        let magnitude = self
            .value
            .unwrap_or(0)
            .saturating_abs()
            .saturating_mul(10)
            .saturating_add(d);
        self.value = Some(if self.negative { -magnitude } else { magnitude });
    }

    const fn snapshot(&self) -> (Option<i32>, bool) {
        (self.value, self.accepting)
    }

    fn signals_since(&self, (value, accepting): (Option<i32>, bool)) -> PrefixSignals {
        let signals = PrefixSignals {
            argument: (value != self.value).then_some(self.value),
            accepting: (accepting != self.accepting).then_some(self.accepting),
        };
        if !signals.is_empty() {
            debug!(value = ?self.value, accepting = self.accepting, "prefix argument");
        }
        signals
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(h: &PrefixArgumentHandler) -> (Option<i32>, bool) {
        (h.value(), h.is_accepting())
    }

    // ── C-u ──────────────────────────────────────────────────────────────

    #[test]
    fn universal_once_is_four() {
        let mut h = PrefixArgumentHandler::new();
        let signals = h.universal_argument();
        assert_eq!(state(&h), (Some(4), true));
        assert_eq!(
            signals,
            PrefixSignals {
                argument: Some(Some(4)),
                accepting: Some(true),
            }
        );
        assert!(h.preceding_single_ctrl_u());
    }

    #[test]
    fn universal_multiplies_by_four() {
        let mut h = PrefixArgumentHandler::new();
        h.universal_argument();
        let signals = h.universal_argument();
        assert_eq!(state(&h), (Some(16), true));
        assert_eq!(signals.accepting, None);
        h.universal_argument();
        assert_eq!(state(&h), (Some(64), true));
        assert!(!h.preceding_single_ctrl_u());
    }

    #[test]
    fn universal_after_digits_stops_accepting() {
        let mut h = PrefixArgumentHandler::new();
        h.universal_argument();
        h.subsequent_argument_digit(1);
        h.subsequent_argument_digit(2);
        let signals = h.universal_argument();
        assert_eq!(state(&h), (Some(12), false));
        assert_eq!(
            signals,
            PrefixSignals {
                argument: None,
                accepting: Some(false),
            }
        );
    }

    #[test]
    fn digits_replace_universal_value() {
        let mut h = PrefixArgumentHandler::new();
        h.universal_argument();
        h.universal_argument();
        h.universal_argument();
        h.subsequent_argument_digit(3);
        assert_eq!(state(&h), (Some(3), true));
    }

    // ── Digits ───────────────────────────────────────────────────────────

    #[test]
    fn digit_then_subsequent_folds_decimally() {
        let mut h = PrefixArgumentHandler::new();
        h.digit_argument(3);
        h.subsequent_argument_digit(2);
        assert_eq!(state(&h), (Some(32), true));
    }

    #[test]
    fn three_digits() {
        let mut h = PrefixArgumentHandler::new();
        h.digit_argument(3);
        h.subsequent_argument_digit(1);
        h.subsequent_argument_digit(2);
        assert_eq!(h.value(), Some(312));
    }

    #[test]
    fn leading_zero_is_swallowed() {
        let mut h = PrefixArgumentHandler::new();
        h.universal_argument();
        h.subsequent_argument_digit(0);
        assert_eq!(state(&h), (Some(0), true));
        h.subsequent_argument_digit(2);
        assert_eq!(state(&h), (Some(2), true));
    }

    #[test]
    fn repeated_digit_argument_folds() {
        let mut h = PrefixArgumentHandler::new();
        h.digit_argument(1);
        h.digit_argument(2);
        assert_eq!(h.value(), Some(12));
    }

    #[test]
    fn subsequent_digit_ignored_when_idle() {
        let mut h = PrefixArgumentHandler::new();
        assert!(h.subsequent_argument_digit(5).is_empty());
        assert_eq!(state(&h), (None, false));
    }

    #[test]
    fn value_saturates() {
        let mut h = PrefixArgumentHandler::new();
        h.digit_argument(9);
        for _ in 0..20 {
            h.subsequent_argument_digit(9);
        }
        assert_eq!(h.value(), Some(i32::MAX));
    }

    // ── Negative ─────────────────────────────────────────────────────────

    #[test]
    fn negative_then_digit() {
        let mut h = PrefixArgumentHandler::new();
        h.negative_argument();
        assert_eq!(state(&h), (Some(-1), true));
        h.subsequent_argument_digit(3);
        assert_eq!(state(&h), (Some(-3), true));
        h.subsequent_argument_digit(4);
        assert_eq!(h.value(), Some(-34));
    }

    #[test]
    fn negative_then_digit_argument() {
        let mut h = PrefixArgumentHandler::new();
        h.negative_argument();
        h.digit_argument(5);
        assert_eq!(h.value(), Some(-5));
    }

    #[test]
    fn negative_overrides_universal() {
        let mut h = PrefixArgumentHandler::new();
        h.universal_argument();
        h.universal_argument();
        assert!(h.minus_sign_acceptable());
        h.negative_argument();
        assert_eq!(state(&h), (Some(-1), true));
        h.universal_argument();
        assert_eq!(state(&h), (Some(-1), false));
    }

    #[test]
    fn minus_not_acceptable_after_digits() {
        let mut h = PrefixArgumentHandler::new();
        assert!(!h.minus_sign_acceptable());
        h.universal_argument();
        h.subsequent_argument_digit(3);
        assert!(!h.minus_sign_acceptable());
    }

    // ── Cancel ───────────────────────────────────────────────────────────

    #[test]
    fn cancel_clears_and_reports() {
        let mut h = PrefixArgumentHandler::new();
        h.universal_argument();
        let signals = h.cancel();
        assert_eq!(state(&h), (None, false));
        assert_eq!(
            signals,
            PrefixSignals {
                argument: Some(None),
                accepting: Some(false),
            }
        );
        assert!(h.cancel().is_empty());
    }
}
