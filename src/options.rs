//! Parse configuration.

use serde::Serialize;

/// What to do with a record whose discriminant is outside the known set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum UnknownKindPolicy {
    /// Fail the whole parse with the offending record.
    #[default]
    Abort,
    /// Log a warning, drop the record and keep going.
    Skip,
}

/// Options accepted by [`parse_with`](crate::parse_with).
///
/// # Example
///
/// ```
/// use evtc::{ParseOptions, UnknownKindPolicy};
///
/// let options = ParseOptions::new().skip_unknown(true);
/// assert_eq!(options.unknown_kinds, UnknownKindPolicy::Skip);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseOptions {
    /// Handling of unrecognized state changes, activations, buff removals,
    /// hit results and language codes.
    pub unknown_kinds: UnknownKindPolicy,
}

impl ParseOptions {
    /// Returns the default options (abort on unknown kinds).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the unknown-kind policy.
    #[must_use]
    pub fn unknown_kinds(mut self, policy: UnknownKindPolicy) -> Self {
        self.unknown_kinds = policy;
        self
    }

    /// Skips unknown kinds when `skip` is true, aborts otherwise.
    #[must_use]
    pub fn skip_unknown(self, skip: bool) -> Self {
        self.unknown_kinds(if skip {
            UnknownKindPolicy::Skip
        } else {
            UnknownKindPolicy::Abort
        })
    }

    pub(crate) fn skips_unknown(&self) -> bool {
        self.unknown_kinds == UnknownKindPolicy::Skip
    }
}
