/// Result of a public action that did not fail.
///
/// Gate contention and listener vetoes are normal early exits, not errors.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The action ran to completion.
    Completed(T),
    /// Another action held the gate, or the widget is read-only.
    Skipped,
    /// A listener vetoed a phase, or `destroy()` ended the cycle.
    Canceled,
}

impl<T> Outcome<T> {
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    #[inline]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Outcome::Canceled)
    }

    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(v) => Outcome::Completed(f(v)),
            Outcome::Skipped => Outcome::Skipped,
            Outcome::Canceled => Outcome::Canceled,
        }
    }
}
