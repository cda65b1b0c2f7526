use std::fmt;

/// Public action contending for the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// `load()` and `reload()`.
    Load,
    /// `submit()`.
    Submit,
    /// `draft()`.
    Draft,
}

impl Action {
    /// Lower-case action name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::Submit => "submit",
            Action::Draft => "draft",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
