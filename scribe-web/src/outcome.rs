/// Result of one adapter call, as seen by the orchestrator.
///
/// Adapters never raise past the pipeline; they report what happened and the
/// pipeline decides whether to fall through to the next tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The call produced usable data.
    Acquired(T),
    /// The call succeeded but had nothing usable.
    Empty,
    /// The call failed; the reason has already been logged.
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Outcome::Acquired(_))
    }

    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Acquired(_) => "acquired",
            Outcome::Empty => "empty",
            Outcome::Failed(_) => "failed",
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Acquired(v) => Some(v),
            Outcome::Empty | Outcome::Failed(_) => None,
        }
    }
}

impl<T> Outcome<Vec<T>> {
    /// `Acquired` for a non-empty list, `Empty` otherwise.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Acquired(items)
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.into_option().unwrap_or_default()
    }
}
