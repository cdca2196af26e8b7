use std::fmt;

use serde::{Deserialize, Serialize};

/// How the identity resolver located an existing copy of an entry in a
/// target partition, in the order the strategies are tried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Same global root id. Authoritative.
    RootId,
    /// The source's legacy code as it was before the current edit.
    LegacyCode,
    /// Exact name.
    Name,
    /// Exact name after trimming surrounding whitespace from the source name.
    TrimmedName,
    /// A code newly assigned to the source during the current edit.
    NewCode,
}

impl MatchStrategy {
    /// Whether a match found this way must be confirmed by a human.
    pub fn requires_confirmation(&self) -> bool {
        !matches!(self, Self::RootId)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RootId => "root id",
            Self::LegacyCode => "legacy code",
            Self::Name => "name",
            Self::TrimmedName => "trimmed name",
            Self::NewCode => "new code",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
