use std::fmt;

use catsync_types::{CatalogEntry, MatchStrategy, PartitionId};
use serde::{Deserialize, Serialize};

/// What a human needs to see of one catalog entry to judge a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub name: String,
    pub code: Option<String>,
    pub supplier: Option<String>,
}

impl From<&CatalogEntry> for EntrySummary {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            code: entry.code().map(str::to_string),
            supplier: entry.supplier_name.clone(),
        }
    }
}

impl fmt::Display for EntrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.name)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(supplier) = &self.supplier {
            write!(f, " from {supplier}")?;
        }
        Ok(())
    }
}

/// A match awaiting a human decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub partition_id: PartitionId,
    /// Display name of the target partition.
    pub partition_name: String,
    pub strategy: MatchStrategy,
    pub source: EntrySummary,
    pub target: EntrySummary,
    /// Name of the category the target entry currently points at.
    pub target_category: Option<String>,
}

impl PendingConfirmation {
    /// One-line question suitable for a prompt.
    pub fn question(&self) -> String {
        format!(
            "In \"{}\", is {} the same product as {}? (matched by {})",
            self.partition_name, self.target, self.source, self.strategy
        )
    }
}

/// The answer to a [`PendingConfirmation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Declined,
    /// The prompt was closed without an answer.
    Dismissed,
    /// No answer arrived within the configured timeout.
    TimedOut,
}

impl Verdict {
    pub fn from_bool(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Declined
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Dismissed => "dismissed",
            Self::TimedOut => "timed out",
        }
    }
}
