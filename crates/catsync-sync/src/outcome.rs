use std::fmt;

use catsync_types::{MatchStrategy, Partition, PartitionId, RecordId, RootId};
use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;

/// What happened to one sibling partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Skipped,
    Failed,
}

impl SyncAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one partition's synchronization attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub partition_id: PartitionId,
    pub partition_name: String,
    pub action: SyncAction,
    pub message: String,
    /// How the target copy was identified, when one was found.
    pub strategy: Option<MatchStrategy>,
    /// Id of the written record in the target partition.
    pub record_id: Option<RecordId>,
    /// Partial failures (category/supplier) of a partition that was still written.
    pub warnings: Vec<String>,
}

impl SyncOutcome {
    pub(crate) fn new(partition: &Partition, action: SyncAction, message: impl Into<String>) -> Self {
        Self {
            partition_id: partition.id.clone(),
            partition_name: partition.display_name.clone(),
            action,
            message: message.into(),
            strategy: None,
            record_id: None,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn failed(partition: &Partition, message: impl Into<String>) -> Self {
        Self::new(partition, SyncAction::Failed, message)
    }

    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// How a sync pass ended as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every sibling partition was visited.
    Completed,
    /// The owner has a single partition; nothing to do.
    NoSiblingPartitions,
    /// Propagation on save is turned off for the owner.
    Disabled,
}

/// Everything a sync pass produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub root_id: Option<RootId>,
    pub status: RunStatus,
    pub outcomes: Vec<SyncOutcome>,
    pub transcript: Transcript,
}

impl SyncReport {
    pub(crate) fn empty(status: RunStatus, root_id: Option<RootId>, transcript: Transcript) -> Self {
        Self {
            root_id,
            status,
            outcomes: Vec::new(),
            transcript,
        }
    }

    /// Partitions that received a write.
    pub fn touched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.action, SyncAction::Created | SyncAction::Updated))
            .count()
    }

    pub fn count(&self, action: SyncAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn outcome(&self, partition: &PartitionId) -> Option<&SyncOutcome> {
        self.outcomes.iter().find(|o| &o.partition_id == partition)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.transcript)?;
        let touched = self.touched();
        write!(
            f,
            "{touched} partition{} touched",
            if touched == 1 { "" } else { "s" }
        )?;
        let failed = self.count(SyncAction::Failed);
        if failed > 0 {
            write!(f, ", {failed} failed")?;
        }
        Ok(())
    }
}
