use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GateResult;
use crate::pending::{PendingConfirmation, Verdict};

/// Asks a human whether a non-authoritative match is really the same product.
///
/// `confirm` may suspend for as long as the human takes to answer. The
/// orchestrator awaits one confirmation at a time, so implementations never
/// see overlapping requests from a single sync pass.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, request: &PendingConfirmation) -> GateResult<Verdict>;
}

/// A gate that answers every request with the same verdict.
///
/// Used for headless runs (`--accept-all`, `--decline-all`) and tests. Every
/// request is recorded so callers can inspect what would have been asked.
#[derive(Debug)]
pub struct StaticGate {
    verdict: Verdict,
    asked: Mutex<Vec<PendingConfirmation>>,
}

impl StaticGate {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn accept_all() -> Self {
        Self::new(Verdict::Accepted)
    }

    pub fn decline_all() -> Self {
        Self::new(Verdict::Declined)
    }

    /// Requests seen so far, oldest first.
    pub fn asked(&self) -> Vec<PendingConfirmation> {
        self.asked.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ConfirmationGate for StaticGate {
    async fn confirm(&self, request: &PendingConfirmation) -> GateResult<Verdict> {
        self.asked
            .lock()
            .expect("lock poisoned")
            .push(request.clone());
        tracing::debug!(partition = %request.partition_id, verdict = self.verdict.label(), "static confirmation");
        Ok(self.verdict)
    }
}
