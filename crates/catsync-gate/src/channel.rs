use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::gate::ConfirmationGate;
use crate::pending::{PendingConfirmation, Verdict};

/// A confirmation handed to the interactive caller.
///
/// Answer it with [`accept`](Self::accept), [`decline`](Self::decline) or
/// [`respond`](Self::respond). Dropping it unanswered counts as dismissing
/// the prompt.
#[derive(Debug)]
pub struct ConfirmationRequest {
    pub pending: PendingConfirmation,
    responder: oneshot::Sender<bool>,
}

impl ConfirmationRequest {
    pub fn respond(self, accepted: bool) {
        // The engine may have timed out and stopped listening.
        let _ = self.responder.send(accepted);
    }

    pub fn accept(self) {
        self.respond(true);
    }

    pub fn decline(self) {
        self.respond(false);
    }
}

/// A gate that yields each pending confirmation to its caller over a
/// channel and resumes the engine when the caller responds.
#[derive(Clone, Debug)]
pub struct ChannelGate {
    requests: mpsc::Sender<ConfirmationRequest>,
    config: GateConfig,
}

impl ChannelGate {
    /// Create the gate and the receiving end the caller answers from.
    pub fn new(config: GateConfig) -> (Self, mpsc::Receiver<ConfirmationRequest>) {
        let (tx, rx) = mpsc::channel(1);
        (
            Self {
                requests: tx,
                config,
            },
            rx,
        )
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Hand the request to the caller and wait for the answer.
    async fn exchange(&self, request: &PendingConfirmation) -> GateResult<Verdict> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(ConfirmationRequest {
                pending: request.clone(),
                responder: tx,
            })
            .await
            .map_err(|_| GateError::Unavailable)?;
        debug!(partition = %request.partition_id, "awaiting confirmation");

        Ok(match rx.await {
            Ok(accepted) => Verdict::from_bool(accepted),
            Err(_) => Verdict::Dismissed,
        })
    }
}

#[async_trait]
impl ConfirmationGate for ChannelGate {
    /// The timeout, when configured, covers both queueing the request and
    /// waiting for its answer.
    async fn confirm(&self, request: &PendingConfirmation) -> GateResult<Verdict> {
        match self.config.timeout() {
            Some(limit) => match tokio::time::timeout(limit, self.exchange(request)).await {
                Ok(verdict) => verdict,
                Err(_) => {
                    debug!(partition = %request.partition_id, "confirmation timed out");
                    Ok(Verdict::TimedOut)
                }
            },
            None => self.exchange(request).await,
        }
    }
}
