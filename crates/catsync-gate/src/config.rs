use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Configuration for confirmation prompts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Seconds to wait for an answer before treating the prompt as timed
    /// out. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl GateConfig {
    /// Configuration with a response timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_secs: Some(timeout.as_secs().max(1)),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> GateResult<()> {
        if self.timeout_secs == Some(0) {
            return Err(GateError::Config("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}
