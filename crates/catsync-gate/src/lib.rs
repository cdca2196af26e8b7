//! Confirmation gate for catsync.
//!
//! A match that is not backed by the global root id (legacy code or name)
//! may conflate two distinct products, so the orchestrator suspends and asks
//! a human before writing. The gate abstracts that question away from any
//! UI: the engine hands a [`PendingConfirmation`] to a [`ConfirmationGate`]
//! and awaits a [`Verdict`].
//!
//! # Gates
//!
//! - [`StaticGate`] -- always answers the same way; records what it was asked
//! - [`ChannelGate`] -- yields each [`ConfirmationRequest`] to an interactive
//!   caller over a channel and resumes when the caller responds
//!
//! # Quick Start
//!
//! ```rust
//! use catsync_gate::{ChannelGate, GateConfig};
//!
//! let (gate, requests) = ChannelGate::new(GateConfig::default());
//! assert!(gate.config().timeout().is_none());
//! // Hand `gate` to the engine and answer prompts from `requests`:
//! // while let Some(req) = requests.recv().await { req.accept(); }
//! # drop(requests);
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod gate;
pub mod pending;

pub use channel::{ChannelGate, ConfirmationRequest};
pub use config::GateConfig;
pub use error::{GateError, GateResult};
pub use gate::{ConfirmationGate, StaticGate};
pub use pending::{EntrySummary, PendingConfirmation, Verdict};
