//! Client library for the Manugen agent backend.
//!
//! Talks to the backend's ADK-style HTTP API: durable per-user sessions
//! with bounded creation retry, batch and SSE-streamed agent runs, and the
//! reconciliation step that folds an ordered event log into user-facing
//! text while surfacing errors agents embed in their own output.
//!
//! [`ManugenClient`] is the entry point for the agent apps; the [`adk`]
//! module exposes the underlying layers for callers that need them.

pub mod adk;
pub mod agents;
pub mod config;
pub mod error;
pub mod query;

pub use agents::{CAPITALIZER_APP, DraftOutcome, DraftRequest, ManugenClient, WRITER_APP};
pub use config::{ClientConfig, RetryPolicy};
pub use error::{ClientError, ClientResult, StructuredAgentError};
pub use query::{QuerySlot, QueryStatus, QueryTicket};
