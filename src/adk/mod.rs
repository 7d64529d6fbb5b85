//! ADK API client module.
//!
//! Plumbing for the backend's `/adk_api` surface: wire types, the HTTP
//! transport, session lifecycle, the SSE event stream reader, and the
//! reconciliation step that turns event logs into text.

mod reconcile;
mod session;
mod stream;
mod transport;
mod types;

pub use reconcile::{ERROR_SENTINEL, extract_text, merged_state_delta};
pub use session::SessionManager;
pub use stream::{RUN_SSE_PATH, stream_events};
pub use transport::Transport;
pub use types::*;
