//! High-level client for the Manugen agent apps.

use serde_json::{Map, Value};
use tracing::debug;

use crate::adk::{
    AdkEvent, Attachment, NewMessage, Part, RunRequest, Session, SessionManager, Transport,
    extract_text, merged_state_delta, stream_events,
};
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// App name of the capitalizer agent.
pub const CAPITALIZER_APP: &str = "capitalizer";
/// App name of the science-writer agent.
pub const WRITER_APP: &str = "ai_science_writer";

/// Path of the batch run endpoint.
const RUN_PATH: &str = "/adk_api/run";

/// Client facade combining transport, session management, and
/// reconciliation into per-agent operations.
#[derive(Debug, Clone)]
pub struct ManugenClient {
    transport: Transport,
    sessions: SessionManager,
}

/// Instructions plus attachments for the science writer.
#[derive(Debug, Clone, Default)]
pub struct DraftRequest {
    /// Free-form instructions for the writer.
    pub instructions: String,
    /// Files to pass along as inline data.
    pub attachments: Vec<Attachment>,
}

/// Result of a completed draft run.
#[derive(Debug, Clone)]
pub struct DraftOutcome {
    /// Reconciled text of the final fragment.
    pub text: String,
    /// State entries merged across the run, later fragments winning.
    pub state: Map<String, Value>,
    /// Full event log, in arrival order.
    pub events: Vec<AdkEvent>,
}

fn capitalizer_prompt(input: &str) -> String {
    format!("Capitalize every word in this text: \"{}\"", input)
}

fn draft_message(request: &DraftRequest) -> NewMessage {
    let mut parts = vec![Part::Text(request.instructions.clone())];
    parts.extend(request.attachments.iter().map(Attachment::inline_part));
    NewMessage {
        role: "user".to_string(),
        parts,
    }
}

impl ManugenClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let transport = Transport::new(config)?;
        let sessions = SessionManager::new(transport.clone(), config.retry);
        Ok(Self {
            transport,
            sessions,
        })
    }

    /// Session operations.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Whether the backend answers its health endpoint.
    pub async fn health(&self) -> ClientResult<bool> {
        self.transport.probe("/health").await
    }

    /// Capitalize every word of `input` via the capitalizer agent.
    ///
    /// Ensures the session, runs one batch request, and returns the text of
    /// the final response fragment.
    pub async fn capitalize(
        &self,
        user_id: &str,
        session_id: &str,
        input: &str,
    ) -> ClientResult<String> {
        self.sessions
            .ensure(CAPITALIZER_APP, user_id, session_id)
            .await?;

        let request = RunRequest {
            app_name: CAPITALIZER_APP.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            new_message: NewMessage::text(capitalizer_prompt(input)),
        };

        let events: Vec<AdkEvent> = self.transport.post_json(RUN_PATH, &request).await?;
        debug!("capitalizer returned {} fragments", events.len());
        extract_text(&events, true)
    }

    /// Run the science writer over a streamed event log.
    ///
    /// `progress` observes every fragment as it arrives together with the
    /// log so far; it is presentation-only and cannot affect the outcome.
    /// The returned outcome carries the final text, the merged state delta,
    /// and the complete log.
    pub async fn draft<F>(
        &self,
        user_id: &str,
        session_id: &str,
        request: &DraftRequest,
        progress: F,
    ) -> ClientResult<DraftOutcome>
    where
        F: FnMut(&AdkEvent, &[AdkEvent]),
    {
        self.sessions.ensure(WRITER_APP, user_id, session_id).await?;

        let run = RunRequest {
            app_name: WRITER_APP.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            new_message: draft_message(request),
        };

        let events = stream_events(&self.transport, &run, progress).await?;
        let text = extract_text(&events, true)?;
        let state = merged_state_delta(&events);

        Ok(DraftOutcome {
            text,
            state,
            events,
        })
    }

    /// Convenience passthrough for [`SessionManager::ensure`].
    pub async fn ensure_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> ClientResult<Session> {
        self.sessions.ensure(app_name, user_id, session_id).await
    }
}
