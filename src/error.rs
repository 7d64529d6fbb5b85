//! Client error types.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the Manugen backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    ///
    /// The body of a failed response is never decoded or trusted.
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// Response body could not be decoded as the expected JSON shape.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Session lookup and every bounded creation attempt failed.
    #[error(
        "failed to create session '{session_id}' for {app_name}/{user_id} \
         after {attempts} attempts: {source}"
    )]
    SessionCreation {
        app_name: String,
        user_id: String,
        session_id: String,
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },

    /// Event stream failed before the server closed it.
    ///
    /// Whatever fragments arrived before the failure are discarded.
    #[error("event stream failed: {0}")]
    Stream(String),

    /// Operation was superseded or cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// Agent embedded a structured error in its response text.
    #[error(transparent)]
    Agent(#[from] StructuredAgentError),

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Structured error reported by an agent inside its own output.
///
/// Built from the JSON payload following the `MANUGEN_ERROR:` marker. Missing
/// payload fields fall back to fixed defaults; a payload that is not valid
/// JSON yields the `parse_error` kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredAgentError {
    /// Error category declared by the agent, or `parse_error`.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
    /// Technical details, empty when the agent gave none.
    pub details: String,
    /// Suggested remediation, empty when the agent gave none.
    pub suggestion: String,
}

impl fmt::Display for StructuredAgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if !self.suggestion.is_empty() {
            write!(f, " ({})", self.suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for StructuredAgentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_display_without_suggestion() {
        let err = StructuredAgentError {
            kind: "tool_failure".to_string(),
            message: "search unavailable".to_string(),
            details: String::new(),
            suggestion: String::new(),
        };
        assert_eq!(err.to_string(), "tool_failure: search unavailable");
    }

    #[test]
    fn test_agent_error_display_with_suggestion() {
        let err = StructuredAgentError {
            kind: "rate_limited".to_string(),
            message: "too many requests".to_string(),
            details: "429".to_string(),
            suggestion: "retry later".to_string(),
        };
        assert_eq!(err.to_string(), "rate_limited: too many requests (retry later)");
    }

    #[test]
    fn test_agent_error_converts_to_client_error() {
        let err: ClientError = StructuredAgentError {
            kind: "x".to_string(),
            message: "m".to_string(),
            details: String::new(),
            suggestion: String::new(),
        }
        .into();
        assert!(matches!(err, ClientError::Agent(_)));
        assert_eq!(err.to_string(), "x: m");
    }
}
