//! Wire types for the ADK API.
//!
//! Everything here mirrors the backend's camelCase JSON. Event fragments are
//! tolerant of absent fields; parts are not, see [`Part`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-side conversational context, keyed by app, user, and session id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Server-assigned identifier. May differ from the requested session id.
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    /// Arbitrary key/value state attached to the session.
    #[serde(default)]
    pub state: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<f64>,
    /// Events recorded against the session so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<AdkEvent>,
}

/// One unit of agent output, delivered streamed or batched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdkEvent {
    /// Payload parts. Absent on bookkeeping-only fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Marks an incomplete chunk of a larger response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,

    /// Token accounting, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// Side effects carried alongside the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<EventActions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,

    /// Producing agent or "user".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Seconds since the epoch, as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl AdkEvent {
    /// Agent the backend handed control to, when this fragment records one.
    pub fn transfer_to_agent(&self) -> Option<&str> {
        self.actions.as_ref()?.transfer_to_agent.as_deref()
    }

    /// True when any part of this fragment carries text.
    pub fn has_text(&self) -> bool {
        self.content
            .as_ref()
            .is_some_and(|content| content.parts.iter().any(|part| matches!(part, Part::Text(_))))
    }

    /// True when this fragment is an incomplete chunk.
    pub fn is_partial(&self) -> bool {
        self.partial.unwrap_or(false)
    }
}

/// Ordered parts plus the role that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    /// "user" or "model".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Smallest typed content unit inside a fragment.
///
/// The wire tags a part by which field is present. Decoding recognizes the
/// tags in a fixed order (text, functionCall, functionResponse, inlineData)
/// and rejects parts that carry none of them, so an unexpected part shape
/// fails loudly instead of vanishing from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPart", into = "RawPart")]
pub enum Part {
    /// Plain text produced by an agent or the user.
    Text(String),
    /// Tool invocation requested by the model.
    FunctionCall(FunctionCall),
    /// Tool result echoed back through the stream.
    FunctionResponse(FunctionResponse),
    /// Embedded file content.
    InlineData(InlineData),
}

/// Untagged wire shape a [`Part`] is decoded from and encoded to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl TryFrom<RawPart> for Part {
    type Error = String;

    fn try_from(raw: RawPart) -> Result<Self, Self::Error> {
        if let Some(text) = raw.text {
            Ok(Part::Text(text))
        } else if let Some(call) = raw.function_call {
            Ok(Part::FunctionCall(call))
        } else if let Some(response) = raw.function_response {
            Ok(Part::FunctionResponse(response))
        } else if let Some(data) = raw.inline_data {
            Ok(Part::InlineData(data))
        } else {
            Err("part carries no recognized content field".to_string())
        }
    }
}

impl From<Part> for RawPart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => RawPart {
                text: Some(text),
                ..RawPart::default()
            },
            Part::FunctionCall(call) => RawPart {
                function_call: Some(call),
                ..RawPart::default()
            },
            Part::FunctionResponse(response) => RawPart {
                function_response: Some(response),
                ..RawPart::default()
            },
            Part::InlineData(data) => RawPart {
                inline_data: Some(data),
                ..RawPart::default()
            },
        }
    }
}

/// Tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

/// Result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

/// Inline file payload, used for uploads and returned artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub data: String,
    pub mime_type: String,
}

/// Side-channel effects carried by a fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActions {
    /// Session state entries written by this fragment.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub state_delta: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub artifact_delta: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub requested_auth_configs: Map<String, Value>,
    /// Agent the run was handed off to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_to_agent: Option<String>,
}

/// Token counters reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

/// Payload for the run and run_sse endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: NewMessage,
}

/// User turn submitted to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: String,
    pub parts: Vec<Part>,
}

impl NewMessage {
    /// Message holding a single text part from the user.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// File attached to an agent request. Content extraction happens upstream;
/// `data` already holds the text to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub data: String,
}

impl Attachment {
    /// Wire part for this attachment.
    pub fn inline_part(&self) -> Part {
        Part::InlineData(InlineData {
            display_name: Some(self.filename.clone()),
            data: self.data.clone(),
            mime_type: self.mime_type.clone(),
        })
    }
}
