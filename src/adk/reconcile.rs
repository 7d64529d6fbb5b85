//! Event log reconciliation.
//!
//! Turns a raw event log into user-facing text and surfaces structured
//! errors that agents embed in their own output behind a fixed marker.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{AdkEvent, Part};
use crate::error::{ClientResult, StructuredAgentError};

/// Marker preceding an embedded structured-error payload.
pub const ERROR_SENTINEL: &str = "MANUGEN_ERROR:";

/// Matches the marker and the smallest JSON object following it.
static SENTINEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)MANUGEN_ERROR:\s*(\{.*?\})").expect("sentinel pattern compiles"));

/// Wire shape of the embedded error payload.
#[derive(Debug, Deserialize)]
struct SentinelPayload {
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

const FALLBACK_KIND: &str = "unknown_error";
const FALLBACK_MESSAGE: &str = "An error occurred";

/// Extract user-facing text from an event log.
///
/// Each fragment with content contributes one section: its text parts joined
/// with a newline, in part order. A fragment whose parts hold no text
/// contributes an empty section; fragments without content are skipped
/// entirely. Sections join with newlines, so with `only_last` false the
/// result has one line per content-carrying fragment.
///
/// `only_last` narrows the result to the final section, but the error marker
/// is searched across all sections first; an embedded error anywhere in the
/// log fails the call regardless of which part of the text was requested.
///
/// An empty log yields an empty string.
pub fn extract_text(events: &[AdkEvent], only_last: bool) -> ClientResult<String> {
    let sections: Vec<String> = events
        .iter()
        .filter_map(|event| event.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    let all_text = sections.join("\n");

    detect_embedded_error(&all_text)?;

    if only_last {
        Ok(sections.last().cloned().unwrap_or_default())
    } else {
        Ok(all_text)
    }
}

/// Fail when the error marker appears anywhere in the text.
///
/// The first occurrence wins. A payload that parses maps onto
/// [`StructuredAgentError`] with per-field fallbacks; one that does not
/// yields the fixed `parse_error` shape.
fn detect_embedded_error(text: &str) -> Result<(), StructuredAgentError> {
    let Some(captures) = SENTINEL_RE.captures(text) else {
        return Ok(());
    };

    match serde_json::from_str::<SentinelPayload>(&captures[1]) {
        Ok(payload) => Err(StructuredAgentError {
            kind: payload.error_type.unwrap_or_else(|| FALLBACK_KIND.to_string()),
            message: payload
                .message
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            details: payload.details.unwrap_or_default(),
            suggestion: payload.suggestion.unwrap_or_default(),
        }),
        Err(_) => Err(StructuredAgentError {
            kind: "parse_error".to_string(),
            message: FALLBACK_MESSAGE.to_string(),
            details: String::new(),
            suggestion: String::new(),
        }),
    }
}

/// Fold `stateDelta` entries across the log, later fragments winning.
pub fn merged_state_delta(events: &[AdkEvent]) -> Map<String, Value> {
    let mut merged = Map::new();
    for event in events {
        if let Some(actions) = &event.actions {
            for (key, value) in &actions.state_delta {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}
