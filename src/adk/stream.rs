//! SSE event stream reader.

use futures::StreamExt;
use reqwest_eventsource::{Error as SseError, Event as SseEvent, EventSource};
use tracing::debug;

use super::transport::Transport;
use super::types::{AdkEvent, RunRequest};
use crate::error::{ClientError, ClientResult};

/// Path of the streaming run endpoint.
pub const RUN_SSE_PATH: &str = "/adk_api/run_sse";

/// Run a request over SSE, folding fragments into an ordered log.
///
/// The observer runs synchronously after each fragment lands, with the
/// fragment and the log accumulated so far. The call resolves with the full
/// log once the server closes the stream. A transport failure before that
/// discards whatever arrived and surfaces [`ClientError::Stream`]; a
/// fragment that fails to decode surfaces [`ClientError::Decode`].
pub async fn stream_events<F>(
    transport: &Transport,
    request: &RunRequest,
    mut observer: F,
) -> ClientResult<Vec<AdkEvent>>
where
    F: FnMut(&AdkEvent, &[AdkEvent]),
{
    let mut es = EventSource::new(transport.post_stream(RUN_SSE_PATH, request))
        .map_err(|e| ClientError::Stream(e.to_string()))?;

    let mut log: Vec<AdkEvent> = Vec::new();

    while let Some(event) = es.next().await {
        match event {
            Ok(SseEvent::Open) => {}
            Ok(SseEvent::Message(msg)) => match serde_json::from_str::<AdkEvent>(&msg.data) {
                Ok(fragment) => {
                    log.push(fragment);
                    if let Some(newest) = log.last() {
                        observer(newest, &log);
                    }
                }
                Err(err) => {
                    es.close();
                    return Err(ClientError::Decode {
                        url: transport.url(RUN_SSE_PATH),
                        message: err.to_string(),
                    });
                }
            },
            // The server finished the stream; the log is complete.
            Err(SseError::StreamEnded) => {
                es.close();
                break;
            }
            Err(err) => {
                es.close();
                return Err(ClientError::Stream(err.to_string()));
            }
        }
    }

    debug!("event stream closed after {} fragments", log.len());
    Ok(log)
}
