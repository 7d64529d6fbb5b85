//! Scripted mock of the Manugen ADK backend, shared by integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use manugen_client::adk::{AdkEvent, Content, EventActions, FunctionResponse, Part, Session};
use manugen_client::{ClientConfig, RetryPolicy};

/// Scripted behavior for one mock backend instance.
#[derive(Debug, Default)]
pub struct MockOptions {
    /// Whether session GETs find an existing session.
    pub session_exists: bool,
    /// Session creation POSTs that fail before one succeeds.
    pub create_failures: u32,
    /// Events served by the run and run_sse endpoints.
    pub run_events: Vec<AdkEvent>,
    /// Break the SSE connection after this many fragments.
    pub abort_stream_after: Option<usize>,
    /// Serve an undecodable SSE payload after this many fragments.
    pub corrupt_stream_after: Option<usize>,
    /// Raw reply served by the batch run endpoint instead of the event log.
    pub run_body: Option<serde_json::Value>,
}

/// Counters and captures recorded while serving.
pub struct MockState {
    pub options: MockOptions,
    remaining_create_failures: AtomicU32,
    pub session_gets: AtomicU32,
    pub session_posts: AtomicU32,
    pub runs: AtomicU32,
    pub last_run_request: Mutex<Option<serde_json::Value>>,
    pub last_create_request: Mutex<Option<serde_json::Value>>,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Bind an ephemeral port and serve the scripted backend on it.
    pub async fn start(options: MockOptions) -> Self {
        let state = Arc::new(MockState {
            remaining_create_failures: AtomicU32::new(options.create_failures),
            options,
            session_gets: AtomicU32::new(0),
            session_posts: AtomicU32::new(0),
            runs: AtomicU32::new(0),
            last_run_request: Mutex::new(None),
            last_create_request: Mutex::new(None),
        });

        let app = Router::new()
            .route("/health", get(health))
            .route(
                "/adk_api/apps/{app}/users/{user}/sessions",
                get(list_sessions),
            )
            .route(
                "/adk_api/apps/{app}/users/{user}/sessions/{id}",
                get(get_session).post(create_session),
            )
            .route("/adk_api/run", post(run))
            .route("/adk_api/run_sse", post(run_sse))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointed at this mock, with fast retries.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url(),
            connect_timeout_secs: 5,
            request_timeout_secs: 5,
            retry: RetryPolicy {
                max_retries: 5,
                retry_delay_ms: 50,
            },
        }
    }

    pub fn session_gets(&self) -> u32 {
        self.state.session_gets.load(Ordering::SeqCst)
    }

    pub fn session_posts(&self) -> u32 {
        self.state.session_posts.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> u32 {
        self.state.runs.load(Ordering::SeqCst)
    }

    pub fn last_run_request(&self) -> Option<serde_json::Value> {
        self.state.last_run_request.lock().unwrap().clone()
    }

    pub fn last_create_request(&self) -> Option<serde_json::Value> {
        self.state.last_create_request.lock().unwrap().clone()
    }
}

fn make_session(app: &str, user: &str, id: &str) -> Session {
    Session {
        id: id.to_string(),
        app_name: app.to_string(),
        user_id: user.to_string(),
        ..Session::default()
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_sessions(
    State(state): State<Arc<MockState>>,
    Path((app, user)): Path<(String, String)>,
) -> Json<Vec<Session>> {
    if state.options.session_exists {
        Json(vec![make_session(&app, &user, "existing")])
    } else {
        Json(Vec::new())
    }
}

async fn get_session(
    State(state): State<Arc<MockState>>,
    Path((app, user, id)): Path<(String, String, String)>,
) -> Result<Json<Session>, StatusCode> {
    state.session_gets.fetch_add(1, Ordering::SeqCst);
    if state.options.session_exists {
        Ok(Json(make_session(&app, &user, &id)))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn create_session(
    State(state): State<Arc<MockState>>,
    Path((app, user, id)): Path<(String, String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Session>, StatusCode> {
    let attempt = state.session_posts.fetch_add(1, Ordering::SeqCst) + 1;
    *state.last_create_request.lock().unwrap() = Some(body);

    // Decrement-if-positive; positive means this attempt is scripted to fail
    let failing = state
        .remaining_create_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let mut session = make_session(&app, &user, &id);
    session
        .state
        .insert("attempt".to_string(), serde_json::json!(attempt));
    Ok(Json(session))
}

async fn run(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.runs.fetch_add(1, Ordering::SeqCst);
    *state.last_run_request.lock().unwrap() = Some(body);
    let reply = match &state.options.run_body {
        Some(raw) => raw.clone(),
        None => serde_json::json!(state.options.run_events),
    };
    Json(reply)
}

async fn run_sse(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> Sse<ReceiverStream<Result<Event, std::io::Error>>> {
    state.runs.fetch_add(1, Ordering::SeqCst);
    *state.last_run_request.lock().unwrap() = Some(body);

    let events = state.options.run_events.clone();
    let abort_after = state.options.abort_stream_after;
    let corrupt_after = state.options.corrupt_stream_after;
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        for (index, event) in events.into_iter().enumerate() {
            if Some(index) == abort_after {
                let _ = tx
                    .send(Err(std::io::Error::other("scripted stream abort")))
                    .await;
                return;
            }
            if Some(index) == corrupt_after {
                let _ = tx.send(Ok(Event::default().data("this is not an event"))).await;
                return;
            }
            let data = serde_json::to_string(&event).unwrap();
            if tx.send(Ok(Event::default().data(data))).await.is_err() {
                return;
            }
        }
        // Dropping the sender ends the stream cleanly
    });

    Sse::new(ReceiverStream::new(rx))
}

/// Fragment carrying a single text part.
pub fn text_event(text: &str) -> AdkEvent {
    AdkEvent {
        content: Some(Content {
            parts: vec![Part::Text(text.to_string())],
            role: Some("model".to_string()),
        }),
        author: Some("mock".to_string()),
        ..AdkEvent::default()
    }
}

/// Fragment writing `delta` into the session state.
pub fn state_event(delta: serde_json::Value) -> AdkEvent {
    let map = delta.as_object().cloned().unwrap_or_default();
    AdkEvent {
        actions: Some(EventActions {
            state_delta: map,
            ..EventActions::default()
        }),
        ..AdkEvent::default()
    }
}

/// Fragment recording a hand-off to another agent.
pub fn transfer_event(agent: &str) -> AdkEvent {
    AdkEvent {
        content: Some(Content {
            parts: vec![Part::FunctionResponse(FunctionResponse {
                id: None,
                name: "transfer_to_agent".to_string(),
                response: None,
            })],
            role: Some("model".to_string()),
        }),
        actions: Some(EventActions {
            transfer_to_agent: Some(agent.to_string()),
            ..EventActions::default()
        }),
        ..AdkEvent::default()
    }
}
