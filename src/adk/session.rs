//! Session lifecycle for the ADK API.

use tracing::debug;

use super::transport::Transport;
use super::types::Session;
use crate::config::RetryPolicy;
use crate::error::{ClientError, ClientResult};

/// Ensures named sessions exist, creating them with bounded retry.
#[derive(Debug, Clone)]
pub struct SessionManager {
    transport: Transport,
    retry: RetryPolicy,
}

fn session_path(app_name: &str, user_id: &str, session_id: &str) -> String {
    format!(
        "/adk_api/apps/{}/users/{}/sessions/{}",
        app_name, user_id, session_id
    )
}

impl SessionManager {
    pub fn new(transport: Transport, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Return the session for (app, user, id), creating it when absent.
    ///
    /// Lookup happens once and engages no retry. When it fails, creation is
    /// attempted up to `max_retries + 1` times with a fixed delay in
    /// between, to ride out a backend that is still starting up.
    /// Intermediate failures stay at debug level; only exhaustion surfaces,
    /// wrapping the last underlying error.
    ///
    /// Creation is assumed idempotent server-side for the same triple;
    /// concurrent callers are not serialized here.
    pub async fn ensure(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> ClientResult<Session> {
        let path = session_path(app_name, user_id, session_id);

        match self.transport.get_json::<Session>(&path).await {
            Ok(session) => return Ok(session),
            Err(err) => {
                debug!("session {} lookup failed ({}), creating it", session_id, err);
            }
        }

        let body = serde_json::json!({ "state": {} });
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.transport.post_json::<_, Session>(&path, &body).await {
                Ok(session) => {
                    debug!("session {} created on attempt {}", session_id, attempt);
                    return Ok(session);
                }
                Err(err) if attempt <= self.retry.max_retries => {
                    debug!(
                        "session {} creation attempt {} failed: {}",
                        session_id, attempt, err
                    );
                    tokio::time::sleep(self.retry.retry_delay()).await;
                }
                Err(err) => {
                    return Err(ClientError::SessionCreation {
                        app_name: app_name.to_string(),
                        user_id: user_id.to_string(),
                        session_id: session_id.to_string(),
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
            }
        }
    }

    /// Look up an existing session without creating it.
    pub async fn get(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> ClientResult<Session> {
        self.transport
            .get_json(&session_path(app_name, user_id, session_id))
            .await
    }

    /// List the user's sessions for an app.
    pub async fn list(&self, app_name: &str, user_id: &str) -> ClientResult<Vec<Session>> {
        let path = format!("/adk_api/apps/{}/users/{}/sessions", app_name, user_id);
        self.transport.get_json(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_path() {
        assert_eq!(
            session_path("capitalizer", "u1", "s1"),
            "/adk_api/apps/capitalizer/users/u1/sessions/s1"
        );
    }
}
