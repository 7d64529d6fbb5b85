//! HTTP transport for the ADK API.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Thin wrapper around [`reqwest::Client`] that classifies failures.
///
/// Issues exactly one HTTP request per call and never retries; retry policy
/// belongs to the callers.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl Transport {
    /// Build a transport from configuration.
    ///
    /// Only the connect timeout goes on the shared client. A client-wide
    /// deadline would cut long-lived event streams short, so the
    /// non-streaming helpers apply the request timeout per call instead.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        decode_response(&url, response).await
    }

    /// POST a JSON body and decode a JSON reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await?;

        decode_response(&url, response).await
    }

    /// Request builder for a streaming POST. No per-request deadline.
    pub fn post_stream<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Accept", "text/event-stream")
            .json(body)
    }

    /// Probe a path, reporting only whether it answered successfully.
    pub async fn probe(&self, path: &str) -> ClientResult<bool> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.request_timeout)
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

/// Check the status, then decode the body.
///
/// A non-success status wins over whatever the body holds; the body of a
/// failed response is never decoded.
async fn decode_response<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> ClientResult<T> {
    let status = response.status();

    if !status.is_success() {
        return Err(ClientError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.json().await.map_err(|e| ClientError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
