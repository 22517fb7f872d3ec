//! HTTP transport: request construction, status handling and SSE delivery.

use crate::config::ClientConfig;
use crate::providers::openai::types::OpenAIError;
use crate::response::CompletionResponse;
use crate::sse_stream::SseStreamExt;
use crate::Error;
use futures_util::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Consumer invoked once per streamed frame.
pub type ChunkHandler<'a> = dyn FnMut(&dyn CompletionResponse) + Send + 'a;

/// Authenticated JSON-over-HTTP client for one API base URL.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_key: String,
    organization: Option<String>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

impl HttpClient {
    /// Create a transport from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            api_key: config.api_key.clone(),
            organization: config.organization.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an authenticated request with `body` serialized as JSON.
    pub fn new_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<RequestBuilder, Error> {
        let body = serde_json::to_vec(body)?;

        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(organization) = &self.organization {
            request = request.header("OpenAI-Organization", organization);
        }

        Ok(request)
    }

    /// Execute one request/response cycle. Non-success statuses become errors.
    pub async fn perform_request(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(status = %status, "HTTP request successful");
            return Ok(response);
        }

        warn!(status = %status, "API returned error status");
        let body = response.text().await?;
        Err(status_error(status, &body))
    }

    /// Decode a complete JSON body.
    pub async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute a streaming request and hand each frame to `on_chunk`.
    ///
    /// Every frame is decoded into `slot`, delivered, then `slot` is reset
    /// before the next read. Returns `Ok(())` only on the `[DONE]` marker.
    /// An error object or `error` event ends the stream with
    /// [`Error::Streaming`] and is never delivered to `on_chunk`.
    #[tracing::instrument(name = "sse_stream", skip_all, err)]
    pub async fn send_and_on_data<R>(
        &self,
        request: RequestBuilder,
        slot: &mut R,
        cancel: &CancellationToken,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<(), Error>
    where
        R: CompletionResponse + DeserializeOwned,
    {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = self.perform_request(request) => response?,
        };

        let mut frames = response.bytes_stream().sse_frames();
        let mut delivered = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(frames = delivered, "stream cancelled");
                    return Err(Error::Cancelled);
                }
                next = frames.next() => next,
            };

            let frame = match next {
                Some(frame) => frame?,
                None => {
                    warn!(frames = delivered, "stream closed without end marker");
                    return Err(Error::StreamInterrupted { frames: delivered });
                }
            };

            if frame.is_end_marker() {
                debug!(frames = delivered, "stream completed");
                return Ok(());
            }

            if let Some(error) = OpenAIError::from_frame(&frame.data) {
                warn!(frames = delivered, "server sent an error mid-stream");
                return Err(Error::streaming(format!(
                    "server error after {delivered} frame(s): {}",
                    error.describe()
                )));
            }
            if frame.is_error_event() {
                warn!(frames = delivered, "server sent an error event mid-stream");
                return Err(Error::streaming(format!(
                    "server error after {delivered} frame(s): {}",
                    frame.data.trim()
                )));
            }

            *slot = serde_json::from_str(&frame.data)?;
            on_chunk(&*slot);
            slot.reset();
            delivered += 1;
        }
    }
}

fn status_error(status: StatusCode, body: &str) -> Error {
    let message = OpenAIError::message_from_body(body);
    match status {
        StatusCode::UNAUTHORIZED => Error::auth(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimit(message),
        _ => Error::api(status.as_u16(), message),
    }
}
