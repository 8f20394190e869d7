//! Chat API client struct and builder.

use tally_types::{ChatError, ChatObserver, ChatRequest, ChatStream};
use tokio_util::sync::CancellationToken;

use crate::decoder::DEFAULT_MAX_FRAME_BYTES;
use crate::error::{map_http_status, map_reqwest_error};
use crate::session::{self, ChatHandle};
use crate::streaming::stream_frames;

/// Default backend base URL (a reverse proxy in front of the suite).
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default auth header name.
const DEFAULT_AUTH_HEADER: &str = "authorization";

/// Client for the Tally assistant chat API.
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
///
/// # Example
///
/// ```no_run
/// use tally_chat::ChatClient;
///
/// let client = ChatClient::new("api-token")
///     .base_url("https://tally.example.com")
///     .model("ledger-7b");
/// ```
#[derive(Clone)]
pub struct ChatClient {
    /// Bearer token sent on every request.
    pub(crate) token: String,
    /// Header name the token is sent under.
    pub(crate) auth_header: String,
    /// API base URL (override for testing or proxies).
    pub(crate) base_url: String,
    /// Default model identifier used when the request does not specify one.
    pub(crate) model: Option<String>,
    /// Cap on the frame decoder's working buffer.
    pub(crate) max_frame_bytes: usize,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl ChatClient {
    /// Create a new client with the given API token and sensible defaults.
    ///
    /// Default base URL: `http://localhost:8080`.
    /// Default auth header: `authorization`, sent as `Bearer {token}`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            auth_header: DEFAULT_AUTH_HEADER.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or an API proxy.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the header name the bearer token is sent under.
    #[must_use]
    pub fn auth_header(mut self, name: impl Into<String>) -> Self {
        self.auth_header = name.into();
        self
    }

    /// Set the default model identifier.
    ///
    /// This is used when [`ChatRequest::model_id`] is empty.
    #[must_use]
    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model = Some(model_id.into());
        self
    }

    /// Override the cap on a single frame's size.
    ///
    /// A stream whose buffered, unframed tail outgrows this cap is
    /// terminated with [`ChatError::FrameTooLarge`].
    #[must_use]
    pub fn max_frame_bytes(mut self, cap: usize) -> Self {
        self.max_frame_bytes = cap;
        self
    }

    /// Build the chat endpoint URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}/ai/chat", self.base_url)
    }

    /// Build the chat history endpoint URL.
    pub(crate) fn history_url(&self) -> String {
        format!("{}/ai/chat/history", self.base_url)
    }

    /// Send one chat turn and return the decoded event stream.
    ///
    /// A non-OK status or an unreachable backend is returned as an error
    /// here; failures after this point arrive as
    /// [`tally_types::ChatEvent::Error`] items on the stream.
    pub async fn send(&self, request: ChatRequest) -> Result<ChatStream, ChatError> {
        let mut request = request;
        if request.model_id.is_none() {
            request.model_id = self.model.clone();
        }

        let url = self.chat_url();
        tracing::debug!(url = %url, session = ?request.session_id, "sending chat request");

        let response = self
            .client
            .post(&url)
            .header(&self.auth_header, format!("Bearer {}", self.token))
            .header("accept", "text/event-stream")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }

        Ok(stream_frames(response, self.max_frame_bytes))
    }

    /// Start one chat turn, delivering results through `observer`.
    ///
    /// Fire-and-forget: the network call runs on a spawned task and the
    /// caller hears back exclusively via the observer. Returns the
    /// session controller; [`ChatHandle::close`] cancels the turn and
    /// suppresses every callback from that point on. Dropping the handle
    /// does not cancel the session.
    ///
    /// The client does not enforce single-flight: callers close a prior
    /// handle before starting another turn of the same conversation.
    pub fn start(&self, request: ChatRequest, observer: impl ChatObserver) -> ChatHandle {
        let token = CancellationToken::new();
        let session_token = token.clone();
        let client = self.clone();

        tokio::spawn(async move {
            let connect = async { client.send(request).await };
            session::pump(connect, observer, session_token).await;
        });

        ChatHandle::new(token)
    }

    /// Fetch the stored history of a conversation.
    ///
    /// The payload shape is backend-defined; it is returned uninterpreted.
    pub async fn history(&self, session_id: &str) -> Result<serde_json::Value, ChatError> {
        let url = self.history_url();
        tracing::debug!(url = %url, session = %session_id, "fetching chat history");

        let response = self
            .client
            .get(&url)
            .header(&self.auth_header, format!("Bearer {}", self.token))
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(format!("invalid history payload: {e}")))
    }

    /// Ask the backend to stop generating for an in-flight turn.
    ///
    /// Best-effort: the same request body is posted with `stop: true`
    /// spliced in. Stopping the backend does not close the local
    /// session; pair this with [`ChatHandle::close`].
    pub async fn stop(&self, request: &ChatRequest) -> Result<(), ChatError> {
        let mut body = serde_json::to_value(request)
            .map_err(|e| ChatError::InvalidRequest(e.to_string()))?;
        body["stop"] = serde_json::Value::Bool(true);

        let url = self.chat_url();
        tracing::debug!(url = %url, session = ?request.session_id, "sending stop signal");

        let response = self
            .client
            .post(&url)
            .header(&self.auth_header, format!("Bearer {}", self.token))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }

        Ok(())
    }
}
