//! Error types for the chat client.

/// Errors from chat client operations.
///
/// Every error is terminal for its session: the client never retries a
/// stream on its own. Callers that want retry wrap the call in their own
/// bounded loop, using [`ChatError::is_retryable`] to decide.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, mid-stream
    /// read failure).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The backend is temporarily unavailable (HTTP 5xx).
    #[error("service unavailable (HTTP {status}): {body}")]
    ServiceUnavailable {
        /// The HTTP status code.
        status: u16,
        /// The response body, if any.
        body: String,
    },

    // Terminal errors
    /// Authentication or authorization failure (HTTP 401/403).
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// Any other non-OK HTTP status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// The response body, if any.
        body: String,
    },
    /// Malformed or unserializable request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// A frame grew past the configured buffer cap without completing.
    #[error("frame exceeded {limit} bytes without completing")]
    FrameTooLarge {
        /// The configured cap, in bytes.
        limit: usize,
    },
    /// The response payload could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ChatError {
    /// Whether this error is likely transient and the turn can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ServiceUnavailable { .. })
    }
}
