//! Internal helpers for mapping HTTP/reqwest errors to [`ChatError`].

use tally_types::ChatError;

/// Map a non-OK HTTP status from the chat backend to a [`ChatError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ChatError {
    match status.as_u16() {
        401 | 403 => ChatError::Authentication(body.to_string()),
        status @ 500..=599 => ChatError::ServiceUnavailable {
            status,
            body: body.to_string(),
        },
        status => ChatError::Http {
            status,
            body: body.to_string(),
        },
    }
}

/// Map a [`reqwest::Error`] to a [`ChatError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ChatError {
    ChatError::Network(Box::new(err))
}
