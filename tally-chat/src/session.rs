//! Session pump: drives a chat stream into a [`ChatObserver`] with
//! cooperative cancellation.
//!
//! A session moves through `Requesting` (awaiting response headers) and
//! `Streaming` (awaiting chunks) before reaching exactly one terminal
//! state: `Completed`, `Errored`, or `Closed`. Closing wins over any
//! event already in flight: the cancellation token is checked, biased,
//! at every suspension point and again before every callback.

use std::future::Future;

use futures::StreamExt;
use tally_types::{ChatError, ChatEvent, ChatObserver, ChatStream};
use tokio_util::sync::CancellationToken;

/// Controller for an in-flight chat session.
///
/// Returned by `ChatClient::start`. Dropping the handle does not cancel
/// the session; call [`ChatHandle::close`].
#[derive(Debug, Clone)]
pub struct ChatHandle {
    token: CancellationToken,
}

impl ChatHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Close the session.
    ///
    /// Idempotent; safe to call repeatedly or after natural completion.
    /// In-flight network operations are dropped, and no further
    /// callbacks are delivered, the close itself included.
    pub fn close(&self) {
        self.token.cancel();
    }

    /// Whether [`ChatHandle::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Drive a session from connect to a terminal state.
///
/// Exactly one of `on_error`/`on_complete` fires, unless the token is
/// cancelled first, in which case nothing fires at all. Errors observed
/// after cancellation are logged and swallowed so a deliberate close
/// never surfaces as a spurious failure.
pub(crate) async fn pump<O, F>(connect: F, mut observer: O, token: CancellationToken)
where
    O: ChatObserver,
    F: Future<Output = Result<ChatStream, ChatError>>,
{
    let stream = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = connect => match result {
            Ok(stream) => stream,
            Err(e) => {
                if token.is_cancelled() {
                    tracing::warn!(error = %e, "request error after close, suppressed");
                    return;
                }
                observer.on_error(e);
                return;
            }
        },
    };

    let mut events = stream.receiver;
    loop {
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            event = events.next() => event,
        };

        match event {
            Some(ChatEvent::Frame(frame)) => {
                if token.is_cancelled() {
                    return;
                }
                observer.on_message(&frame);
            }
            Some(ChatEvent::Error(e)) => {
                if token.is_cancelled() {
                    tracing::warn!(error = %e, "stream error after close, suppressed");
                    return;
                }
                observer.on_error(e);
                return;
            }
            None => {
                if token.is_cancelled() {
                    return;
                }
                observer.on_complete();
                return;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
