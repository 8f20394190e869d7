//! Streaming event types and the consumer callback contract.

use std::pin::Pin;

use futures::Stream;

use crate::error::ChatError;

/// An event emitted while a chat response stream is being decoded.
#[derive(Debug)]
pub enum ChatEvent {
    /// One complete raw JSON text, exactly as framed off the wire.
    ///
    /// This layer does not parse or interpret the JSON; that is the
    /// consumer's responsibility.
    Frame(String),
    /// A terminal stream error. No further events follow.
    Error(ChatError),
}

/// Handle to a decoded chat stream.
///
/// Frames arrive in the exact order they were assembled from the byte
/// stream, which matches network arrival order. The stream ending
/// without an [`ChatEvent::Error`] means the turn completed normally.
pub struct ChatStream {
    /// The stream of events. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = ChatEvent> + Send>>,
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream").finish_non_exhaustive()
    }
}

/// Callback contract for observer-driven consumption.
///
/// Implementors receive each frame as it is assembled, then exactly one
/// of [`ChatObserver::on_error`] or [`ChatObserver::on_complete`],
/// unless the session is closed first, after which nothing further is
/// delivered, the close itself included.
pub trait ChatObserver: Send + 'static {
    /// Called once per complete JSON text, in assembly order.
    fn on_message(&mut self, raw_json: &str);

    /// Called at most once, on terminal failure.
    fn on_error(&mut self, error: ChatError) {
        let _ = error;
    }

    /// Called at most once, when the stream ends normally.
    fn on_complete(&mut self) {}
}
