//! Frame streaming over the chat HTTP response body.
//!
//! Wraps the response byte stream in the incremental frame decoder and
//! surfaces the result as a [`ChatStream`] of [`ChatEvent`]s.

use futures::{Stream, StreamExt};
use reqwest::Response;
use tally_types::{ChatError, ChatEvent, ChatStream};

use crate::decoder::FrameDecoder;

/// Wrap an HTTP response body into a [`ChatStream`] that emits one
/// [`ChatEvent::Frame`] per complete JSON text.
pub(crate) fn stream_frames(response: Response, max_frame_bytes: usize) -> ChatStream {
    let byte_stream = response.bytes_stream();
    let event_stream = decode_byte_stream(byte_stream, max_frame_bytes);
    ChatStream {
        receiver: Box::pin(event_stream),
    }
}

/// Decode a raw byte stream into frame events.
///
/// Decoding a received chunk runs synchronously to completion between
/// awaits, so frames are emitted in exact assembly order. A read failure
/// or decode failure yields one [`ChatEvent::Error`] and ends the
/// stream; a natural end flushes any trailing complete frame first.
fn decode_byte_stream<E>(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, E>> + Send + 'static,
    max_frame_bytes: usize,
) -> impl Stream<Item = ChatEvent> + Send + 'static
where
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut decoder = FrameDecoder::new(max_frame_bytes);
        let mut bytes_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    yield ChatEvent::Error(ChatError::Network(Box::new(e)));
                    return;
                }
            };

            match decoder.feed(&chunk) {
                Ok(frames) => {
                    for frame in frames {
                        tracing::trace!(bytes = frame.len(), "decoded frame");
                        yield ChatEvent::Frame(frame);
                    }
                }
                Err(e) => {
                    yield ChatEvent::Error(e);
                    return;
                }
            }
        }

        for frame in decoder.finish() {
            yield ChatEvent::Frame(frame);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
