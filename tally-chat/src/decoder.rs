//! Incremental JSON frame decoding for the chat byte stream.
//!
//! The backend emits concatenated JSON texts over a chunked HTTP
//! response, with no delimiters between objects and no SSE framing,
//! despite the `Accept: text/event-stream` request header. Frames are
//! recovered by walking brace depth from the first `{` in the buffer;
//! braces inside string literals (including escaped quotes) do not
//! count. Objects may be split across any number of network chunks, and
//! one chunk may carry any number of complete objects.

use tally_types::ChatError;

/// Default cap on the working buffer. A frame that grows past this
/// without closing terminates the stream with [`ChatError::FrameTooLarge`].
pub(crate) const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Incremental decoder for a stream of concatenated JSON texts.
///
/// One instance owns all mutable state for one session: the UTF-8 carry,
/// the text buffer, and the size cap. Feed it byte chunks as they
/// arrive; each complete frame is returned exactly once, in input order.
pub(crate) struct FrameDecoder {
    /// Decoded text awaiting a complete frame.
    buf: String,
    /// Trailing bytes of an incomplete UTF-8 sequence from the last chunk.
    utf8_carry: Vec<u8>,
    /// Maximum working buffer size in bytes.
    max_frame_bytes: usize,
}

impl FrameDecoder {
    pub(crate) fn new(max_frame_bytes: usize) -> Self {
        Self {
            buf: String::new(),
            utf8_carry: Vec::new(),
            max_frame_bytes,
        }
    }

    /// Absorb one chunk of bytes and return any frames it completed.
    ///
    /// Errors are terminal: an invalid byte sequence or an oversized
    /// frame leaves the decoder unusable for further input.
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, ChatError> {
        self.decode_chunk(chunk)?;
        let frames = self.scan_frames();
        if self.buf.len() > self.max_frame_bytes {
            return Err(ChatError::FrameTooLarge {
                limit: self.max_frame_bytes,
            });
        }
        Ok(frames)
    }

    /// Final pass at end of stream over whatever is still buffered.
    pub(crate) fn finish(&mut self) -> Vec<String> {
        if self.buf.trim().is_empty() {
            return Vec::new();
        }
        self.scan_frames()
    }

    /// Decode the maximal valid UTF-8 prefix of carry + chunk into the
    /// text buffer, keeping an incomplete trailing sequence for the
    /// next chunk.
    fn decode_chunk(&mut self, chunk: &[u8]) -> Result<(), ChatError> {
        let bytes: Vec<u8> = if self.utf8_carry.is_empty() {
            chunk.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.utf8_carry);
            joined.extend_from_slice(chunk);
            joined
        };

        match std::str::from_utf8(&bytes) {
            Ok(text) => self.buf.push_str(text),
            Err(e) => {
                let valid = e.valid_up_to();
                if let Ok(prefix) = std::str::from_utf8(&bytes[..valid]) {
                    self.buf.push_str(prefix);
                }
                match e.error_len() {
                    // Incomplete multi-byte sequence at the chunk edge.
                    None => self.utf8_carry = bytes[valid..].to_vec(),
                    Some(_) => {
                        return Err(ChatError::InvalidResponse(format!(
                            "invalid UTF-8 in stream at byte {valid}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Extract every complete frame currently in the buffer.
    fn scan_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        loop {
            let Some(start) = self.buf.find('{') else {
                // Nothing useful remains; discard it all.
                self.buf.clear();
                break;
            };

            match scan_object_end(&self.buf[start..]) {
                Some(len) => {
                    let frame = self.buf[start..start + len].to_string();
                    self.buf.drain(..start + len);
                    frames.push(frame);
                }
                None => {
                    // Incomplete: drop any garbage before the `{` and
                    // wait for more bytes.
                    self.buf.drain(..start);
                    break;
                }
            }
        }
        frames
    }
}

/// Byte length of the first complete JSON text in `s` (which starts at
/// a `{`), or `None` while it is still incomplete.
fn scan_object_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

// ─── Tests ───────────────────────────────────────────────────────────────────
