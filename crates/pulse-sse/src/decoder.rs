//! Incremental decoding of a chunked byte stream into SSE frames.
//!
//! Chunks may split anywhere: inside a frame, inside a line, or inside a
//! multi-byte UTF-8 sequence. [`FrameDecoder`] carries state across chunks so
//! that the frames it yields do not depend on where the splits happened.

/// Separator between two frames on the wire
pub const FRAME_SEPARATOR: &str = "\n\n";

/// Stateful UTF-8 decoder that carries incomplete sequences across calls.
///
/// Invalid byte sequences are replaced with U+FFFD rather than failing.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, holding back a trailing partial character
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(std::str::from_utf8(&rest[..valid]).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of input. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Number of bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Splits decoded text into frames delimited by a blank line.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    buffer: String,
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and iterate over the frames it completes.
    ///
    /// Frames not consumed from the returned iterator stay buffered and are
    /// yielded by the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Frames<'_> {
        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);
        Frames {
            buffer: &mut self.buffer,
        }
    }

    /// Signal end of input and return the unterminated trailing frame, if any.
    ///
    /// Whitespace-only residue is discarded.
    pub fn finish(&mut self) -> Option<String> {
        let tail = self.utf8.finish();
        self.buffer.push_str(&tail);

        let residual = std::mem::take(&mut self.buffer);
        if residual.trim().is_empty() {
            None
        } else {
            Some(residual)
        }
    }

    /// Text received but not yet emitted as a frame
    pub fn buffered(&self) -> &str {
        &self.buffer
    }
}

/// Draining iterator over the complete frames currently buffered.
pub struct Frames<'a> {
    buffer: &'a mut String,
}

impl Iterator for Frames<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let idx = self.buffer.find(FRAME_SEPARATOR)?;
        let frame = self.buffer[..idx].to_string();
        self.buffer.drain(..idx + FRAME_SEPARATOR.len());
        Some(frame)
    }
}
