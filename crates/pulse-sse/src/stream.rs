//! Streaming adapters from a chunked response body to frames and events

use std::pin::Pin;

use async_stream::stream;
use futures::StreamExt;
use tokio_stream::Stream;

use crate::{
    decoder::FrameDecoder,
    error::Result,
    frame::{SseEvent, parse_frame},
};

/// A stream of raw body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// A stream of complete frames, in wire order
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A stream of parsed events, in wire order
pub type EventStream = Pin<Box<dyn Stream<Item = Result<SseEvent>> + Send>>;

/// Split a byte stream into frames.
///
/// When the body ends normally an unterminated trailing frame is still
/// yielded. A body error is yielded once and ends the stream; whatever was
/// buffered at that point is discarded since it may be cut off mid-payload.
pub fn frames(mut bytes: ByteStream) -> FrameStream {
    Box::pin(stream! {
        let mut decoder = FrameDecoder::new();

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for frame in decoder.push(&chunk) {
                        tracing::trace!(len = frame.len(), "frame decoded");
                        yield Ok(frame);
                    }
                }
                Err(e) => {
                    if !decoder.buffered().trim().is_empty() {
                        tracing::debug!(
                            buffered = decoder.buffered().len(),
                            "dropping partial frame after stream error"
                        );
                    }
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(frame) = decoder.finish() {
            tracing::trace!(len = frame.len(), "flushing unterminated frame");
            yield Ok(frame);
        }
    })
}

/// Split a byte stream into parsed events
pub fn events(bytes: ByteStream) -> EventStream {
    Box::pin(frames(bytes).map(|frame| frame.map(|f| parse_frame(&f))))
}
