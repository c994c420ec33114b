//! Partial-frame buffering.
//!
//! Chunk boundaries fall anywhere: inside a frame, inside the delimiter, or
//! inside a multi-byte UTF-8 sequence. `FrameBuffer` is a `Decoder` that
//! splits complete frames off the front of a `BytesMut`. Continuation bytes
//! never equal `\n`, so a frame cut at the delimiter is always whole UTF-8
//! and is decoded once, after it is complete.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

/// Separates two frames on the wire.
pub const FRAME_DELIMITER: &str = "\n\n";

#[derive(Debug, Default)]
pub struct FrameBuffer {
    /// Bytes after the last delimiter seen so far, for `append`/`flush`.
    pending: BytesMut,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one chunk and return every frame it completed, in arrival order.
    ///
    /// Whitespace-only segments between delimiters are dropped.
    pub fn append(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut pending = std::mem::take(&mut self.pending);
        pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(frame) = next_frame(&mut pending) {
            frames.push(frame);
        }
        self.pending = pending;
        frames
    }

    /// Emit the retained trailing fragment as a final frame.
    ///
    /// Called once the stream reports end-of-data, since the server may
    /// close without a trailing delimiter. Empties the buffer, so a second
    /// call returns `None`.
    pub fn flush(&mut self) -> Option<String> {
        let mut pending = std::mem::take(&mut self.pending);
        let frame = trailing_frame(&mut pending);
        self.pending = pending;
        frame
    }

    /// True when no partial frame is held back.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Decoder for FrameBuffer {
    type Item = String;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        Ok(next_frame(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        match next_frame(src) {
            Some(frame) => Ok(Some(frame)),
            None => Ok(trailing_frame(src)),
        }
    }
}

/// Split the first non-blank complete frame off `src`.
fn next_frame(src: &mut BytesMut) -> Option<String> {
    let delimiter = FRAME_DELIMITER.as_bytes();
    while let Some(at) = src
        .windows(delimiter.len())
        .position(|window| window == delimiter)
    {
        let frame = src.split_to(at);
        src.advance(delimiter.len());
        let text = String::from_utf8_lossy(&frame);
        if !text.trim().is_empty() {
            return Some(text.into_owned());
        }
    }
    None
}

/// Take everything left in `src` as one frame, unless it is blank.
///
/// A sequence truncated by end-of-stream becomes U+FFFD.
fn trailing_frame(src: &mut BytesMut) -> Option<String> {
    if src.is_empty() {
        return None;
    }
    let rest = src.split();
    let text = String::from_utf8_lossy(&rest);
    (!text.trim().is_empty()).then(|| text.into_owned())
}
