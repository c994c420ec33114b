//! Wire framing for the reply stream.
//!
//! The backend answers `/api/chat` with a sequence of frames separated by a
//! blank line, each carrying `data: {"text": "..."}`. The buffer turns raw
//! byte chunks into complete frames; the decoder turns one frame into the
//! text delta it carries.

mod buffer;
mod decoder;

pub use buffer::{FrameBuffer, FRAME_DELIMITER};
pub use decoder::{decode_frame, decode_or_empty, FrameError, DATA_PREFIX};
