//! Frame payload decoding.

use serde::Deserialize;
use tracing::warn;

/// Marker the backend puts in front of every payload.
pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The backend failed mid-generation and sent `{"error": "..."}`.
    #[error("server reported an error: {0}")]
    Server(String),
}

#[derive(Debug, Deserialize)]
struct FramePayload {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extract the text delta carried by one frame.
///
/// A frame without a `text` field yields an empty delta.
pub fn decode_frame(frame: &str) -> Result<String, FrameError> {
    let body = frame.trim_start_matches(['\r', '\n']);
    let json = body.strip_prefix(DATA_PREFIX).unwrap_or(body);
    let payload: FramePayload = serde_json::from_str(json)?;

    match (payload.text, payload.error) {
        (Some(text), _) => Ok(text),
        (None, Some(message)) => Err(FrameError::Server(message)),
        (None, None) => Ok(String::new()),
    }
}

/// Decode a frame for the read loop: failures are logged and become an
/// empty delta, so one bad frame never ends the stream.
pub fn decode_or_empty(frame: &str) -> String {
    match decode_frame(frame) {
        Ok(text) => text,
        Err(e) => {
            let preview: String = frame.chars().take(80).collect();
            warn!(error = %e, frame = %preview, "dropping undecodable frame");
            String::new()
        }
    }
}
