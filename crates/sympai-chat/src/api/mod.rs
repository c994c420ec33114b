//! SympAI backend transport.
//!
//! Implements `ChatTransport` over HTTP: `POST /api/chat` answers with the
//! framed reply stream, `POST /api/generate_title` with a single JSON
//! object. Stream handles share one lock per conversation so two readers
//! can never drain replies into the same conversation at once.

mod client;
mod config;
mod handle;
mod transport;


pub use client::{HttpTransport, StreamRequest, TitleRequest, TitleResponse};
pub use config::{TransportConfig, OFFICIAL_API_ENDPOINT};
pub use handle::{ByteStream, CancelReason, StreamHandle, StreamLocks, StreamReader};
