//! Submission flow.
//!
//! A `Submitter` appends the assistant placeholder, runs a `StreamSession`
//! over the transport's reply stream, then the post-stream pipeline
//! (usage accounting and auto-title). `generating` is held for the whole
//! flow and always cleared last.

mod post_stream;
mod state;
mod stream;
mod submit;


pub use post_stream::{clean_title, title_prompt, PipelineOutcome};
pub use state::StreamState;
pub use stream::StreamSession;
pub use submit::{SubmitReport, SubmitSettings, Submitter};
