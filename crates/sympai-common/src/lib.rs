pub mod errors;
pub mod events;
pub mod id;

pub use errors::{ConfigError, SympaiError};
pub use events::{Event, EventBus};
pub use id::{new_correlation_id, new_id, SessionId};

pub type Result<T> = std::result::Result<T, SympaiError>;
