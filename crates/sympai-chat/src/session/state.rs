use std::fmt;

/// Lifecycle of one reply stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    Requesting,
    Streaming,
    Draining,
    Completed,
    Errored,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Completed | StreamState::Errored)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_become(&self, next: StreamState) -> bool {
        use StreamState::*;
        match (self, next) {
            (Idle, Requesting)
            | (Requesting, Streaming)
            | (Streaming, Draining)
            | (Draining, Completed) => true,
            (current, Errored) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamState::Idle => "idle",
            StreamState::Requesting => "requesting",
            StreamState::Streaming => "streaming",
            StreamState::Draining => "draining",
            StreamState::Completed => "completed",
            StreamState::Errored => "errored",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let path = [
            StreamState::Idle,
            StreamState::Requesting,
            StreamState::Streaming,
            StreamState::Draining,
            StreamState::Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_become(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn errored_reachable_from_non_terminal_only() {
        assert!(StreamState::Idle.can_become(StreamState::Errored));
        assert!(StreamState::Streaming.can_become(StreamState::Errored));
        assert!(!StreamState::Completed.can_become(StreamState::Errored));
        assert!(!StreamState::Errored.can_become(StreamState::Errored));
    }

    #[test]
    fn no_skipping_states() {
        assert!(!StreamState::Idle.can_become(StreamState::Streaming));
        assert!(!StreamState::Streaming.can_become(StreamState::Completed));
        assert!(!StreamState::Completed.can_become(StreamState::Idle));
    }
}
