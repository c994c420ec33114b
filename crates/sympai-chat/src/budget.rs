//! Token counting and history trimming before a request is sent.

use crate::{Message, Role};

/// Counts prompt tokens for a message list under a given model.
pub trait TokenCounter: Send + Sync {
    fn count(&self, model: &str, messages: &[Message]) -> u64;
}

/// Character-based estimate: roughly four characters per token plus a
/// fixed per-message overhead and reply priming.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproxTokenCounter;

const CHARS_PER_TOKEN: u64 = 4;
const TOKENS_PER_MESSAGE: u64 = 4;
const REPLY_PRIMING: u64 = 3;

impl TokenCounter for ApproxTokenCounter {
    fn count(&self, _model: &str, messages: &[Message]) -> u64 {
        if messages.is_empty() {
            return 0;
        }
        let body: u64 = messages
            .iter()
            .map(|m| {
                let chars = m.content.chars().count() as u64;
                chars.div_ceil(CHARS_PER_TOKEN) + TOKENS_PER_MESSAGE
            })
            .sum();
        body + REPLY_PRIMING
    }
}

/// Keep the newest messages whose combined count fits in `limit`.
///
/// A leading system message is kept whenever it fits on its own. The rest
/// of the history is walked newest to oldest and stops at the first message
/// that would overflow. Order is preserved in the result. An empty result
/// means not even the latest message fits.
pub fn limit_message_tokens(
    counter: &dyn TokenCounter,
    messages: &[Message],
    limit: u64,
    model: &str,
) -> Vec<Message> {
    let mut kept: Vec<Message> = Vec::new();
    let mut total: u64 = 0;

    let mut system: Option<Message> = None;
    if let Some(first) = messages.first() {
        if first.role == Role::System {
            let count = counter.count(model, std::slice::from_ref(first));
            if count < limit {
                total += count;
                system = Some(first.clone());
            }
        }
    }

    for message in messages.iter().skip(1).rev() {
        let count = counter.count(model, std::slice::from_ref(message));
        if count + total > limit {
            break;
        }
        total += count;
        kept.push(message.clone());
    }

    // A non-system first message is only reached if everything after it fit
    if let Some(first) = messages.first() {
        if first.role != Role::System && kept.len() + 1 == messages.len() {
            let count = counter.count(model, std::slice::from_ref(first));
            if count + total < limit {
                kept.push(first.clone());
            }
        }
    }

    kept.reverse();
    if let Some(system) = system {
        kept.insert(0, system);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One token per character, no overhead.
    struct CharCounter;

    impl TokenCounter for CharCounter {
        fn count(&self, _model: &str, messages: &[Message]) -> u64 {
            messages.iter().map(|m| m.content.len() as u64).sum()
        }
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn everything_fits() {
        let history = vec![
            Message::system("sys"),
            Message::user("aaaa"),
            Message::assistant("bbbb"),
            Message::user("cc"),
        ];
        let kept = limit_message_tokens(&CharCounter, &history, 100, "m");
        assert_eq!(kept, history);
    }

    #[test]
    fn oldest_turns_are_dropped_first() {
        let history = vec![
            Message::system("sys"),
            Message::user("aaaaaaaaaa"),
            Message::assistant("bbbb"),
            Message::user("cc"),
        ];
        let kept = limit_message_tokens(&CharCounter, &history, 10, "m");
        assert_eq!(contents(&kept), vec!["sys", "bbbb", "cc"]);
    }

    #[test]
    fn walk_stops_at_first_overflow() {
        let history = vec![
            Message::user("a"),
            Message::assistant("bbbbbbbbbb"),
            Message::user("cc"),
        ];
        let kept = limit_message_tokens(&CharCounter, &history, 5, "m");
        assert_eq!(contents(&kept), vec!["cc"]);
    }

    #[test]
    fn leading_user_message_needs_strict_headroom() {
        let history = vec![Message::user("aa"), Message::assistant("bbb")];
        let kept = limit_message_tokens(&CharCounter, &history, 5, "m");
        assert_eq!(contents(&kept), vec!["bbb"]);

        let kept = limit_message_tokens(&CharCounter, &history, 6, "m");
        assert_eq!(contents(&kept), vec!["aa", "bbb"]);
    }

    #[test]
    fn single_message_is_kept_when_it_fits() {
        let history = vec![Message::user("hi")];
        let kept = limit_message_tokens(&CharCounter, &history, 10, "m");
        assert_eq!(contents(&kept), vec!["hi"]);
    }

    #[test]
    fn oversized_latest_message_leaves_nothing() {
        let history = vec![Message::user("a"), Message::user("much too long")];
        assert!(limit_message_tokens(&CharCounter, &history, 4, "m").is_empty());

        let history = vec![Message::user("much too long")];
        assert!(limit_message_tokens(&CharCounter, &history, 4, "m").is_empty());
    }

    #[test]
    fn oversized_system_prompt_is_dropped() {
        let history = vec![Message::system("a very long system prompt"), Message::user("hi")];
        let kept = limit_message_tokens(&CharCounter, &history, 5, "m");
        assert_eq!(contents(&kept), vec!["hi"]);
    }

    #[test]
    fn approx_counter_estimates() {
        let counter = ApproxTokenCounter;
        assert_eq!(counter.count("m", &[]), 0);
        // 5 chars -> 2 tokens, +4 overhead, +3 priming
        assert_eq!(counter.count("m", &[Message::user("hello")]), 9);
        assert_eq!(
            counter.count("m", &[Message::user("hello"), Message::assistant("")]),
            13
        );
    }
}
