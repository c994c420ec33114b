//! Token usage accounting per model.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

use crate::budget::TokenCounter;
use crate::{ChatError, Message};

/// Prompt and completion token counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Accounts the tokens of one exchange: the prompt that was sent and the
/// completion that came back.
pub trait UsageRecorder: Send + Sync {
    fn record_usage(
        &self,
        model: &str,
        prompt: &[Message],
        completion: &Message,
    ) -> Result<(), ChatError>;
}

#[derive(Debug, Default)]
struct Ledger {
    total: TokenUsage,
    by_model: HashMap<String, TokenUsage>,
    calls: u64,
}

impl Ledger {
    fn add(&mut self, model: &str, usage: TokenUsage) {
        for entry in [&mut self.total, self.by_model.entry(model.to_string()).or_default()] {
            entry.prompt_tokens = entry.prompt_tokens.saturating_add(usage.prompt_tokens);
            entry.completion_tokens = entry
                .completion_tokens
                .saturating_add(usage.completion_tokens);
        }
        self.calls += 1;
    }
}

/// `UsageRecorder` that counts with a `TokenCounter` and keeps running
/// totals, overall and per model.
pub struct UsageAccountant {
    ledger: Mutex<Ledger>,
    counter: Arc<dyn TokenCounter>,
}

impl UsageAccountant {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            counter,
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Usage recorded so far for `model`, if it was ever charged.
    pub fn usage_for(&self, model: &str) -> Option<TokenUsage> {
        self.ledger().by_model.get(model).copied()
    }

    pub fn total(&self) -> TokenUsage {
        self.ledger().total
    }

    /// Exchanges recorded, across every model.
    pub fn call_count(&self) -> u64 {
        self.ledger().calls
    }

    pub fn reset(&self) {
        *self.ledger() = Ledger::default();
    }
}

impl UsageRecorder for UsageAccountant {
    fn record_usage(
        &self,
        model: &str,
        prompt: &[Message],
        completion: &Message,
    ) -> Result<(), ChatError> {
        let usage = TokenUsage {
            prompt_tokens: self.counter.count(model, prompt),
            completion_tokens: self.counter.count(model, std::slice::from_ref(completion)),
        };
        debug!(
            model,
            prompt = usage.prompt_tokens,
            completion = usage.completion_tokens,
            "recording token usage"
        );
        self.ledger
            .lock()
            .map_err(|_| ChatError::Usage("usage ledger poisoned".into()))?
            .add(model, usage);
        Ok(())
    }
}
