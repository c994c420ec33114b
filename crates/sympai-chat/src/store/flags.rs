//! Process-wide flags shared between the submitter and its observers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::ChatError;

/// Global chat indicators. `generating` doubles as the user's stop signal:
/// clearing it mid-reply marks the submission as cancelled.
pub struct ChatFlags {
    generating: AtomicBool,
    auto_title: AtomicBool,
    count_total_tokens: AtomicBool,
    error: Mutex<Option<String>>,
}

impl Default for ChatFlags {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl ChatFlags {
    pub fn new(auto_title: bool, count_total_tokens: bool) -> Self {
        Self {
            generating: AtomicBool::new(false),
            auto_title: AtomicBool::new(auto_title),
            count_total_tokens: AtomicBool::new(count_total_tokens),
            error: Mutex::new(None),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// User stop. The running submission sees this after its stream drains.
    pub fn stop_generating(&self) {
        self.generating.store(false, Ordering::Release);
    }

    pub fn auto_title(&self) -> bool {
        self.auto_title.load(Ordering::Relaxed)
    }

    pub fn set_auto_title(&self, enabled: bool) {
        self.auto_title.store(enabled, Ordering::Relaxed);
    }

    pub fn count_total_tokens(&self) -> bool {
        self.count_total_tokens.load(Ordering::Relaxed)
    }

    pub fn set_count_total_tokens(&self, enabled: bool) {
        self.count_total_tokens.store(enabled, Ordering::Relaxed);
    }

    /// Last submission error, if any.
    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    pub fn clear_error(&self) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Holds `generating` set for the life of a submission and clears it on
/// drop, whatever path the submission leaves by.
pub struct GeneratingGuard<'a> {
    flags: &'a ChatFlags,
}

impl<'a> GeneratingGuard<'a> {
    /// Fails with `Busy` if a submission is already generating.
    pub fn acquire(flags: &'a ChatFlags) -> Result<Self, ChatError> {
        if flags
            .generating
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(ChatError::Busy);
        }
        Ok(Self { flags })
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.flags.generating.store(false, Ordering::Release);
    }
}
