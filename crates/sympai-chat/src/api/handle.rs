//! Stream handles, readers, and per-conversation locks.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use crate::ChatError;

/// Raw reply body: byte chunks in arrival order.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, ChatError>>;

type CloseHook = Box<dyn FnOnce(CancelReason) + Send>;

/// Why a drained stream is being closed. Only the transport sees this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user cleared the generating flag before the reply finished.
    UserCancelled,
    Completed,
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelReason::UserCancelled => "Cancelled by user",
            CancelReason::Completed => "Generation completed",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open reply body that has not been read from yet.
pub struct StreamHandle {
    body: ByteStream,
    lock: Arc<AtomicBool>,
    on_close: Option<CloseHook>,
}

impl StreamHandle {
    pub fn new(body: ByteStream) -> Self {
        Self {
            body,
            lock: Arc::new(AtomicBool::new(false)),
            on_close: None,
        }
    }

    /// Build a handle over an in-memory sequence of chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Result<Vec<u8>, ChatError>>,
        I::IntoIter: Send + 'static,
    {
        Self::new(futures_util::stream::iter(chunks).boxed())
    }

    /// Share `lock` with every other handle for the same conversation.
    pub fn with_lock(mut self, lock: Arc<AtomicBool>) -> Self {
        self.lock = lock;
        self
    }

    /// Called with the reason when the stream is cancelled after draining.
    pub fn with_close_hook(mut self, hook: impl FnOnce(CancelReason) + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Whether another reader currently holds this handle's lock.
    pub fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Acquire)
    }

    /// Take the lock and start reading. Fails if the lock is already held.
    pub fn reader(self) -> Result<StreamReader, ChatError> {
        let guard = ReaderGuard::acquire(&self.lock)?;
        Ok(StreamReader {
            handle: self,
            guard,
        })
    }

    /// Close the underlying stream, reporting `reason` to the transport.
    pub fn cancel(mut self, reason: CancelReason) {
        if let Some(hook) = self.on_close.take() {
            hook(reason);
        }
    }
}

/// Exclusive reader over a `StreamHandle`; holds the lock until released
/// or dropped.
pub struct StreamReader {
    handle: StreamHandle,
    guard: ReaderGuard,
}

impl StreamReader {
    /// Next chunk, or `None` at end-of-data.
    pub async fn read(&mut self) -> Result<Option<Vec<u8>>, ChatError> {
        self.handle.body.next().await.transpose()
    }

    /// Give up the lock and hand the stream back for closing.
    pub fn release_lock(self) -> StreamHandle {
        let StreamReader { handle, guard } = self;
        drop(guard);
        handle
    }
}

/// Clears the lock flag on drop, so a failed or abandoned read still
/// unlocks the conversation.
struct ReaderGuard {
    flag: Arc<AtomicBool>,
}

impl ReaderGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, ChatError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(ChatError::StreamLocked);
        }
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One lock flag per conversation id.
#[derive(Default)]
pub struct StreamLocks {
    locks: Mutex<HashMap<String, Arc<AtomicBool>>>,
}

impl StreamLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, key: &str) -> Arc<AtomicBool> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Forget flags nobody else references and nobody holds
        locks.retain(|_, flag| Arc::strong_count(flag) > 1 || flag.load(Ordering::Acquire));
        Arc::clone(
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AtomicBool::new(false))),
        )
    }
}
