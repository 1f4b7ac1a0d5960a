// src/widget/timers.rs
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;

use super::thread::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Status(MessageId),
    Typing(MessageId),
}

/// Delayed tasks owned by one widget. Everything still pending is aborted on
/// [`TimerRegistry::cancel_all`] or when the registry is dropped.
pub struct TimerRegistry {
    handles: Mutex<HashMap<TimerKey, Vec<AbortHandle>>>,
}

impl fmt::Debug for TimerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.lock().len();
        write!(f, "TimerRegistry({count} keys)")
    }
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self { handles: Mutex::new(HashMap::new()) }
    }

    // A panicking timer task never holds this lock, so the map is intact
    // even when poisoned.
    fn lock(&self) -> MutexGuard<'_, HashMap<TimerKey, Vec<AbortHandle>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `task` after `delay` on the current tokio runtime.
    pub fn schedule<F>(&self, key: TimerKey, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        let mut map = self.lock();
        map.retain(|_, list| {
            list.retain(|h| !h.is_finished());
            !list.is_empty()
        });
        map.entry(key).or_default().push(handle.abort_handle());
    }

    /// Aborts every pending task under `key`. Returns how many were pending.
    pub fn cancel(&self, key: TimerKey) -> usize {
        self.lock().remove(&key).map(abort_pending).unwrap_or(0)
    }

    pub fn cancel_all(&self) -> usize {
        self.lock().drain().map(|(_, list)| abort_pending(list)).sum()
    }

    #[cfg(test)]
    fn pending(&self, key: TimerKey) -> usize {
        self.lock()
            .get(&key)
            .map(|list| list.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn abort_pending(list: Vec<AbortHandle>) -> usize {
    list.into_iter()
        .filter(|h| !h.is_finished())
        .inspect(|h| h.abort())
        .count()
}
