//! Cross-thread stop request shared by the stream and its capture source.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Requests the end of a stream from another thread.
///
/// Blocking waits done through [`wait_timeout`](StopHandle::wait_timeout)
/// (sensor warm-up, retry backoff) return as soon as a stop is requested.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<StopSignal>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        *self.lock() = true;
        self.0.wake.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.lock()
    }

    /// Sleeps for up to `timeout`. Returns `true` if a stop was requested
    /// before or during the wait.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        if timeout.is_zero() {
            return *guard;
        }
        let (guard, _) = self
            .0
            .wake
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.0.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
