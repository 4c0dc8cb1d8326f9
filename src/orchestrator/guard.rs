use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-flight token for the refresh pipeline.
///
/// Holding a guard means the flag is set; dropping it clears the flag, so
/// every exit path (early return, error, unwinding) releases it. The guard
/// owns its flag so it can move into a spawned refresh task.
#[derive(Debug)]
pub struct RefreshGuard {
    flag: Arc<AtomicBool>,
}

impl RefreshGuard {
    /// Returns `None` when another holder already owns the flag.
    pub fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
