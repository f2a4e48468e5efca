use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serializes writers of the same path.
///
/// Each path gets its own async mutex, created on first use and dropped once
/// nobody holds or waits on it.
#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> PathGuard {
        let mutex = {
            let mut map = self.inner.lock();
            map.entry(key.to_string()).or_default().clone()
        };
        // built before waiting so a cancelled waiter still cleans up
        let mut guard = PathGuard {
            key: key.to_string(),
            guard: None,
            locks: self.clone(),
        };
        guard.guard = Some(mutex.lock_owned().await);
        guard
    }

    /// Number of paths with a live lock
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held while writing a path. Releases the lock on drop.
#[derive(Debug)]
pub struct PathGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: PathLocks,
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        // clones are only taken under the map lock, so a count of one means
        //  the map holds the last reference
        let mut map = self.locks.inner.lock();
        if let Some(mutex) = map.get(&self.key) {
            if Arc::strong_count(mutex) == 1 {
                map.remove(&self.key);
            }
        }
    }
}
