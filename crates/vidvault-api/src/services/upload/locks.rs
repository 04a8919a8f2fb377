//! Keyed async locks
//!
//! One `tokio::sync::Mutex` per key, created on first use and dropped from
//! the map once nobody holds or waits on it, including waiters whose `lock()`
//! future was dropped before it resolved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    users: usize,
}

type LockMap = HashMap<String, Slot>;

#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<LockMap>>,
}

/// One holder or waiter of a key
struct Registration {
    key: String,
    locks: KeyedLocks,
}

/// Holds the lock for one key until dropped
pub struct KeyedLockGuard {
    // Field order matters: the mutex is released before the registration goes
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: impl Into<String>) -> KeyedLockGuard {
        let key = key.into();
        let (mutex, registration) = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = map.entry(key.clone()).or_insert_with(|| Slot {
                mutex: Arc::default(),
                users: 0,
            });
            slot.users += 1;
            (
                slot.mutex.clone(),
                Registration {
                    key,
                    locks: self.clone(),
                },
            )
        };

        let guard = mutex.lock_owned().await;

        KeyedLockGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of keys currently held or waited on
    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut map = self
            .locks
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = map.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                map.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let locks = KeyedLocks::new();
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let active = active.clone();
            let max_active = max_active.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = locks.lock("owner-1").await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.lock("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = KeyedLocks::new();
        {
            let _guard = locks.lock("k").await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_waiter_removes_entry() {
        let locks = KeyedLocks::new();
        let held = locks.lock("k").await;

        let mut waiter = Box::pin(locks.lock("k"));
        let pending = tokio::time::timeout(Duration::from_millis(20), &mut waiter).await;
        assert!(pending.is_err());

        drop(held);
        assert_eq!(locks.len(), 1);

        drop(waiter);
        assert_eq!(locks.len(), 0);

        // The key is usable again afterwards
        let again = tokio::time::timeout(Duration::from_secs(1), locks.lock("k")).await;
        assert!(again.is_ok());
    }
}
