//! A [`RingHash`] handle that can be shared between threads.
//!
//! [`RingHash`] itself never locks. Mutations are multi-step (hashing, index update, registry update),
//! so concurrent callers need mutual exclusion around every call - this module provides the simplest
//! form of it: a [`Mutex`] owned by the caller side of the ring.
use std::sync::{Arc, Mutex, MutexGuard};

use super::RingHash;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct SharedRingHash<V> {
    inner: Arc<Mutex<RingHash<V>>>,
}

impl<V> Clone for SharedRingHash<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> SharedRingHash<V> {
    pub fn new(ring: RingHash<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ring)),
        }
    }

    /// Acquires a lock over the ring.
    /// A fail to acquire a lock is considered a [`Error::Logic`] since the only reason why
    /// an [`Error`] should be returned is in case of [`Mutex`] poisoning
    pub fn acquire_lock(&self) -> Result<MutexGuard<RingHash<V>>> {
        match self.inner.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => Err(Error::Logic {
                reason: "Unable to acquire lock for SharedRingHash - poisoned...".to_string(),
            }),
        }
    }

    /// Runs `f` while holding the lock
    pub fn with_ring<T>(&self, f: impl FnOnce(&mut RingHash<V>) -> T) -> Result<T> {
        let mut guard = self.acquire_lock()?;
        Ok(f(&mut *guard))
    }
}

impl<V> From<RingHash<V>> for SharedRingHash<V> {
    fn from(ring: RingHash<V>) -> Self {
        Self::new(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::SharedRingHash;
    use crate::ring::{accept_unique, RingHash, StringNode};
    use std::thread;

    #[test]
    fn concurrent_writers() {
        let shared = SharedRingHash::new(RingHash::<StringNode>::new(8, None));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        shared
                            .with_ring(|ring| ring.add_string([format!("node-{}-{}", t, i)]))
                            .unwrap()
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ring = shared.acquire_lock().unwrap();
        assert_eq!(ring.len(), 100);
        assert_eq!(ring.virtual_len(), 800);
        assert_eq!(ring.get_n("some key", 3, Some(&accept_unique)).len(), 3);
    }

    #[test]
    fn poisoned_lock() {
        let shared = SharedRingHash::new(RingHash::<StringNode>::default());
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.acquire_lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err = shared.acquire_lock().err().unwrap();
        assert!(matches!(err, crate::error::Error::Logic { .. }));
    }
}
