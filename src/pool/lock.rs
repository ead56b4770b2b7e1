use crate::error::PoolError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reentrancy guard of a pool. Closed until the pool is initialized.
///
/// Mutators take `&mut self` and callbacks only see `&PoolConfig`, so a
/// callback cannot re-enter the pool; in practice the lock is the
/// "initialized" gate.
#[derive(Debug, Default)]
pub(crate) struct Lock {
    unlocked: AtomicBool,
}

impl Lock {
    /// Opens the lock for the first time.
    pub(crate) fn open(&self) {
        self.unlocked.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::Acquire)
    }

    /// Takes the lock until the returned guard is dropped.
    pub(crate) fn acquire(&self) -> Result<LockGuard<'_>, PoolError> {
        self.unlocked
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PoolError::Locked)?;
        Ok(LockGuard { lock: self })
    }
}

impl Clone for Lock {
    fn clone(&self) -> Self {
        Self {
            unlocked: AtomicBool::new(self.is_unlocked()),
        }
    }
}

/// Releases the lock on every exit path, errors included.
#[derive(Debug)]
pub(crate) struct LockGuard<'a> {
    lock: &'a Lock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlocked.store(true, Ordering::Release);
    }
}
