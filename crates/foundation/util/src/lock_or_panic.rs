use std::sync::{Mutex, MutexGuard};


/// Locks a mutex shared between worker threads, panicking if another thread panicked
/// while holding it.
///
/// Results gathered by workers are worthless once one of them has panicked mid-update,
/// so there is nothing to recover from a poisoned lock.
pub trait LockOrPanic<T> {
    /// # Panics
    /// Panics if the mutex is poisoned.
    fn lock_or_panic(&self) -> MutexGuard<'_, T>;
}

impl<T> LockOrPanic<T> for Mutex<T> {
    #[inline]
    fn lock_or_panic(&self) -> MutexGuard<'_, T> {
        #[expect(
            clippy::unwrap_used,
            reason = "a poisoned lock means a worker already panicked",
        )]
        self.lock().unwrap()
    }
}
