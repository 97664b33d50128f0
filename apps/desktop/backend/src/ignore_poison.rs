//! Mutex locking that shrugs off poisoning.
//!
//! The catalog mutex guards an `Option<CatalogStore>`. A panic inside one blocking task
//! leaves the SQLite connection usable (SQLite rolls back the open statement), so the
//! next caller takes the lock anyway.

use std::sync::{Mutex, MutexGuard};

pub trait IgnorePoison<T> {
    /// Lock the mutex, recovering the guard if a previous holder panicked.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnorePoison<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}
