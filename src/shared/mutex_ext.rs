//! Usage: Poison-tolerant locking for session state (a panicked flow must not brick the client).

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) trait MutexExt<T> {
    fn lock_or_recover(&self) -> MutexGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    #[track_caller]
    fn lock_or_recover(&self) -> MutexGuard<'_, T> {
        if self.is_poisoned() {
            let caller = std::panic::Location::caller();
            tracing::error!(
                state = std::any::type_name::<T>(),
                at = %caller,
                "lock poisoned by an earlier panic; continuing with last written state"
            );
        }
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
