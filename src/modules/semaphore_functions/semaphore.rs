//! ## Semaphore Module
//! Counting semaphore with blocking `acquire` (down) and non-blocking `release` (up).
//!
//! A semaphore can be removed. Removal wakes every blocked acquirer with
//! [`SemaphoreError::Removed`] and makes every later operation fail the same way, which is
//! how a torn-down semaphore set behaves for the processes still attached to it.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::modules::error::SemaphoreError;

#[derive(Debug)]
struct Count {
    value: u32,
    removed: bool,
}

#[derive(Debug)]
pub struct Semaphore {
    count: Mutex<Count>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(initial: u32) -> Semaphore {
        Semaphore {
            count: Mutex::new(Count { value: initial, removed: false }),
            available: Condvar::new(),
        }
    }

    // The counter is consistent on every path, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, Count> {
        self.count.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// acquire
    /// Blocks until the value is positive, then decrements it.
    ///
    /// # Returns:
    ///
    /// Returns -Result<(), SemaphoreError>- `Err(Removed)` if the semaphore is removed before or while waiting.
    ///
    pub fn acquire(&self) -> Result<(), SemaphoreError> {
        let mut count = self.lock();
        while count.value == 0 && !count.removed {
            count = self
                .available
                .wait(count)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        if count.removed {
            return Err(SemaphoreError::Removed);
        }
        count.value -= 1;
        Ok(())
    }

    /// release
    /// Increments the value and wakes one blocked acquirer.
    ///
    /// # Returns:
    ///
    /// Returns -Result<(), SemaphoreError>- `Err(Removed)` if the semaphore is gone.
    ///
    pub fn release(&self) -> Result<(), SemaphoreError> {
        let mut count = self.lock();
        if count.removed {
            return Err(SemaphoreError::Removed);
        }
        count.value += 1;
        drop(count);
        self.available.notify_one();
        Ok(())
    }

    /// Removes the semaphore and wakes everybody waiting on it.
    pub fn remove(&self) {
        let mut count = self.lock();
        count.removed = true;
        drop(count);
        self.available.notify_all();
    }

    pub fn value(&self) -> u32 {
        self.lock().value
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_acquire_consumes_initial_value() {
        let sem = Semaphore::new(2);
        sem.acquire().unwrap();
        sem.acquire().unwrap();
        assert_eq!(sem.value(), 0);
        sem.release().unwrap();
        assert_eq!(sem.value(), 1);
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let sem = Arc::new(Semaphore::new(0));
        let waiter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.acquire())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        sem.release().unwrap();
        assert_eq!(waiter.join().unwrap(), Ok(()));
        assert_eq!(sem.value(), 0);
    }

    #[test]
    fn test_remove_wakes_blocked_acquirer() {
        let sem = Arc::new(Semaphore::new(0));
        let waiter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.acquire())
        };

        thread::sleep(Duration::from_millis(20));
        sem.remove();
        assert_eq!(waiter.join().unwrap(), Err(SemaphoreError::Removed));
        assert_eq!(sem.release(), Err(SemaphoreError::Removed));
        assert_eq!(sem.acquire(), Err(SemaphoreError::Removed));
    }
}
