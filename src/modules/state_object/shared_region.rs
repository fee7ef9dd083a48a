//! ## Shared Region Module
//! The memory every actor is attached to. It holds the one [`SharedState`] of the run.
//!
//! The inner `Mutex` only gives the borrow checker its proof of exclusive access. Actors
//! never lock it directly, they go through `ActorContext::enter`, which takes the `mutex`
//! semaphore first, so the inner lock is never contended.

use std::sync::{Mutex, MutexGuard};

use crate::modules::error::{RestaurantError, Result};
use crate::modules::state_object::shared_state::SharedState;

#[derive(Debug)]
pub struct SharedRegion {
    state: Mutex<SharedState>,
}

impl SharedRegion {
    pub fn new(table_size: usize) -> SharedRegion {
        SharedRegion {
            state: Mutex::new(SharedState::new(table_size)),
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, SharedState>> {
        self.state.lock().map_err(|_| RestaurantError::Poisoned)
    }

    /// Copy of the current state, for the launcher once every actor has returned.
    pub fn snapshot(&self) -> Result<SharedState> {
        Ok(self.lock()?.clone())
    }

    pub fn table_size(&self) -> Result<usize> {
        Ok(self.lock()?.table_size)
    }
}
