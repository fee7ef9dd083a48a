//! ## Critical Section Module
//! Scoped access to the shared state: acquire `mutex`, mutate, persist, release.
//!
//! ## The structs includes:
//! - **ActorContext**: what an actor is attached to. The semaphore set, the shared region and the
//!   state logger, plus the actor's name for diagnostics.
//! - **CriticalSection**: a borrow of the shared state that exists only while `mutex` is held.
//!   Any mutable access marks it dirty, and `leave` persists a dirty state before letting go of
//!   `mutex`, so the log only ever sees states written under exclusion.
//!
//! A section dropped without `leave` (an error path) still releases `mutex`.
//! Nothing here can wait on another semaphore while `mutex` is held: the section gives out the
//! state, not the semaphore set.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, MutexGuard};

use log::{trace, warn};

use crate::modules::error::{RestaurantError, Result, SemOp, SemaphoreError};
use crate::modules::logger_functions::state_logger::StateLogger;
use crate::modules::semaphore_functions::relay_gate::RelayGate;
use crate::modules::semaphore_functions::semaphore_set::{SemName, SemaphoreSet};
use crate::modules::state_object::shared_region::SharedRegion;
use crate::modules::state_object::shared_state::SharedState;

#[derive(Clone)]
pub struct ActorContext {
    actor: String,
    table_size: usize,
    semaphores: Arc<SemaphoreSet>,
    region: Arc<SharedRegion>,
    logger: Arc<dyn StateLogger>,
}

impl ActorContext {
    pub fn new(
        actor: impl Into<String>,
        semaphores: Arc<SemaphoreSet>,
        region: Arc<SharedRegion>,
        logger: Arc<dyn StateLogger>,
    ) -> Result<ActorContext> {
        let table_size = region.table_size()?;
        Ok(ActorContext {
            actor: actor.into(),
            table_size,
            semaphores,
            region,
            logger,
        })
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    fn semaphore_error(&self, name: SemName, op: SemOp, source: SemaphoreError) -> RestaurantError {
        RestaurantError::Semaphore {
            actor: self.actor.clone(),
            name,
            op,
            source,
        }
    }

    /// Blocking down on one of the set's semaphores.
    pub fn acquire(&self, name: SemName) -> Result<()> {
        trace!("{} down {}", self.actor, name);
        self.semaphores
            .acquire(name)
            .map_err(|e| self.semaphore_error(name, SemOp::Acquire, e))
    }

    pub fn release(&self, name: SemName) -> Result<()> {
        trace!("{} up {}", self.actor, name);
        self.semaphores
            .release(name)
            .map_err(|e| self.semaphore_error(name, SemOp::Release, e))
    }

    /// Releases `name` `times` times in a row.
    pub fn release_n(&self, name: SemName, times: usize) -> Result<()> {
        for _ in 0..times {
            self.release(name)?;
        }
        Ok(())
    }

    pub fn relay(&self, name: SemName) -> RelayGate<'_> {
        RelayGate::new(self, name)
    }

    /// enter
    /// Takes `mutex` and borrows the shared state.
    ///
    /// # Returns:
    ///
    /// Returns -Result<CriticalSection>- the open section, or the error from acquiring `mutex`.
    ///
    pub fn enter(&self) -> Result<CriticalSection<'_>> {
        self.acquire(SemName::Mutex)?;
        let token = HeldMutex { ctx: self, released: false };
        let state = self.region.lock()?;
        Ok(CriticalSection {
            state,
            token,
            dirty: false,
            ctx: self,
        })
    }

    /// with_state
    /// One full critical section: enter, run `update`, persist, leave.
    ///
    /// # Arguments:
    ///
    /// * `update` - FnOnce(&mut SharedState) -> T - the mutation, must not block.
    ///
    /// # Returns:
    ///
    /// Returns -Result<T>- whatever `update` returned, once the state is saved and `mutex` is released.
    ///
    pub fn with_state<T>(&self, update: impl FnOnce(&mut SharedState) -> T) -> Result<T> {
        let mut section = self.enter()?;
        let out = update(&mut *section);
        section.leave()?;
        Ok(out)
    }
}

/// Ownership of the `mutex` semaphore. Releases it on drop unless already released.
struct HeldMutex<'a> {
    ctx: &'a ActorContext,
    released: bool,
}

impl HeldMutex<'_> {
    fn release(mut self) -> Result<()> {
        self.released = true;
        self.ctx.release(SemName::Mutex)
    }
}

impl Drop for HeldMutex<'_> {
    fn drop(&mut self) {
        if !self.released {
            warn!("{} dropped a critical section, releasing mutex", self.ctx.actor);
            if let Err(e) = self.ctx.release(SemName::Mutex) {
                warn!("{}", e);
            }
        }
    }
}

// Field order matters: the state guard must drop before the mutex token.
pub struct CriticalSection<'a> {
    state: MutexGuard<'a, SharedState>,
    token: HeldMutex<'a>,
    dirty: bool,
    ctx: &'a ActorContext,
}

impl CriticalSection<'_> {
    /// Persists the current state without leaving the section.
    pub fn save(&mut self) -> Result<()> {
        self.ctx.logger.save_state(&self.state)?;
        self.dirty = false;
        Ok(())
    }

    /// Persists the state if it changed since the last save, then releases `mutex`.
    pub fn leave(mut self) -> Result<()> {
        if self.dirty {
            self.save()?;
        }
        let CriticalSection { state, token, .. } = self;
        drop(state);
        token.release()
    }
}

impl Deref for CriticalSection<'_> {
    type Target = SharedState;

    fn deref(&self) -> &SharedState {
        &self.state
    }
}

impl DerefMut for CriticalSection<'_> {
    fn deref_mut(&mut self) -> &mut SharedState {
        self.dirty = true;
        &mut self.state
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::logger_functions::state_logger::MemoryLogger;
    use crate::modules::state_object::shared_state::ClientStatus;

    fn test_context(table_size: usize) -> (ActorContext, Arc<SemaphoreSet>, Arc<MemoryLogger>) {
        let semaphores = Arc::new(SemaphoreSet::new());
        let region = Arc::new(SharedRegion::new(table_size));
        let logger = Arc::new(MemoryLogger::new());
        let ctx = ActorContext::new("test", Arc::clone(&semaphores), region, logger.clone()).unwrap();
        (ctx, semaphores, logger)
    }

    #[test]
    fn test_with_state_saves_and_releases() {
        let (ctx, semaphores, logger) = test_context(2);

        let seated = ctx
            .with_state(|state| {
                state.client_status[0] = ClientStatus::WaitForFriends;
                state.table_clients += 1;
                state.table_clients
            })
            .unwrap();

        assert_eq!(seated, 1);
        assert_eq!(semaphores.get(SemName::Mutex).value(), 1);
        let snapshots = logger.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].client_status[0], ClientStatus::WaitForFriends);
    }

    #[test]
    fn test_read_only_section_does_not_log() {
        let (ctx, _, logger) = test_context(1);
        let section = ctx.enter().unwrap();
        assert_eq!(section.table_clients, 0);
        section.leave().unwrap();
        assert!(logger.snapshots().is_empty());
    }

    #[test]
    fn test_explicit_save_inside_section() {
        let (ctx, _, logger) = test_context(1);
        let mut section = ctx.enter().unwrap();
        section.food_request = true;
        section.save().unwrap();
        section.food_request = false;
        section.leave().unwrap();

        let snapshots = logger.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].food_request);
        assert!(!snapshots[1].food_request);
    }

    #[test]
    fn test_dropped_section_releases_mutex() {
        let (ctx, semaphores, _) = test_context(1);
        {
            let _section = ctx.enter().unwrap();
            assert_eq!(semaphores.get(SemName::Mutex).value(), 0);
        }
        assert_eq!(semaphores.get(SemName::Mutex).value(), 1);
    }

    #[test]
    fn test_enter_fails_after_removal() {
        let (ctx, semaphores, _) = test_context(1);
        semaphores.remove();
        let result = ctx.enter();
        match result {
            Err(RestaurantError::Semaphore { name, op, .. }) => {
                assert_eq!(name, SemName::Mutex);
                assert_eq!(op, SemOp::Acquire);
            }
            _ => panic!("expected a semaphore error"),
        };
    }
}
