//! ## Relay Gate Module
//! Chained-token wake-up over a single counting semaphore.
//!
//! N actors reach the gate. The one that completes the group (last to sit down, last to finish
//! eating) walks straight through and drops one token. Every other actor waits for a token and
//! puts it back after taking it, so the single token hops from waiter to waiter until all N-1
//! have woken exactly once. Which waiter wakes first does not matter.
//!
//! Used for `friendsArrived` (table complete) and `allFinished` (everyone done eating).

use crate::modules::error::Result;
use crate::modules::semaphore_functions::semaphore_set::SemName;
use crate::modules::state_object::critical_section::ActorContext;

pub struct RelayGate<'a> {
    ctx: &'a ActorContext,
    name: SemName,
}

impl<'a> RelayGate<'a> {
    pub fn new(ctx: &'a ActorContext, name: SemName) -> RelayGate<'a> {
        RelayGate { ctx, name }
    }

    /// cross
    /// Goes through the gate and passes the token on.
    ///
    /// # Arguments:
    ///
    /// * `opener` - bool - true for the actor that completed the group, it does not wait.
    ///
    /// # Returns:
    ///
    /// Returns -Result<()>- once this actor is through and the token has been handed on.
    ///
    pub fn cross(&self, opener: bool) -> Result<()> {
        if !opener {
            self.hop()?;
        }
        self.pass_on()
    }

    /// Takes one token off the chain without giving it back.
    pub fn hop(&self) -> Result<()> {
        self.ctx.acquire(self.name)
    }

    /// Puts one token on the chain.
    pub fn pass_on(&self) -> Result<()> {
        self.ctx.release(self.name)
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use crate::modules::logger_functions::state_logger::MemoryLogger;
    use crate::modules::semaphore_functions::semaphore_set::SemaphoreSet;
    use crate::modules::state_object::shared_region::SharedRegion;

    fn contexts(count: usize) -> (Vec<ActorContext>, Arc<SemaphoreSet>) {
        let semaphores = Arc::new(SemaphoreSet::new());
        let region = Arc::new(SharedRegion::new(count));
        let logger = Arc::new(MemoryLogger::new());
        let ctxs = (0..count)
            .map(|i| {
                ActorContext::new(
                    format!("client {}", i),
                    Arc::clone(&semaphores),
                    Arc::clone(&region),
                    logger.clone(),
                )
                .unwrap()
            })
            .collect();
        (ctxs, semaphores)
    }

    #[test]
    fn test_chain_wakes_every_waiter_once() {
        let (ctxs, semaphores) = contexts(5);
        let mut ctxs = ctxs.into_iter();
        let opener = ctxs.next().unwrap();

        let waiters: Vec<_> = ctxs
            .map(|ctx| thread::spawn(move || ctx.relay(SemName::AllFinished).cross(false)))
            .collect();

        opener.relay(SemName::AllFinished).cross(true).unwrap();

        for waiter in waiters {
            waiter.join().unwrap().unwrap();
        }
        // Every hop gives the token back, so exactly one is left over.
        assert_eq!(semaphores.get(SemName::AllFinished).value(), 1);
    }

    #[test]
    fn test_extra_turn_by_first_does_not_starve_friends() {
        use crossbeam_channel as cbc;
        use std::time::Duration;

        // first, two friends and the opener completing the table
        let (ctxs, semaphores) = contexts(4);
        let mut ctxs = ctxs.into_iter();
        let first = ctxs.next().unwrap();
        let friends: Vec<ActorContext> = ctxs.by_ref().take(2).collect();
        let opener = ctxs.next().unwrap();

        let (done_tx, done_rx) = cbc::unbounded::<String>();
        let first_done = done_tx.clone();
        let first_handle = thread::spawn(move || {
            let gate = first.relay(SemName::FriendsArrived);
            gate.cross(false).unwrap();
            // second turn while ordering food
            gate.cross(false).unwrap();
            first_done.send(first.actor().to_string()).unwrap();
        });
        let friend_handles: Vec<_> = friends
            .into_iter()
            .map(|ctx| {
                let done = done_tx.clone();
                thread::spawn(move || {
                    ctx.relay(SemName::FriendsArrived).cross(false).unwrap();
                    done.send(ctx.actor().to_string()).unwrap();
                })
            })
            .collect();
        drop(done_tx);

        thread::sleep(Duration::from_millis(30));
        opener.relay(SemName::FriendsArrived).cross(true).unwrap();

        let mut woken = Vec::new();
        for _ in 0..3 {
            woken.push(done_rx.recv_timeout(Duration::from_secs(2)).expect("a crosser stayed blocked"));
        }
        woken.sort();
        assert_eq!(woken, vec!["client 0", "client 1", "client 2"]);

        first_handle.join().unwrap();
        for handle in friend_handles {
            handle.join().unwrap();
        }
        // the extra turn hands its token back
        assert_eq!(semaphores.get(SemName::FriendsArrived).value(), 1);
    }

    #[test]
    fn test_single_member_opens_without_waiting() {
        let (ctxs, semaphores) = contexts(1);
        ctxs[0].relay(SemName::FriendsArrived).cross(true).unwrap();
        assert_eq!(semaphores.get(SemName::FriendsArrived).value(), 1);

        ctxs[0].relay(SemName::FriendsArrived).hop().unwrap();
        assert_eq!(semaphores.get(SemName::FriendsArrived).value(), 0);
    }
}
