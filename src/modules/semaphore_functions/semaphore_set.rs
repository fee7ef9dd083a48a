//! ## Semaphore Set Module
//! The seven named semaphores the restaurant runs on.
//!
//! | name            | init | role                                            |
//! |-----------------|------|-------------------------------------------------|
//! | mutex           | 1    | protects every read/write of the shared state   |
//! | waitOrder       | 0    | waiter -> chef, order placed                    |
//! | waiterRequest   | 0    | client/chef -> waiter, service requested        |
//! | requestReceived | 0    | waiter -> requester, request acknowledged       |
//! | foodArrived     | 0    | waiter -> clients, released once per client     |
//! | friendsArrived  | 0    | last client -> others, relay token              |
//! | allFinished     | 0    | last to finish -> others, relay token           |

use std::fmt;

use crate::modules::error::SemaphoreError;
use crate::modules::semaphore_functions::semaphore::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemName {
    Mutex,
    WaitOrder,
    WaiterRequest,
    RequestReceived,
    FoodArrived,
    FriendsArrived,
    AllFinished,
}

impl SemName {
    pub const ALL: [SemName; 7] = [
        SemName::Mutex,
        SemName::WaitOrder,
        SemName::WaiterRequest,
        SemName::RequestReceived,
        SemName::FoodArrived,
        SemName::FriendsArrived,
        SemName::AllFinished,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            SemName::Mutex => "mutex",
            SemName::WaitOrder => "waitOrder",
            SemName::WaiterRequest => "waiterRequest",
            SemName::RequestReceived => "requestReceived",
            SemName::FoodArrived => "foodArrived",
            SemName::FriendsArrived => "friendsArrived",
            SemName::AllFinished => "allFinished",
        }
    }

    pub fn initial_value(&self) -> u32 {
        match self {
            SemName::Mutex => 1,
            _ => 0,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct SemaphoreSet {
    members: [Semaphore; 7],
}

impl SemaphoreSet {
    pub fn new() -> SemaphoreSet {
        SemaphoreSet {
            members: SemName::ALL.map(|name| Semaphore::new(name.initial_value())),
        }
    }

    pub fn get(&self, name: SemName) -> &Semaphore {
        &self.members[name.index()]
    }

    pub fn acquire(&self, name: SemName) -> Result<(), SemaphoreError> {
        self.get(name).acquire()
    }

    pub fn release(&self, name: SemName) -> Result<(), SemaphoreError> {
        self.get(name).release()
    }

    /// Removes every member. Blocked actors wake up with an error.
    pub fn remove(&self) {
        for sem in self.members.iter() {
            sem.remove();
        }
    }
}

impl Default for SemaphoreSet {
    fn default() -> Self {
        SemaphoreSet::new()
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        let set = SemaphoreSet::new();
        assert_eq!(set.get(SemName::Mutex).value(), 1);
        for name in SemName::ALL.iter().skip(1) {
            assert_eq!(set.get(*name).value(), 0, "{} should start at 0", name);
        }
    }

    #[test]
    fn test_members_are_independent() {
        let set = SemaphoreSet::new();
        set.release(SemName::FoodArrived).unwrap();
        set.release(SemName::FoodArrived).unwrap();
        assert_eq!(set.get(SemName::FoodArrived).value(), 2);
        assert_eq!(set.get(SemName::AllFinished).value(), 0);
    }

    #[test]
    fn test_remove_fails_every_member() {
        let set = SemaphoreSet::new();
        set.remove();
        assert_eq!(set.acquire(SemName::Mutex), Err(SemaphoreError::Removed));
        assert_eq!(set.release(SemName::WaitOrder), Err(SemaphoreError::Removed));
    }
}
