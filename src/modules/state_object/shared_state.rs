//! ## Shared State Module
//! The one record every actor reads and writes. It is only ever touched through a
//! [`CriticalSection`](super::critical_section::CriticalSection), which holds the `mutex`
//! semaphore for as long as the record is borrowed.
//!
//! ## The structs includes:
//! - **SharedState**: statuses of chef, waiter and every client, table counters and request flags.
//! - **ChefStatus / WaiterStatus / ClientStatus**: per-role status enums. The numeric `code()`
//!   is what ends up in the text log.

use serde::{Deserialize, Serialize};

//----------------------------------------------Enums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChefStatus {
    WaitForOrder,
    Cook,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaiterStatus {
    WaitForRequest,
    InformChef,
    TakeToTable,
    ReceivePayment,
}

/// Client lifecycle, in the order a client walks through it.
/// `Travel` is the status before the client reaches the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClientStatus {
    Travel,
    WaitForFriends,
    FoodRequest,
    WaitForFood,
    Eat,
    WaitForOthers,
    WaitForBill,
    Finished,
}

impl ChefStatus {
    pub fn code(&self) -> u8 {
        match self {
            ChefStatus::WaitForOrder => 0,
            ChefStatus::Cook => 1,
            ChefStatus::Rest => 2,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChefStatus::WaitForOrder => "WaitForOrder",
            ChefStatus::Cook => "Cook",
            ChefStatus::Rest => "Rest",
        }
    }
}

impl WaiterStatus {
    pub fn code(&self) -> u8 {
        match self {
            WaiterStatus::WaitForRequest => 0,
            WaiterStatus::InformChef => 1,
            WaiterStatus::TakeToTable => 2,
            WaiterStatus::ReceivePayment => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WaiterStatus::WaitForRequest => "WaitForRequest",
            WaiterStatus::InformChef => "InformChef",
            WaiterStatus::TakeToTable => "TakeToTable",
            WaiterStatus::ReceivePayment => "ReceivePayment",
        }
    }
}

impl ClientStatus {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClientStatus::Travel => "Travel",
            ClientStatus::WaitForFriends => "WaitForFriends",
            ClientStatus::FoodRequest => "FoodRequest",
            ClientStatus::WaitForFood => "WaitForFood",
            ClientStatus::Eat => "Eat",
            ClientStatus::WaitForOthers => "WaitForOthers",
            ClientStatus::WaitForBill => "WaitForBill",
            ClientStatus::Finished => "Finished",
        }
    }
}

//----------------------------------------------Structs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedState {
    pub table_size: usize,
    pub chef_status: ChefStatus,
    pub waiter_status: WaiterStatus,
    pub client_status: Vec<ClientStatus>,

    pub table_clients: usize,               // Clients seated so far
    pub table_finish_eat: usize,            // Clients done eating so far
    pub table_first: Option<usize>,         // First client to sit down, orders the food
    pub table_last: Option<usize>,          // Last client to sit down, pays the bill

    pub food_request: bool,                 // Client -> waiter
    pub food_order: bool,                   // Waiter -> chef
    pub food_ready: bool,                   // Chef -> waiter
    pub payment_request: bool,              // Client -> waiter
}

impl SharedState {
    /// new
    /// Fresh state for one round: every client travelling, nobody seated, no flags raised.
    ///
    /// # Arguments:
    ///
    /// * `table_size` - usize - number of clients at the table (N).
    ///
    /// # Returns:
    ///
    /// Returns -SharedState- the initial record.
    ///
    pub fn new(table_size: usize) -> SharedState {
        SharedState {
            table_size,
            chef_status: ChefStatus::WaitForOrder,
            waiter_status: WaiterStatus::WaitForRequest,
            client_status: vec![ClientStatus::Travel; table_size],
            table_clients: 0,
            table_finish_eat: 0,
            table_first: None,
            table_last: None,
            food_request: false,
            food_order: false,
            food_ready: false,
            payment_request: false,
        }
    }

    pub fn is_table_complete(&self) -> bool {
        self.table_clients == self.table_size
    }

    pub fn everyone_finished_eating(&self) -> bool {
        self.table_finish_eat == self.table_size
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = SharedState::new(3);
        assert_eq!(state.client_status, vec![ClientStatus::Travel; 3]);
        assert_eq!(state.table_clients, 0);
        assert_eq!(state.table_first, None);
        assert_eq!(state.table_last, None);
        assert!(!state.food_request && !state.food_order && !state.food_ready && !state.payment_request);
        assert!(!state.is_table_complete());
    }

    #[test]
    fn test_client_status_follows_lifecycle_order() {
        assert!(ClientStatus::Travel < ClientStatus::WaitForFriends);
        assert!(ClientStatus::WaitForFood < ClientStatus::Eat);
        assert!(ClientStatus::WaitForBill < ClientStatus::Finished);
        assert_eq!(ClientStatus::Finished.code(), 7);
    }

    #[test]
    fn test_status_names() {
        assert_eq!(ClientStatus::WaitForBill.as_str(), "WaitForBill");
        assert_eq!(WaiterStatus::TakeToTable.as_str(), "TakeToTable");
        assert_eq!(ChefStatus::Rest.as_str(), "Rest");
    }
}
