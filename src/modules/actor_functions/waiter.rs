//! ## Waiter Module
//! The waiter serves exactly three requests per round: the food order from the first client,
//! the food-ready call from the chef, and the bill from the last client to sit down.
//!
//! ## Request handling:
//! - **FoodRequest:** `inform_chef`, passes the order on through `waitOrder`.
//! - **FoodReady:** `take_food_to_table`, releases `foodArrived` once per client.
//! - **Bill:** `receive_payment`, acknowledges the payer a second time on `requestReceived`.
//!
//! Every request is acknowledged on `requestReceived` as soon as it is read. The bill gets the
//! extra acknowledgement on top of that. Both are needed, do not merge them.

use log::{debug, info};

use crate::modules::error::{RestaurantError, Result};
use crate::modules::semaphore_functions::semaphore_set::SemName;
use crate::modules::state_object::critical_section::ActorContext;
use crate::modules::state_object::shared_state::WaiterStatus;

pub const REQUESTS_PER_ROUND: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    FoodRequest,
    FoodReady,
    Bill,
}

impl Request {
    pub fn as_str(&self) -> &str {
        match self {
            Request::FoodRequest => "food request",
            Request::FoodReady => "food ready",
            Request::Bill => "bill",
        }
    }
}

pub struct Waiter {
    ctx: ActorContext,
}

impl Waiter {
    pub fn new(ctx: ActorContext) -> Waiter {
        Waiter { ctx }
    }

    /// run
    /// Serves `REQUESTS_PER_ROUND` requests, whatever order they come in.
    ///
    /// # Returns:
    ///
    /// Returns -Result<Vec<Request>>- the requests in the order they were served.
    ///
    pub fn run(&self) -> Result<Vec<Request>> {
        let mut served = Vec::with_capacity(REQUESTS_PER_ROUND);
        for _ in 0..REQUESTS_PER_ROUND {
            let request = self.await_request()?;
            debug!("Waiter got {:?}", request);
            match request {
                Request::FoodRequest => self.inform_chef()?,
                Request::FoodReady => self.take_food_to_table()?,
                Request::Bill => self.receive_payment()?,
            }
            served.push(request);
        }
        info!("Waiter served {:?}", served);
        Ok(served)
    }

    /// await_request
    /// Waits for a client or the chef to call, then reads which request it was.
    /// Flags are checked in priority order food request, food ready, payment.
    ///
    /// # Returns:
    ///
    /// Returns -Result<Request>- the request taken, or a protocol violation if no flag was raised.
    ///
    pub fn await_request(&self) -> Result<Request> {
        self.ctx.with_state(|state| state.waiter_status = WaiterStatus::WaitForRequest)?;

        self.ctx.acquire(SemName::WaiterRequest)?;

        let request = self.ctx.with_state(|state| {
            if state.food_request {
                state.food_request = false;
                Some(Request::FoodRequest)
            } else if state.food_ready {
                state.food_ready = false;
                Some(Request::FoodReady)
            } else if state.payment_request {
                state.payment_request = false;
                Some(Request::Bill)
            } else {
                None
            }
        })?;

        let request = request.ok_or_else(|| RestaurantError::Protocol {
            actor: self.ctx.actor().to_string(),
            detail: "woken on waiterRequest with no request pending".to_string(),
        })?;

        self.ctx.release(SemName::RequestReceived)?;
        Ok(request)
    }

    /// inform_chef
    /// Passes the food order on to the chef. The InformChef state is saved before the waiter goes
    /// back to waiting for requests.
    pub fn inform_chef(&self) -> Result<()> {
        let mut section = self.ctx.enter()?;
        section.waiter_status = WaiterStatus::InformChef;
        section.food_order = true;
        section.save()?;
        section.waiter_status = WaiterStatus::WaitForRequest;
        section.leave()?;

        self.ctx.release(SemName::WaitOrder)
    }

    /// take_food_to_table
    /// Serves every client at the table.
    pub fn take_food_to_table(&self) -> Result<()> {
        self.ctx.with_state(|state| state.waiter_status = WaiterStatus::TakeToTable)?;

        self.ctx.release_n(SemName::FoodArrived, self.ctx.table_size())
    }

    /// receive_payment
    /// Takes the bill from the paying client.
    pub fn receive_payment(&self) -> Result<()> {
        self.ctx.with_state(|state| state.waiter_status = WaiterStatus::ReceivePayment)?;

        self.ctx.release(SemName::RequestReceived)
    }
}

//----------------------------------TESTS-------------------------------------------------------------
