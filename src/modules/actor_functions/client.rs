//! ## Client Module
//! Life cycle of one client, run once per actor:
//!
//! ```text
//! travel -> assemble -> [order_food if first] -> wait_food -> eat -> wait_and_pay -> Finished
//! ```
//!
//! - The first client to sit down orders the food, but only once the whole table is seated.
//! - The last client to sit down pays the bill, once everyone has finished eating.
//! - Both "everyone is here" and "everyone is done" are relay gates, see `relay_gate`.
//!
//! Whether a client is first/last (at the table, or to finish eating) is decided inside the
//! critical section that changed the counters. It is never re-read from shared state afterwards.

use std::sync::Arc;
use std::thread::sleep;

use log::{debug, info};

use crate::modules::actor_functions::pacing::Pacer;
use crate::modules::error::Result;
use crate::modules::semaphore_functions::semaphore_set::SemName;
use crate::modules::state_object::critical_section::ActorContext;
use crate::modules::state_object::shared_state::ClientStatus;

/// Where a client ended up when sitting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub first: bool,
    pub last: bool,
}

pub struct Client {
    id: usize,
    ctx: ActorContext,
    pacer: Arc<dyn Pacer>,
}

impl Client {
    pub fn new(id: usize, ctx: ActorContext, pacer: Arc<dyn Pacer>) -> Client {
        Client { id, ctx, pacer }
    }

    /// run
    /// Walks the whole life cycle.
    ///
    /// # Returns:
    ///
    /// Returns -Result<()>- Ok once the client is Finished, or the first fatal error.
    ///
    pub fn run(&self) -> Result<()> {
        self.travel();
        let seat = self.assemble()?;
        if seat.first {
            self.order_food()?;
        }
        self.wait_food()?;
        self.eat();
        self.wait_and_pay()?;
        info!("Client {} finished", self.id);
        Ok(())
    }

    /// Client takes its time getting to the restaurant.
    pub fn travel(&self) {
        sleep(self.pacer.travel(self.id));
    }

    /// assemble
    /// Sits down and waits until the table is complete. The client that completes the table skips
    /// the wait and goes straight to WaitForFood, unless it is also the first and still has to order.
    ///
    /// # Returns:
    ///
    /// Returns -Result<Seat>- whether this client was first and/or last to sit down.
    ///
    pub fn assemble(&self) -> Result<Seat> {
        let id = self.id;
        let seat = self.ctx.with_state(|state| {
            let first = state.table_clients == 0;
            if first {
                state.table_first = Some(id);
            }
            state.client_status[id] = ClientStatus::WaitForFriends;
            state.table_clients += 1;

            // A lone client is first and last: it still has to order before waiting for food.
            let last = state.is_table_complete();
            if last {
                state.table_last = Some(id);
                if !first {
                    state.client_status[id] = ClientStatus::WaitForFood;
                }
            }
            Seat { first, last }
        })?;
        debug!("Client {} seated, first: {}, last: {}", id, seat.first, seat.last);

        self.ctx.relay(SemName::FriendsArrived).cross(seat.last)?;
        Ok(seat)
    }

    /// order_food
    /// First client only. Raises the food request, takes one more turn through the table-complete
    /// gate, then calls the waiter and waits for the waiter to take the request.
    ///
    /// The token goes back on the gate after this turn, a friend may still be blocked on it.
    pub fn order_food(&self) -> Result<()> {
        let id = self.id;
        self.ctx.with_state(|state| {
            state.client_status[id] = ClientStatus::FoodRequest;
            state.food_request = true;
        })?;

        self.ctx.relay(SemName::FriendsArrived).cross(false)?;
        self.ctx.release(SemName::WaiterRequest)?;
        self.ctx.acquire(SemName::RequestReceived)?;
        info!("Client {} ordered food", id);
        Ok(())
    }

    /// wait_food
    /// Waits for the waiter to bring the food, then starts eating.
    pub fn wait_food(&self) -> Result<()> {
        let id = self.id;
        self.ctx.with_state(|state| state.client_status[id] = ClientStatus::WaitForFood)?;

        self.ctx.acquire(SemName::FoodArrived)?;

        self.ctx.with_state(|state| state.client_status[id] = ClientStatus::Eat)?;
        debug!("Client {} {}", id, ClientStatus::Eat.as_str());
        Ok(())
    }

    /// Client enjoys the meal.
    pub fn eat(&self) {
        sleep(self.pacer.eat(self.id));
    }

    /// wait_and_pay
    /// Waits for everyone to finish eating. The last client to sit down then asks for the bill and
    /// waits for the waiter before leaving.
    pub fn wait_and_pay(&self) -> Result<()> {
        let id = self.id;
        let (last_to_finish, pays) = self.ctx.with_state(|state| {
            state.client_status[id] = ClientStatus::WaitForOthers;
            state.table_finish_eat += 1;
            (state.everyone_finished_eating(), state.table_last == Some(id))
        })?;

        let all_finished = self.ctx.relay(SemName::AllFinished);
        all_finished.cross(last_to_finish)?;

        if pays {
            self.ctx.with_state(|state| {
                state.client_status[id] = ClientStatus::WaitForBill;
                state.payment_request = true;
            })?;

            all_finished.hop()?;
            self.ctx.release(SemName::WaiterRequest)?;
            self.ctx.acquire(SemName::RequestReceived)?;
            info!("Client {} paid the bill", id);
        }

        self.ctx.with_state(|state| state.client_status[id] = ClientStatus::Finished)?;

        all_finished.pass_on()
    }
}
