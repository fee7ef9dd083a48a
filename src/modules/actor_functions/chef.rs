//! ## Chef Module
//! The chef waits for the order the waiter brings, cooks it and calls the waiter to pick it up.

use std::sync::Arc;
use std::thread::sleep;

use log::info;

use crate::modules::actor_functions::pacing::Pacer;
use crate::modules::error::Result;
use crate::modules::semaphore_functions::semaphore_set::SemName;
use crate::modules::state_object::critical_section::ActorContext;
use crate::modules::state_object::shared_state::ChefStatus;

pub struct Chef {
    ctx: ActorContext,
    pacer: Arc<dyn Pacer>,
}

impl Chef {
    pub fn new(ctx: ActorContext, pacer: Arc<dyn Pacer>) -> Chef {
        Chef { ctx, pacer }
    }

    pub fn run(&self) -> Result<()> {
        self.wait_for_order()?;
        self.process_order()?;
        info!("Chef done");
        Ok(())
    }

    pub fn wait_for_order(&self) -> Result<()> {
        self.ctx.with_state(|state| state.chef_status = ChefStatus::WaitForOrder)?;

        self.ctx.acquire(SemName::WaitOrder)
    }

    /// process_order
    /// Cooks, rests, then calls the waiter and waits for the waiter to come for the food.
    /// `food_ready` is raised when cooking starts, the waiter only reads it once called.
    pub fn process_order(&self) -> Result<()> {
        self.ctx.with_state(|state| {
            state.chef_status = ChefStatus::Cook;
            state.food_ready = true;
        })?;

        sleep(self.pacer.cook());

        self.ctx.with_state(|state| state.chef_status = ChefStatus::Rest)?;

        self.ctx.release(SemName::WaiterRequest)?;
        self.ctx.acquire(SemName::RequestReceived)
    }
}

//----------------------------------TESTS-------------------------------------------------------------
