//! ## Trace Audit Module
//! Checks a recorded run, the ordered list of snapshots every actor saved, against the rules a
//! correct round has to follow:
//!
//! - counters only grow and never pass the table size
//! - no client status ever goes backwards
//! - first and last client are set once and never change
//! - every request flag, and the order flag, is raised exactly once
//! - the waiter informs the chef, then takes food to the table, then takes the payment, once each
//! - nobody eats before the waiter has brought the food
//! - the bill is taken only after everyone finished eating
//! - the first client ordered, the last client asked for the bill, and everyone finished

use thiserror::Error;

use crate::modules::state_object::shared_state::{ChefStatus, ClientStatus, SharedState, WaiterStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSummary {
    pub snapshots: usize,
    pub table_size: usize,
    pub first: usize,
    pub last: usize,
    pub waiter_steps: Vec<WaiterStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("trace is empty")]
    Empty,

    #[error("snapshot {index}: {field} is {value}, table size is {table_size}")]
    CounterOverflow { index: usize, field: &'static str, value: usize, table_size: usize },

    #[error("snapshot {index}: {field} went down")]
    CounterDecreased { index: usize, field: &'static str },

    #[error("snapshot {index}: client {client} went back from {from:?} to {to:?}")]
    StatusRegressed { index: usize, client: usize, from: ClientStatus, to: ClientStatus },

    #[error("snapshot {index}: {field} changed after being set")]
    SeatChanged { index: usize, field: &'static str },

    #[error("snapshot {index}: {flag} raised a second time")]
    FlagRaisedTwice { index: usize, flag: &'static str },

    #[error("snapshot {index}: waiter entered {step:?} out of order")]
    WaiterOutOfOrder { index: usize, step: WaiterStatus },

    #[error("trace never raised {flag}")]
    FlagNeverRaised { flag: &'static str },

    #[error("snapshot {index}: chef cooking before any order")]
    CookWithoutOrder { index: usize },

    #[error("snapshot {index}: client {client} eating before the food was served")]
    EatBeforeServed { index: usize, client: usize },

    #[error("snapshot {index}: payment taken before everyone finished eating")]
    BillBeforeAllFinished { index: usize },

    #[error("trace ended with client {client} in {status:?}")]
    Unfinished { client: usize, status: ClientStatus },

    #[error("trace ended with the waiter having done {steps:?}")]
    WaiterIncomplete { steps: Vec<WaiterStatus> },

    #[error("trace never set {0}")]
    SeatMissing(&'static str),

    #[error("client {client} was {role} but never {action}")]
    WrongRequester { client: usize, role: &'static str, action: &'static str },
}

const WAITER_STEPS: [WaiterStatus; 3] =
    [WaiterStatus::InformChef, WaiterStatus::TakeToTable, WaiterStatus::ReceivePayment];

fn check_counter(index: usize, field: &'static str, prev: usize, now: usize, table_size: usize) -> Result<(), Violation> {
    if now > table_size {
        return Err(Violation::CounterOverflow { index, field, value: now, table_size });
    }
    if now < prev {
        return Err(Violation::CounterDecreased { index, field });
    }
    Ok(())
}

fn check_seat(index: usize, field: &'static str, prev: Option<usize>, now: Option<usize>) -> Result<(), Violation> {
    match (prev, now) {
        (Some(a), Some(b)) if a != b => Err(Violation::SeatChanged { index, field }),
        (Some(_), None) => Err(Violation::SeatChanged { index, field }),
        _ => Ok(()),
    }
}

fn raised(prev: bool, now: bool) -> bool {
    !prev && now
}

/// audit_trace
/// Walks the snapshots in order and checks every rule.
///
/// # Arguments:
///
/// * `trace` - &[SharedState] - snapshots in the order they were saved.
///
/// # Returns:
///
/// Returns -Result<TraceSummary, Violation>- a summary of a clean round, or the first rule broken.
///
pub fn audit_trace(trace: &[SharedState]) -> Result<TraceSummary, Violation> {
    let first_snapshot = trace.first().ok_or(Violation::Empty)?;
    let table_size = first_snapshot.table_size;

    let mut prev = SharedState::new(table_size);
    let mut waiter_steps: Vec<WaiterStatus> = Vec::new();
    let mut raises = [0usize; 4];
    let mut first_ordered = false;
    let mut last_asked_bill = false;

    for (index, state) in trace.iter().enumerate() {
        check_counter(index, "table_clients", prev.table_clients, state.table_clients, table_size)?;
        check_counter(index, "table_finish_eat", prev.table_finish_eat, state.table_finish_eat, table_size)?;
        check_seat(index, "table_first", prev.table_first, state.table_first)?;
        check_seat(index, "table_last", prev.table_last, state.table_last)?;

        for (client, (from, to)) in prev.client_status.iter().zip(state.client_status.iter()).enumerate() {
            if to < from {
                return Err(Violation::StatusRegressed { index, client, from: *from, to: *to });
            }
        }

        let flags = [
            ("food_request", prev.food_request, state.food_request),
            ("food_order", prev.food_order, state.food_order),
            ("food_ready", prev.food_ready, state.food_ready),
            ("payment_request", prev.payment_request, state.payment_request),
        ];
        for (slot, (flag, was, is)) in flags.iter().enumerate() {
            if raised(*was, *is) {
                raises[slot] += 1;
                if raises[slot] > 1 {
                    return Err(Violation::FlagRaisedTwice { index, flag: *flag });
                }
            }
        }

        if state.waiter_status != prev.waiter_status && WAITER_STEPS.contains(&state.waiter_status) {
            let expected = WAITER_STEPS.get(waiter_steps.len());
            if expected != Some(&state.waiter_status) {
                return Err(Violation::WaiterOutOfOrder { index, step: state.waiter_status });
            }
            if state.waiter_status == WaiterStatus::ReceivePayment && !state.everyone_finished_eating() {
                return Err(Violation::BillBeforeAllFinished { index });
            }
            waiter_steps.push(state.waiter_status);
        }

        if state.chef_status == ChefStatus::Cook && !state.food_order {
            return Err(Violation::CookWithoutOrder { index });
        }

        let served = waiter_steps.contains(&WaiterStatus::TakeToTable);
        if let Some(client) = state.client_status.iter().position(|s| *s >= ClientStatus::Eat) {
            if !served {
                return Err(Violation::EatBeforeServed { index, client });
            }
        }

        if let Some(first) = state.table_first {
            first_ordered |= state.client_status.get(first) == Some(&ClientStatus::FoodRequest);
        }
        if let Some(last) = state.table_last {
            last_asked_bill |= state.client_status.get(last) == Some(&ClientStatus::WaitForBill);
        }

        prev = state.clone();
    }

    for (client, status) in prev.client_status.iter().enumerate() {
        if *status != ClientStatus::Finished {
            return Err(Violation::Unfinished { client, status: *status });
        }
    }
    const FLAGS: [&str; 4] = ["food_request", "food_order", "food_ready", "payment_request"];
    if let Some(slot) = raises.iter().position(|count| *count == 0) {
        return Err(Violation::FlagNeverRaised { flag: FLAGS[slot] });
    }
    if waiter_steps.len() != WAITER_STEPS.len() {
        return Err(Violation::WaiterIncomplete { steps: waiter_steps });
    }
    let first = prev.table_first.ok_or(Violation::SeatMissing("table_first"))?;
    let last = prev.table_last.ok_or(Violation::SeatMissing("table_last"))?;
    if !first_ordered {
        return Err(Violation::WrongRequester { client: first, role: "first", action: "ordered food" });
    }
    if !last_asked_bill {
        return Err(Violation::WrongRequester { client: last, role: "last", action: "asked for the bill" });
    }

    Ok(TraceSummary {
        snapshots: trace.len(),
        table_size,
        first,
        last,
        waiter_steps,
    })
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Hand-built round for one client, in the order the actors save it.
    fn single_client_round() -> Vec<SharedState> {
        let mut trace = Vec::new();
        let mut s = SharedState::new(1);
        let mut push = |s: &SharedState| trace.push(s.clone());

        push(&s); // chef waits
        s.table_clients = 1;
        s.table_first = Some(0);
        s.table_last = Some(0);
        s.client_status[0] = ClientStatus::WaitForFriends;
        push(&s);
        s.client_status[0] = ClientStatus::FoodRequest;
        s.food_request = true;
        push(&s);
        s.food_request = false;
        push(&s);
        s.waiter_status = WaiterStatus::InformChef;
        s.food_order = true;
        push(&s);
        s.waiter_status = WaiterStatus::WaitForRequest;
        push(&s);
        s.client_status[0] = ClientStatus::WaitForFood;
        push(&s);
        s.chef_status = ChefStatus::Cook;
        s.food_ready = true;
        push(&s);
        s.chef_status = ChefStatus::Rest;
        push(&s);
        s.food_ready = false;
        push(&s);
        s.waiter_status = WaiterStatus::TakeToTable;
        push(&s);
        s.client_status[0] = ClientStatus::Eat;
        push(&s);
        s.waiter_status = WaiterStatus::WaitForRequest;
        push(&s);
        s.client_status[0] = ClientStatus::WaitForOthers;
        s.table_finish_eat = 1;
        push(&s);
        s.client_status[0] = ClientStatus::WaitForBill;
        s.payment_request = true;
        push(&s);
        s.payment_request = false;
        push(&s);
        s.waiter_status = WaiterStatus::ReceivePayment;
        push(&s);
        s.client_status[0] = ClientStatus::Finished;
        push(&s);
        trace
    }

    #[test]
    fn test_clean_round_passes() {
        let summary = audit_trace(&single_client_round()).unwrap();
        assert_eq!(summary.first, 0);
        assert_eq!(summary.last, 0);
        assert_eq!(summary.waiter_steps, WAITER_STEPS.to_vec());
    }

    #[test]
    fn test_empty_trace_fails() {
        assert_eq!(audit_trace(&[]), Err(Violation::Empty));
    }

    #[test]
    fn test_eating_before_serving_is_caught() {
        let mut trace = single_client_round();
        // client starts eating right after the chef rests, before TakeToTable
        let mut early = trace[8].clone();
        early.client_status[0] = ClientStatus::Eat;
        trace.insert(9, early);
        assert!(matches!(audit_trace(&trace), Err(Violation::EatBeforeServed { index: 9, client: 0 })));
    }

    #[test]
    fn test_status_regression_is_caught() {
        let mut trace = single_client_round();
        let mut back = trace.last().unwrap().clone();
        back.client_status[0] = ClientStatus::Eat;
        trace.push(back);
        assert!(matches!(audit_trace(&trace), Err(Violation::StatusRegressed { .. })));
    }

    #[test]
    fn test_unfinished_client_is_caught() {
        let mut trace = single_client_round();
        trace.pop();
        assert!(matches!(
            audit_trace(&trace),
            Err(Violation::Unfinished { client: 0, status: ClientStatus::WaitForBill })
        ));
    }

    #[test]
    fn test_cooking_without_order_flag_is_caught() {
        let mut trace = single_client_round();
        for state in trace.iter_mut() {
            state.food_order = false;
        }
        assert!(matches!(audit_trace(&trace), Err(Violation::CookWithoutOrder { index: 7 })));
    }

    #[test]
    fn test_order_flag_raised_twice_is_caught() {
        let mut trace = single_client_round();
        // cleared and raised again while the chef rests
        trace[8].food_order = false;
        assert!(matches!(
            audit_trace(&trace),
            Err(Violation::FlagRaisedTwice { index: 9, flag: "food_order" })
        ));
    }

    #[test]
    fn test_missing_order_flag_is_caught_without_cooking() {
        let mut trace = single_client_round();
        for state in trace.iter_mut() {
            state.food_order = false;
            if state.chef_status == ChefStatus::Cook {
                state.chef_status = ChefStatus::WaitForOrder;
            }
        }
        assert_eq!(audit_trace(&trace), Err(Violation::FlagNeverRaised { flag: "food_order" }));
    }

    #[test]
    fn test_counter_overflow_is_caught() {
        let mut trace = single_client_round();
        trace[1].table_clients = 2;
        assert!(matches!(audit_trace(&trace), Err(Violation::CounterOverflow { index: 1, .. })));
    }
}
