//! ## Simulation Module
//! Runs one round: creates the semaphore set and shared region, writes the log header, starts the
//! chef, the waiter and every client on their own thread, and waits for all of them.
//!
//! Each actor is started with an argument vector and validates it before doing anything else,
//! then connects to the resources by access key, exactly as a separately started process would.
//!
//! The launcher owns a deadline. If it expires the semaphore set is removed, every blocked actor
//! wakes up with an error, and the run is reported as timed out instead of hanging forever.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel as cbc;
use log::{error, info, warn};

use crate::modules::actor_functions::chef::Chef;
use crate::modules::actor_functions::client::Client;
use crate::modules::actor_functions::pacing::{Pacer, RandomPacer};
use crate::modules::actor_functions::waiter::{Request, Waiter};
use crate::modules::entry::{actor_argv, parse_client_args, parse_staff_args, Role};
use crate::modules::error::{RestaurantError, Result};
use crate::modules::logger_functions::journal::JournalLogger;
use crate::modules::logger_functions::state_logger::{FanoutLogger, MemoryLogger, StateLogger, TextLogger};
use crate::modules::state_object::critical_section::ActorContext;
use crate::modules::state_object::shared_region::SharedRegion;
use crate::modules::state_object::shared_state::SharedState;
use crate::modules::system_init::SimulationConfig;
use crate::modules::trace_audit::{audit_trace, TraceSummary, Violation};
use crate::modules::transport_functions::transport::{LocalTransport, Transport};

//----------------------------------------------Reports
#[derive(Debug)]
pub struct ActorReport {
    pub role: Role,
    pub result: Result<()>,
    pub served: Vec<Request>,
}

#[derive(Debug)]
pub struct RunReport {
    pub reports: Vec<ActorReport>,
    pub final_state: SharedState,
    pub trace: Vec<SharedState>,
    pub timed_out: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.reports.iter().all(|report| report.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ActorReport> {
        self.reports.iter().filter(|report| report.result.is_err())
    }

    /// Requests in the order the waiter served them.
    pub fn served(&self) -> &[Request] {
        self.reports
            .iter()
            .find(|report| report.role == Role::Waiter)
            .map(|report| report.served.as_slice())
            .unwrap_or(&[])
    }

    pub fn audit(&self) -> std::result::Result<TraceSummary, Violation> {
        audit_trace(&self.trace)
    }
}

//----------------------------------------------Launcher
/// Everything an actor thread needs besides its argument vector.
#[derive(Clone)]
struct Launch {
    transport: LocalTransport,
    table_size: usize,
    sinks: Arc<dyn StateLogger>,
    pacer: Arc<dyn Pacer>,
}

pub struct Simulation {
    config: SimulationConfig,
    log_file: PathBuf,
    journal_file: Option<PathBuf>,
    pacer: Arc<dyn Pacer>,
    transport: LocalTransport,
}

impl Simulation {
    /// new
    /// A run with random delays bounded by `config`.
    ///
    /// # Arguments:
    ///
    /// * `config` - SimulationConfig - table size, delays, access key, deadline.
    /// * `log_file` - &Path - text log destination, truncated at start.
    ///
    /// # Returns:
    ///
    /// Returns -Simulation-
    ///
    pub fn new(config: SimulationConfig, log_file: &Path) -> Simulation {
        let pacer = Arc::new(RandomPacer::new(config.max_travel, config.max_eat, config.max_cook, config.seed));
        Simulation {
            config,
            log_file: log_file.to_path_buf(),
            journal_file: None,
            pacer,
            transport: LocalTransport::new(),
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Simulation {
        self.pacer = pacer;
        self
    }

    pub fn with_journal(mut self, journal_file: &Path) -> Simulation {
        self.journal_file = Some(journal_file.to_path_buf());
        self
    }

    /// run
    /// Runs the round to completion, or until the deadline.
    ///
    /// # Returns:
    ///
    /// Returns -Result<RunReport>- per actor outcomes and the recorded trace. Errors only if the run
    /// could not be set up at all.
    ///
    pub fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        let table_size = self.config.table_size;
        let key = self.config.access_key;

        let connection = self.transport.create(key, table_size)?;
        let result = self.run_round(table_size, key, &connection.region);
        self.transport.destroy(key);
        result
    }

    fn run_round(&self, table_size: usize, key: u32, region: &SharedRegion) -> Result<RunReport> {
        let recorder = Arc::new(MemoryLogger::new());
        let mut sinks = FanoutLogger::new().with(recorder.clone());
        if let Some(path) = &self.journal_file {
            sinks = sinks.with(Arc::new(JournalLogger::create(path)?));
        }
        let sinks: Arc<dyn StateLogger> = Arc::new(sinks);

        // Header plus the initial state, before any actor can write.
        let header = TextLogger::create(&self.log_file, table_size)?;
        let initial = region.snapshot()?;
        header.save_state(&initial)?;
        sinks.save_state(&initial)?;
        drop(header);

        let launch = Launch {
            transport: self.transport.clone(),
            table_size,
            sinks,
            pacer: Arc::clone(&self.pacer),
        };

        let log_name = self.log_file.display().to_string();
        let mut roles = vec![Role::Chef, Role::Waiter];
        roles.extend((0..table_size).map(Role::Client));

        let (report_tx, report_rx) = cbc::unbounded::<ActorReport>();
        let mut handles = Vec::with_capacity(roles.len());
        for role in roles.iter() {
            let argv = actor_argv(role, &log_name, key);
            handles.push((role.clone(), start_actor(role.clone(), argv, launch.clone(), report_tx.clone())?));
        }
        drop(report_tx);
        info!("Started chef, waiter and {} clients", table_size);

        let (mut reports, timed_out) = self.collect(&report_rx, key);

        let reported: HashSet<String> = reports.iter().map(|r: &ActorReport| r.role.name()).collect();
        for (role, handle) in handles {
            let panicked = handle.join().is_err();
            if panicked && !reported.contains(&role.name()) {
                error!("{} panicked", role.name());
                reports.push(ActorReport {
                    result: Err(RestaurantError::Panicked { actor: role.name() }),
                    role,
                    served: Vec::new(),
                });
            }
        }

        Ok(RunReport {
            reports,
            final_state: region.snapshot()?,
            trace: recorder.snapshots(),
            timed_out,
        })
    }

    // Gathers reports until every actor thread is gone. On deadline, removes the semaphore set so
    // blocked actors fail and report.
    fn collect(&self, report_rx: &cbc::Receiver<ActorReport>, key: u32) -> (Vec<ActorReport>, bool) {
        let mut reports = Vec::new();
        let mut timed_out = false;
        let mut deadline = cbc::after(self.config.timeout);

        loop {
            let mut expired = false;
            cbc::select! {
                recv(report_rx) -> msg => match msg {
                    Ok(report) => {
                        if let Err(e) = &report.result {
                            warn!("{} failed: {}", report.role.name(), e);
                        }
                        reports.push(report);
                    }
                    Err(_) => break,
                },
                recv(deadline) -> _ => expired = true,
            }

            if expired {
                warn!("Deadline of {:?} passed, removing semaphore set {:#x}", self.config.timeout, key);
                timed_out = true;
                self.transport.destroy(key);
                deadline = cbc::never();
            }
        }
        (reports, timed_out)
    }
}

fn start_actor(
    role: Role,
    argv: Vec<String>,
    launch: Launch,
    report_tx: cbc::Sender<ActorReport>,
) -> Result<JoinHandle<()>> {
    let name = role.name();
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let mut served = Vec::new();
            let result = actor_main(&role, &argv, &launch, &mut served);
            if let Err(e) = &result {
                error!("{}", e);
            }
            let _ = report_tx.send(ActorReport { role, result, served });
        })
        .map_err(|source| RestaurantError::Spawn { actor: name, source })
}

/// actor_main
/// Entry point of one actor thread: validate the arguments, connect, then run the role.
///
/// # Arguments:
///
/// * `role` - &Role - which parser to use, the client id itself comes from `argv`.
/// * `argv` - &[String] - the actor's argument vector.
/// * `launch` - &Launch - transport, shared sinks and pacer.
/// * `served` - &mut Vec<Request> - filled by the waiter.
///
/// # Returns:
///
/// Returns -Result<()>-
///
fn actor_main(role: &Role, argv: &[String], launch: &Launch, served: &mut Vec<Request>) -> Result<()> {
    let args = match role {
        Role::Client(_) => parse_client_args(argv, launch.table_size)?,
        staff => parse_staff_args(staff.clone(), argv)?,
    };

    let connection = launch.transport.connect(args.key)?;
    let logger = FanoutLogger::new()
        .with(Arc::new(TextLogger::append(&args.log_file)?))
        .with(Arc::clone(&launch.sinks));
    let ctx = ActorContext::new(args.role.name(), connection.semaphores, connection.region, Arc::new(logger))?;

    match args.role {
        Role::Client(id) => Client::new(id, ctx, Arc::clone(&launch.pacer)).run(),
        Role::Waiter => {
            *served = Waiter::new(ctx).run()?;
            Ok(())
        }
        Role::Chef => Chef::new(ctx, Arc::clone(&launch.pacer)).run(),
    }
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::modules::actor_functions::pacing::ScriptedPacer;

    #[test]
    fn test_deadline_unblocks_a_stuck_round() {
        let log = std::env::temp_dir().join(format!("restaurant-{}-deadline.log", std::process::id()));
        let config = SimulationConfig {
            table_size: 2,
            access_key: 0x5eed,
            timeout: Duration::from_millis(50),
            ..SimulationConfig::default()
        };
        // clients are still travelling when the deadline passes
        let pacer = Arc::new(ScriptedPacer::with_travel_ms(&[300, 300]));
        let report = Simulation::new(config, &log).with_pacer(pacer).run().unwrap();

        assert!(report.timed_out);
        assert!(!report.succeeded());
        assert_eq!(report.reports.len(), 4);
        assert_eq!(report.failures().count(), 4);
        std::fs::remove_file(&log).unwrap();
    }
}
