//! ## State Logger Module
//! Sinks for shared state snapshots. Actors call `save_state` from inside a critical section,
//! every time they change the state.
//!
//! ## The structs includes:
//! - **TextLogger**: appends one human readable row per snapshot to a file.
//! - **MemoryLogger**: keeps every snapshot in memory, used by the launcher to audit a run and by tests.
//! - **FanoutLogger**: forwards each snapshot to several loggers.
//!
//! ## Text format
//! ```text
//!                        Restaurant - Description of the internal state
//!
//!  CH  WT  C00 C01 C02  ATT FIE 1st las
//!   0   0   0   0   0    0   0  --  --
//! ```
//! `CH`/`WT`/`Cnn` are status codes, `ATT` is clients at the table, `FIE` is clients finished eating,
//! `1st`/`las` are the first and last clients to sit down.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::modules::error::LoggerError;
use crate::modules::state_object::shared_state::SharedState;

pub trait StateLogger: Send + Sync {
    fn save_state(&self, state: &SharedState) -> Result<(), LoggerError>;
}

//----------------------------------------------Formatting
/// format_header
/// Title and column header for a table of `table_size` clients.
///
/// # Arguments:
///
/// * `table_size` - usize - number of client columns.
///
/// # Returns:
///
/// Returns -String- the header lines, newline terminated.
///
pub fn format_header(table_size: usize) -> String {
    let mut header = String::new();
    let _ = writeln!(header, "{:>24}Restaurant - Description of the internal state", "");
    let _ = writeln!(header);
    header.push_str(" CH  WT ");
    for i in 0..table_size {
        let _ = write!(header, " C{:02}", i);
    }
    header.push_str("  ATT FIE 1st las\n");
    header
}

/// format_state
/// One row of the text log.
///
/// # Arguments:
///
/// * `state` - &SharedState - snapshot to render.
///
/// # Returns:
///
/// Returns -String- the row, newline terminated.
///
pub fn format_state(state: &SharedState) -> String {
    let mut row = String::new();
    let _ = write!(row, " {:>2}  {:>2} ", state.chef_status.code(), state.waiter_status.code());
    for status in state.client_status.iter() {
        let _ = write!(row, " {:>3}", status.code());
    }
    let _ = writeln!(
        row,
        "  {:>3} {:>3} {:>3} {:>3}",
        state.table_clients,
        state.table_finish_eat,
        format_id(state.table_first),
        format_id(state.table_last),
    );
    row
}

fn format_id(id: Option<usize>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "--".to_string(),
    }
}

//----------------------------------------------TextLogger
pub struct TextLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl TextLogger {
    /// create
    /// Truncates `path` and writes the header, then keeps the file open for appending rows.
    ///
    /// # Arguments:
    ///
    /// * `path` - &Path - log destination.
    /// * `table_size` - usize - number of clients, for the header.
    ///
    /// # Returns:
    ///
    /// Returns -Result<TextLogger, LoggerError>- the open logger.
    ///
    pub fn create(path: &Path, table_size: usize) -> Result<TextLogger, LoggerError> {
        let io_err = |source| LoggerError::Io { path: path.display().to_string(), source };
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(format_header(table_size).as_bytes()).map_err(io_err)?;
        Ok(TextLogger { path: path.to_path_buf(), file: Mutex::new(file) })
    }

    /// Appends to an existing log without writing a new header.
    pub fn append(path: &Path) -> Result<TextLogger, LoggerError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| LoggerError::Io { path: path.display().to_string(), source })?;
        Ok(TextLogger { path: path.to_path_buf(), file: Mutex::new(file) })
    }
}

impl StateLogger for TextLogger {
    fn save_state(&self, state: &SharedState) -> Result<(), LoggerError> {
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(format_state(state).as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| LoggerError::Io { path: self.path.display().to_string(), source })
    }
}

//----------------------------------------------MemoryLogger
#[derive(Debug, Default)]
pub struct MemoryLogger {
    snapshots: Mutex<Vec<SharedState>>,
}

impl MemoryLogger {
    pub fn new() -> MemoryLogger {
        MemoryLogger::default()
    }

    pub fn snapshots(&self) -> Vec<SharedState> {
        self.snapshots.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

impl StateLogger for MemoryLogger {
    fn save_state(&self, state: &SharedState) -> Result<(), LoggerError> {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(state.clone());
        Ok(())
    }
}

//----------------------------------------------FanoutLogger
#[derive(Default)]
pub struct FanoutLogger {
    sinks: Vec<Arc<dyn StateLogger>>,
}

impl FanoutLogger {
    pub fn new() -> FanoutLogger {
        FanoutLogger::default()
    }

    pub fn with(mut self, sink: Arc<dyn StateLogger>) -> FanoutLogger {
        self.sinks.push(sink);
        self
    }
}

impl StateLogger for FanoutLogger {
    fn save_state(&self, state: &SharedState) -> Result<(), LoggerError> {
        for sink in self.sinks.iter() {
            sink.save_state(state)?;
        }
        Ok(())
    }
}

//----------------------------------TESTS-------------------------------------------------------------
