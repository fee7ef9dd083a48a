//! ## Error Module
//! Every failure an actor can hit ends up as a [`RestaurantError`].
//!
//! There is no retry anywhere in the protocol. Leaf operations hand the error up with `?`,
//! the actor's `run` returns it, and the thread entry in the launcher logs it and reports
//! the actor as failed.
//!
//! ## Error kinds:
//! - **Config:** bad argument vector or config file. Nothing has been acquired yet.
//! - **Transport:** could not reach the semaphore set or the shared region.
//! - **Semaphore:** an acquire/release failed because the set was removed.
//! - **Protocol:** a broken invariant, e.g. the waiter woke up with no request pending.
//! - **Logger:** the state log or journal could not be written or read.
//! - **Poisoned:** another actor panicked while holding the shared region.
//! - **Spawn / Panicked:** the launcher could not start an actor thread, or the thread panicked.

use thiserror::Error;

use crate::modules::semaphore_functions::semaphore_set::SemName;

pub type Result<T> = std::result::Result<T, RestaurantError>;

#[derive(Debug, Error)]
pub enum RestaurantError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error on connecting to resources under key {key:#x}: {reason}")]
    Transport { key: u32, reason: String },

    #[error("error on the {op} operation for '{name}' semaphore access ({actor})")]
    Semaphore {
        actor: String,
        name: SemName,
        op: SemOp,
        #[source]
        source: SemaphoreError,
    },

    #[error("protocol violation ({actor}): {detail}")]
    Protocol { actor: String, detail: String },

    #[error(transparent)]
    Logger(#[from] LoggerError),

    #[error("shared region poisoned, an actor panicked inside a critical section")]
    Poisoned,

    #[error("failed to start {actor}: {source}")]
    Spawn {
        actor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{actor} panicked")]
    Panicked { actor: String },
}

/// Which side of a semaphore operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemOp {
    Acquire,
    Release,
}

impl std::fmt::Display for SemOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemOp::Acquire => write!(f, "down"),
            SemOp::Release => write!(f, "up"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemaphoreError {
    #[error("semaphore set has been removed")]
    Removed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("number of parameters is incorrect: expected {expected}, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("client process identification is wrong: {0}")]
    ClientId(String),

    #[error("error on the access key communication: {0}")]
    AccessKey(String),

    #[error("invalid value for '{key}' in config: {value}")]
    InvalidValue { key: String, value: String },

    #[error("table size must be at least 1")]
    EmptyTable,

    #[error("config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("state log {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] bincode::Error),

    #[error("corrupt journal record {index}: {reason}")]
    Corrupt { index: usize, reason: String },
}
