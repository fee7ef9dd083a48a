//! ## Entry Module
//! Argument vectors every actor is started with, validated before the actor touches any semaphore.
//!
//! - client: `<id> <log-file> <access-key>`
//! - waiter: `<log-file> <access-key>`
//! - chef:   `<log-file> <access-key>`
//!
//! Keys and client ids are parsed the way C `strtol(.., 0)` reads them: `0x` prefix for hex, a leading `0` for
//! octal, decimal otherwise, and nothing may trail the number.

use std::path::PathBuf;

use crate::modules::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Client(usize),
    Waiter,
    Chef,
}

impl Role {
    pub fn name(&self) -> String {
        match self {
            Role::Client(id) => format!("client {}", id),
            Role::Waiter => "waiter".to_string(),
            Role::Chef => "chef".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorArgs {
    pub role: Role,
    pub log_file: PathBuf,
    pub key: u32,
}

// C `strtol(.., 0)` digits: optional `+`, then `0x` hex, leading `0` octal, or decimal.
// Every remaining character must be a digit of that radix.
fn parse_base0(text: &str) -> Option<u32> {
    let unsigned = text.trim_start();
    let unsigned = unsigned.strip_prefix('+').unwrap_or(unsigned);
    let (digits, radix) = if let Some(hex) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        (hex, 16)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (&unsigned[1..], 8)
    } else {
        (unsigned, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

/// parse_key
/// Reads an access key with C base-0 rules.
///
/// # Arguments:
///
/// * `text` - &str - key as given on the command line.
///
/// # Returns:
///
/// Returns -Result<u32, ConfigError>- the key, or `AccessKey` if it is not a whole number.
///
pub fn parse_key(text: &str) -> Result<u32, ConfigError> {
    parse_base0(text).ok_or_else(|| ConfigError::AccessKey(text.to_string()))
}

fn check_count(args: &[String], expected: usize) -> Result<(), ConfigError> {
    if args.len() != expected {
        return Err(ConfigError::ArgumentCount { expected, got: args.len() });
    }
    Ok(())
}

/// parse_client_args
/// Validates `<id> <log-file> <access-key>`.
///
/// # Arguments:
///
/// * `args` - &[String] - arguments without the program name.
/// * `table_size` - usize - ids must be below this.
///
/// # Returns:
///
/// Returns -Result<ActorArgs, ConfigError>-
///
pub fn parse_client_args(args: &[String], table_size: usize) -> Result<ActorArgs, ConfigError> {
    check_count(args, 3)?;
    let id = parse_base0(&args[0])
        .map(|id| id as usize)
        .filter(|id| *id < table_size)
        .ok_or_else(|| ConfigError::ClientId(args[0].clone()))?;
    Ok(ActorArgs {
        role: Role::Client(id),
        log_file: PathBuf::from(&args[1]),
        key: parse_key(&args[2])?,
    })
}

/// Validates `<log-file> <access-key>` for the waiter or the chef.
pub fn parse_staff_args(role: Role, args: &[String]) -> Result<ActorArgs, ConfigError> {
    check_count(args, 2)?;
    Ok(ActorArgs {
        role,
        log_file: PathBuf::from(&args[0]),
        key: parse_key(&args[1])?,
    })
}

/// Builds the argument vector the launcher hands to an actor.
pub fn actor_argv(role: &Role, log_file: &str, key: u32) -> Vec<String> {
    let mut argv = Vec::with_capacity(3);
    if let Role::Client(id) = role {
        argv.push(id.to_string());
    }
    argv.push(log_file.to_string());
    argv.push(format!("{:#x}", key));
    argv
}

//----------------------------------TESTS-------------------------------------------------------------
