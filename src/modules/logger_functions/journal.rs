//! ## Journal Module
//! Binary state log. Every snapshot becomes one frame:
//!
//! ```text
//! | len: u32 LE | crc32: u32 LE | bincode(SharedState): len bytes |
//! ```
//!
//! The checksum is taken over the encoded snapshot. `read_journal` refuses a frame whose checksum
//! does not match, and a frame cut short by a crash.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crc32fast::Hasher;

use crate::modules::error::LoggerError;
use crate::modules::logger_functions::state_logger::StateLogger;
use crate::modules::state_object::shared_state::SharedState;

const FRAME_HEADER_LEN: usize = 8;

/// calc_checksum
/// CRC32 of an encoded snapshot.
///
/// # Arguments:
///
/// * `bytes` - &[u8] - encoded snapshot.
///
/// # Returns:
///
/// Returns -u32- the checksum.
///
pub fn calc_checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// encode_frame
/// Serializes a snapshot into one journal frame.
///
/// # Arguments:
///
/// * `state` - &SharedState - snapshot to encode.
///
/// # Returns:
///
/// Returns -Result<Vec<u8>, LoggerError>- the complete frame, header included.
///
pub fn encode_frame(state: &SharedState) -> Result<Vec<u8>, LoggerError> {
    let payload = bincode::serialize(state).map_err(LoggerError::Encode)?;
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&calc_checksum(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// decode_frames
/// Splits a journal buffer back into snapshots.
///
/// # Arguments:
///
/// * `buffer` - &[u8] - whole journal contents.
///
/// # Returns:
///
/// Returns -Result<Vec<SharedState>, LoggerError>- every snapshot in write order, or the first corrupt frame.
///
pub fn decode_frames(buffer: &[u8]) -> Result<Vec<SharedState>, LoggerError> {
    let mut snapshots = Vec::new();
    let mut rest = buffer;

    while !rest.is_empty() {
        let index = snapshots.len();
        let corrupt = |reason: &str| LoggerError::Corrupt { index, reason: reason.to_string() };

        if rest.len() < FRAME_HEADER_LEN {
            return Err(corrupt("truncated frame header"));
        }
        let len = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let checksum = u32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]);
        let body = &rest[FRAME_HEADER_LEN..];
        if body.len() < len {
            return Err(corrupt("truncated frame body"));
        }

        let payload = &body[..len];
        if calc_checksum(payload) != checksum {
            return Err(corrupt("checksum mismatch"));
        }
        let state: SharedState = bincode::deserialize(payload)
            .map_err(|e| corrupt(&format!("failed to deserialize snapshot: {}", e)))?;
        snapshots.push(state);
        rest = &body[len..];
    }

    Ok(snapshots)
}

/// Reads and verifies a whole journal file.
pub fn read_journal(path: &Path) -> Result<Vec<SharedState>, LoggerError> {
    let buffer = fs::read(path)
        .map_err(|source| LoggerError::Io { path: path.display().to_string(), source })?;
    decode_frames(&buffer)
}

pub struct JournalLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl JournalLogger {
    /// Creates (or truncates) the journal at `path`.
    pub fn create(path: &Path) -> Result<JournalLogger, LoggerError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| LoggerError::Io { path: path.display().to_string(), source })?;
        Ok(JournalLogger { path: path.to_path_buf(), file: Mutex::new(file) })
    }
}

impl StateLogger for JournalLogger {
    fn save_state(&self, state: &SharedState) -> Result<(), LoggerError> {
        let frame = encode_frame(state)?;
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(&frame)
            .and_then(|_| file.flush())
            .map_err(|source| LoggerError::Io { path: self.path.display().to_string(), source })
    }
}

//----------------------------------TESTS-------------------------------------------------------------
