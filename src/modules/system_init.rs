//! ## System Init Module
//! Run configuration, read from a plain `key: value` file.
//!
//! ```text
//! table_size: 10
//! max_travel_ms: 1000
//! max_eat_ms: 500
//! max_cook_ms: 100
//! access_key: 0x1a2b
//! seed: 42
//! timeout_secs: 60
//! ```
//!
//! Missing keys keep their defaults and unknown keys are ignored. If the file does not exist it is
//! created with the defaults, so the next run has something to edit.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use log::info;

use crate::modules::entry::parse_key;
use crate::modules::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "restaurant.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub table_size: usize,
    pub max_travel: Duration,
    pub max_eat: Duration,
    pub max_cook: Duration,
    pub access_key: u32,
    pub seed: Option<u64>,
    pub timeout: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            table_size: 10,
            max_travel: Duration::from_millis(1000),
            max_eat: Duration::from_millis(500),
            max_cook: Duration::from_millis(100),
            access_key: 0x1a2b,
            seed: None,
            timeout: Duration::from_secs(60),
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| invalid(key, value))
}

impl SimulationConfig {
    /// parse
    /// Applies every `key: value` line of `text` on top of the defaults.
    ///
    /// # Arguments:
    ///
    /// * `text` - &str - config file contents.
    ///
    /// # Returns:
    ///
    /// Returns -Result<SimulationConfig, ConfigError>- the config, or the first bad value.
    ///
    pub fn parse(text: &str) -> Result<SimulationConfig, ConfigError> {
        let mut config = SimulationConfig::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                let (key, value) = (key.trim(), value.trim());
                match key {
                    "table_size" => config.table_size = parse_number(key, value)?,
                    "max_travel_ms" => config.max_travel = Duration::from_millis(parse_number(key, value)?),
                    "max_eat_ms" => config.max_eat = Duration::from_millis(parse_number(key, value)?),
                    "max_cook_ms" => config.max_cook = Duration::from_millis(parse_number(key, value)?),
                    "access_key" => config.access_key = parse_key(value).map_err(|_| invalid(key, value))?,
                    "seed" => config.seed = Some(parse_number(key, value)?),
                    "timeout_secs" => config.timeout = Duration::from_secs(parse_number(key, value)?),
                    _ => {}
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_size == 0 {
            return Err(ConfigError::EmptyTable);
        }
        Ok(())
    }

    /// Renders the config in the file format `parse` reads.
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "table_size: {}\nmax_travel_ms: {}\nmax_eat_ms: {}\nmax_cook_ms: {}\naccess_key: {:#x}\ntimeout_secs: {}\n",
            self.table_size,
            self.max_travel.as_millis(),
            self.max_eat.as_millis(),
            self.max_cook.as_millis(),
            self.access_key,
            self.timeout.as_secs(),
        );
        if let Some(seed) = self.seed {
            text.push_str(&format!("seed: {}\n", seed));
        }
        text
    }
}

/// load_config
/// Reads the config at `path`, or writes the defaults there if it does not exist yet.
///
/// # Arguments:
///
/// * `path` - &Path - config file location.
///
/// # Returns:
///
/// Returns -Result<SimulationConfig, ConfigError>-
///
pub fn load_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let io_err = |source| ConfigError::Io { path: path.display().to_string(), source };

    if path.exists() {
        let reader = BufReader::new(File::open(path).map_err(io_err)?);
        let mut text = String::new();
        for line in reader.lines() {
            text.push_str(&line.map_err(io_err)?);
            text.push('\n');
        }
        return SimulationConfig::parse(&text);
    }

    info!("{} not found, creating one with default values", path.display());
    let config = SimulationConfig::default();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut file = BufWriter::new(File::create(path).map_err(io_err)?);
    file.write_all(config.to_text().as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(config)
}

//----------------------------------TESTS-------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides_defaults() {
        let config = SimulationConfig::parse("table_size: 3\nmax_eat_ms: 20\nseed: 9\ncolour: blue\n").unwrap();
        assert_eq!(config.table_size, 3);
        assert_eq!(config.max_eat, Duration::from_millis(20));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_cook, SimulationConfig::default().max_cook);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            SimulationConfig::parse("table_size: many"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(SimulationConfig::parse("table_size: 0"), Err(ConfigError::EmptyTable)));
        assert!(SimulationConfig::parse("access_key: 0xzz").is_err());
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let path = std::env::temp_dir().join(format!("restaurant-{}-config.txt", std::process::id()));
        let _ = fs::remove_file(&path);

        let created = load_config(&path).unwrap();
        assert_eq!(created, SimulationConfig::default());
        assert!(path.exists());

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded, created);
        fs::remove_file(&path).unwrap();
    }
}
