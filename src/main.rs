use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

use restaurant_sim::modules::error::{ConfigError, Result};
use restaurant_sim::modules::logger_functions::journal::read_journal;
use restaurant_sim::modules::logger_functions::state_logger::{format_header, format_state};
use restaurant_sim::modules::simulation::{RunReport, Simulation};
use restaurant_sim::modules::system_init::{load_config, DEFAULT_CONFIG_FILE};

#[derive(Debug, Parser)]
#[command(name = "restaurant", about = "Dinner of friends: clients, a waiter and a chef on semaphores")]
struct Cli {
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one round and audit the recorded trace.
    Run {
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        #[arg(long, short)]
        table_size: Option<usize>,

        #[arg(long, short, default_value = "restaurant.log")]
        log: PathBuf,

        #[arg(long, short)]
        journal: Option<PathBuf>,

        #[arg(long, short)]
        seed: Option<u64>,

        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Print a journal in the text log format.
    Replay { journal: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .init();

    let outcome = match cli.command {
        Command::Run { config, table_size, log, journal, seed, timeout_secs } => {
            run(&config, table_size, &log, journal.as_deref(), seed, timeout_secs)
        }
        Command::Replay { journal } => replay(&journal),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}

fn run(
    config_file: &Path,
    table_size: Option<usize>,
    log_file: &Path,
    journal: Option<&Path>,
    seed: Option<u64>,
    timeout_secs: Option<u64>,
) -> Result<bool> {
    let mut config = load_config(config_file)?;
    if let Some(n) = table_size {
        config.table_size = n;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(secs) = timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    config.validate()?;
    info!("Table for {}, log in {}", config.table_size, log_file.display());

    let mut simulation = Simulation::new(config, log_file);
    if let Some(path) = journal {
        simulation = simulation.with_journal(path);
    }
    let report = simulation.run()?;
    Ok(summarize(&report))
}

fn summarize(report: &RunReport) -> bool {
    for failure in report.failures() {
        if let Err(e) = &failure.result {
            println!("{:<10} failed: {}", failure.role.name(), e);
        }
    }
    if report.timed_out {
        println!("Round did not finish before the deadline");
        return false;
    }

    let served: Vec<&str> = report.served().iter().map(|r| r.as_str()).collect();
    println!("Waiter served: {}", served.join(", "));
    let last = &report.final_state;
    let clients: Vec<&str> = last.client_status.iter().map(|s| s.as_str()).collect();
    println!("Chef: {}, waiter: {}", last.chef_status.as_str(), last.waiter_status.as_str());
    println!("Clients: {}", clients.join(" "));
    print!("Final state:\n{}", format_state(last));

    match report.audit() {
        Ok(summary) => {
            println!(
                "Trace clean: {} snapshots, first client {}, last client {}",
                summary.snapshots, summary.first, summary.last
            );
            report.succeeded()
        }
        Err(violation) => {
            println!("Trace violation: {}", violation);
            false
        }
    }
}

fn replay(journal: &Path) -> Result<bool> {
    let snapshots = read_journal(journal)?;
    let first = snapshots.first().ok_or_else(|| ConfigError::InvalidValue {
        key: "journal".to_string(),
        value: format!("{} holds no snapshots", journal.display()),
    })?;
    print!("{}", format_header(first.table_size));
    for state in snapshots.iter() {
        print!("{}", format_state(state));
    }
    Ok(true)
}
