use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Verbosity of the `log` output, from `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// `RUST_LOG` still takes precedence for the modules it names.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Generate a random JSON simulation, to be traced with `run_trace_json`.
#[derive(Parser, Debug)]
#[command(name = "gen_rand_scene")]
pub struct Args {
    /// Where to write the simulation
    pub out: PathBuf,

    /// Number of surfaces (random if omitted)
    #[arg(long)]
    pub surfaces: Option<usize>,

    /// Number of rays (random if omitted)
    #[arg(long)]
    pub rays: Option<usize>,

    /// Seed of the random generator, for reproducible scenes
    #[arg(long)]
    pub seed: Option<u64>,

    /// Interaction budget stored in the simulation
    #[arg(long, default_value_t = 100)]
    pub interactions: usize,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
