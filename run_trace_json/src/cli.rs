use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use optics::{Float, TraceOptions};

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

/// Trace the rays of a JSON simulation, and write their paths and the
/// surfaces as tab-separated text.
#[derive(Parser, Debug)]
#[command(name = "run_trace_json")]
pub struct Args {
    /// Path to the JSON simulation
    pub scene: PathBuf,

    /// Maximum number of interactions per ray, overrides the simulation's
    #[arg(short = 'n', long)]
    pub interactions: Option<usize>,

    /// Pad the paths of rays that stop early to the same length
    #[arg(long, overrides_with = "no_fill")]
    pub fill: bool,

    /// Don't pad the paths of rays that stop early
    #[arg(long, overrides_with = "fill")]
    pub no_fill: bool,

    /// Absolute tolerance of hit tests
    #[arg(long, value_parser = positive_float)]
    pub atol: Option<Float>,

    /// Where to write the ray paths
    #[arg(long, default_value = "rays.txt")]
    pub rays_out: PathBuf,

    /// Where to write the surfaces
    #[arg(long, default_value = "surfaces.txt")]
    pub surfaces_out: PathBuf,

    /// Trace rays one after the other, on the current thread
    #[arg(long)]
    pub sequential: bool,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// `opts` (read from the simulation file), with the command line overrides applied.
    pub fn trace_options(&self, mut opts: TraceOptions) -> TraceOptions {
        if let Some(n) = self.interactions {
            opts.interactions = n;
        }

        if self.fill {
            opts.fill = true;
        } else if self.no_fill {
            opts.fill = false;
        }

        if let Some(atol) = self.atol {
            opts.atol = atol;
        }

        opts
    }
}

fn positive_float(s: &str) -> Result<Float, String> {
    let x: Float = s.parse().map_err(|e| format!("{e}"))?;

    if x > 0.0 && x.is_finite() {
        Ok(x)
    } else {
        Err(format!("expected a positive number, got {x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_file_options() {
        let args = Args::try_parse_from(["run_trace_json", "scene.json"]).unwrap();
        let file_opts = TraceOptions {
            interactions: 7,
            fill: false,
            atol: 1e-6,
        };

        assert_eq!(args.trace_options(file_opts), file_opts);
        assert_eq!(args.rays_out, PathBuf::from("rays.txt"));
        assert!(!args.sequential);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "run_trace_json",
            "scene.json",
            "-n",
            "12",
            "--no-fill",
            "--atol",
            "1e-9",
        ])
        .unwrap();

        assert_eq!(
            args.trace_options(TraceOptions::default()),
            TraceOptions {
                interactions: 12,
                fill: false,
                atol: 1e-9,
            }
        );
    }

    #[test]
    fn test_last_fill_flag_wins() {
        let args = Args::try_parse_from(["run_trace_json", "s.json", "--no-fill", "--fill"]).unwrap();
        assert!(args.trace_options(TraceOptions::new(3, false)).fill);

        let args = Args::try_parse_from(["run_trace_json", "s.json", "--fill", "--no-fill"]).unwrap();
        assert!(!args.trace_options(TraceOptions::new(3, true)).fill);
    }

    #[test]
    fn test_invalid_atol() {
        assert!(Args::try_parse_from(["run_trace_json", "s.json", "--atol", "0"]).is_err());
        assert!(Args::try_parse_from(["run_trace_json", "s.json", "--atol", "x"]).is_err());
    }
}
