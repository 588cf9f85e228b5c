mod commands;
mod logger;

use std::fs;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use commands::CliError;
use meterwatch_core::MeterConfig;

#[derive(Parser)]
#[command(name = "meterwatch")]
#[command(about = "Threshold trend estimation for live telemetry")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); METERWATCH__* variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate when a recorded series crosses a threshold
    Estimate {
        /// JSON sample list or history payload
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        threshold: f64,

        /// Evaluation instant in Unix seconds (default: now)
        #[arg(long)]
        now: Option<f64>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay live-feed events (one JSON object per line) through a monitor
    Replay {
        /// Event file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long, default_value = "replay")]
        topic: String,

        /// Overrides monitor.default_threshold
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Print a synthetic demo signal as a JSON sample list
    Simulate {
        #[arg(short = 'n', long, default_value = "200")]
        count: usize,

        #[arg(long, default_value = "0")]
        seed: u64,

        /// First sample time in Unix seconds (default: now)
        #[arg(long)]
        start: Option<f64>,

        #[arg(long, default_value = "1")]
        step: f64,
    },

    /// Export a series as CSV
    Export {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

fn run(cli: Cli) -> Result<String, CliError> {
    let cfg = MeterConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Estimate {
            input,
            threshold,
            now,
            json,
        } => {
            let text = fs::read_to_string(input)?;
            commands::estimate(&text, threshold, now.unwrap_or_else(unix_now), json, &cfg)
        }
        Commands::Replay {
            input,
            topic,
            threshold,
        } => match input {
            Some(path) => {
                let file = fs::File::open(path)?;
                commands::replay(BufReader::new(file), &topic, threshold, &cfg)
            }
            None => commands::replay(io::stdin().lock(), &topic, threshold, &cfg),
        },
        Commands::Simulate {
            count,
            seed,
            start,
            step,
        } => commands::simulate(count, seed, start.unwrap_or_else(unix_now).floor(), step),
        Commands::Export { input } => {
            let text = fs::read_to_string(input)?;
            commands::export(&text, &cfg)
        }
        Commands::Config => commands::show_config(&cfg),
    }
}

fn main() {
    let cli = Cli::parse();
    logger::initialize_logger(cli.verbose);

    match run(cli) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
