//! CLI frontend for the Fairy Roamer companion simulation.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::HutSpec;

#[derive(Parser)]
#[command(
    name = "fr",
    about = "Fairy Roamer: companion fairies and crop fairy weighting, run headless",
    version,
    propagate_version = true
)]
struct Cli {
    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "log", action = ArgAction::Count, global = true)]
    log: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn companions for a set of huts and run the simulation
    Simulate {
        /// Number of ticks to simulate (default: 600 = ten seconds)
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// RNG seed for deterministic simulation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Hut as X,Y,BOXES (repeatable)
        #[arg(long = "hut", default_value = "10,10,4")]
        huts: Vec<HutSpec>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Save file to restore from and write back to
        #[arg(long)]
        save: Option<PathBuf>,

        /// Show all events (not just summary)
        #[arg(long)]
        verbose: bool,
    },

    /// Show the nightly crop fairy chance for a box count
    Chance {
        /// Boxes across all huts
        #[arg(short, long, default_value = "0")]
        boxes: u32,

        /// A mature fairy rose grows on the farm
        #[arg(long)]
        fairy_rose: bool,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Step through days, rolling the crop fairy and choosing its targets
    Season {
        /// Number of days to simulate, starting Spring 1 of year 1
        #[arg(short, long, default_value = "28")]
        days: u32,

        /// Save seed for the daily random stream
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Hut as X,Y,BOXES (repeatable)
        #[arg(long = "hut", default_value = "10,10,4")]
        huts: Vec<HutSpec>,

        /// Crop tiles scattered around the farm
        #[arg(long, default_value = "40")]
        crops: usize,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the configuration as JSON
    Config {
        /// Config file to validate and print instead of the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log);

    let result = match cli.command {
        Commands::Simulate {
            ticks,
            seed,
            huts,
            config,
            save,
            verbose,
        } => commands::simulate::run(
            ticks,
            seed,
            &huts,
            config.as_deref(),
            save.as_deref(),
            verbose,
        ),
        Commands::Chance {
            boxes,
            fairy_rose,
            config,
        } => commands::chance::run(boxes, fairy_rose, config.as_deref()),
        Commands::Season {
            days,
            seed,
            huts,
            crops,
            config,
        } => commands::season::run(days, seed, &huts, crops, config.as_deref()),
        Commands::Config { config } => commands::config::run(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
