// Market Simulation - CLI driver
// Single entry point for running, playing and sweeping simulations

use clap::{Parser, Subcommand};
use market_sim::{Config, ConfigError};
use tracing::{error, info, warn};

// Load command modules from cli directory
#[path = "../cli/run_commands.rs"]
mod run_commands;
#[path = "../cli/play_commands.rs"]
mod play_commands;

#[derive(Parser)]
#[command(name = "market-sim")]
#[command(version = "0.1.0")]
#[command(about = "Synthetic stock market simulation", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    /// Override the configured random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Fast-forward a full run without trading
    Run {
        /// Print the final report as JSON
        #[arg(long)]
        json: bool,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Play in real time, trading from stdin
    Play {
        /// Override the wall-clock length of a tick
        #[arg(long)]
        tick_millis: Option<u64>,
    },

    /// Simulate many seeds in parallel with a buy-and-hold portfolio
    Sweep {
        /// Number of runs
        #[arg(short, long, default_value = "50")]
        runs: u64,

        /// First seed; runs use consecutive seeds
        #[arg(long, default_value = "1")]
        start_seed: u64,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging first (before config load so we can see config errors)
    let log_level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🪐 Market Simulation v0.1.0");
    info!("📁 Config: {}", cli.config);

    match cli.command {
        // Init doesn't require config (it creates it)
        Commands::Init { force } => {
            init_config(&cli.config, force)?;
        }

        Commands::Run { json, quiet } => {
            let config = load_config_or_exit(&cli.config, cli.seed)?;
            run_commands::run_headless(config, json, quiet)?;
        }

        Commands::Play { tick_millis } => {
            let mut config = load_config_or_exit(&cli.config, cli.seed)?;
            if let Some(ms) = tick_millis {
                config.simulation.tick_millis = ms.max(1);
            }
            play_commands::play(config).await?;
        }

        Commands::Sweep { runs, start_seed, json } => {
            let config = load_config_or_exit(&cli.config, cli.seed)?;
            run_commands::run_sweep(config, runs, start_seed, json)?;
        }
    }

    Ok(())
}

/// Load config (defaults when the file is absent) or exit with a helpful message
fn load_config_or_exit(path: &str, seed: Option<u64>) -> Result<Config, Box<dyn std::error::Error>> {
    let loaded = if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        warn!("⚠️  {} not found, using built-in defaults", path);
        Ok(Config::default())
    };

    match loaded {
        Ok(mut config) => {
            if seed.is_some() {
                config.simulation.seed = seed;
            }
            Ok(config)
        }
        Err(e) => {
            error!("❌ Configuration Error");
            error!("{}", e);

            if matches!(e, ConfigError::Parse(_) | ConfigError::Validation(_)) {
                error!("");
                error!("💡 Quick fix:");
                error!("   1. Run: market-sim init --force");
                error!("   2. Re-apply your changes to {}", path);
            }

            std::process::exit(1);
        }
    }
}

fn init_config(path: &str, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if std::path::Path::new(path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", path);
        return Ok(());
    }

    let default_config = include_str!("../../config.toml.example");
    std::fs::write(path, default_config)?;
    info!("📝 Created {}", path);
    info!("💡 Next steps:");
    info!("   1. Edit {} to tune the market", path);
    info!("   2. Run: market-sim play");

    Ok(())
}
