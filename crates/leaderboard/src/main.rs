mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{ParseArgs, ScheduleArgs};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "leaderboard")]
#[command(about = "Score parsing and leaderboard calculation for fitness competitions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one entered score and print the stored value
    Parse(ParseArgs),
    /// Rank every event of a competition file
    Event {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Overall standings, per division, for a competition file
    Standings { file: PathBuf },
    /// Judge lane coverage and rotation conflicts for a rotations file
    Coverage {
        file: PathBuf,

        /// Lanes per heat when the file lists no heats
        #[arg(long)]
        lanes: Option<u32>,
    },
    /// Print heat start times
    Schedule(ScheduleArgs),
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("leaderboard={},scoring={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env()?;
    config.pretty |= cli.pretty;

    match cli.command {
        Commands::Parse(args) => commands::parse(&args, &config)?,
        Commands::Event { file, validate_only } => commands::event(&file, validate_only, &config)?,
        Commands::Standings { file } => commands::standings(&file, &config)?,
        Commands::Coverage { file, lanes } => {
            if let Some(lanes) = lanes {
                config.default_lane_count = lanes;
            }
            commands::coverage(&file, &config)?
        }
        Commands::Schedule(args) => commands::schedule(&args, &config)?,
    }

    Ok(())
}
