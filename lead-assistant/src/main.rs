mod chart;
mod chat;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lead_flow::AssistantConfig;
use tracing::info;

use crate::chart::ChartKind;

#[derive(Debug, Parser)]
#[command(
    name = "lead-assistant",
    version,
    about = "Digital broker for the industrial lots site, in your terminal"
)]
struct Cli {
    /// YAML config file; falls back to $LEAD_FLOW_CONFIG, then the built-in script
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chat with the assistant (default)
    Chat {
        /// Use the short, fixed reply delays
        #[arg(long)]
        reduced_motion: bool,

        /// Seed reply selection and delay jitter
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the rentability simulation for one horizon
    Chart {
        /// Projection horizon in years: 5, 10 or 15
        #[arg(long, default_value_t = 10)]
        horizon: u32,

        #[arg(long, value_enum, default_value_t = ChartKind::Line)]
        kind: ChartKind,

        /// Animation progress between 0 and 1
        #[arg(long, default_value_t = 1.0)]
        progress: f64,

        /// Derive progress from time since the chart appeared instead
        #[arg(long, conflicts_with = "progress")]
        elapsed_ms: Option<u64>,

        /// Emit a standalone SVG document (line and pie charts)
        #[arg(long)]
        svg: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let cli = Cli::parse();
    let mut config =
        AssistantConfig::discover(cli.config.as_deref()).context("failed to load assistant config")?;

    match cli.command.unwrap_or(Command::Chat {
        reduced_motion: false,
        seed: None,
    }) {
        Command::Chat {
            reduced_motion,
            seed,
        } => {
            if reduced_motion {
                config.timing.reduced_motion = true;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            info!(persona = %config.persona, "starting chat");
            chat::run(config).await
        }
        Command::Chart {
            horizon,
            kind,
            progress,
            elapsed_ms,
            svg,
        } => {
            let progress = match elapsed_ms {
                Some(ms) => lead_flow::chart::animation_progress(ms, config.timing.reduced_motion),
                None => progress,
            };
            chart::run(&config, horizon, kind, progress, svg)
        }
        Command::Config => {
            print!("{}", config.to_yaml().context("failed to render config")?);
            Ok(())
        }
    }
}
