//! arena - run a duel campaign

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use arena::events::{EventLog, FanoutSink, LogSink};
use arena::{ArenaConfig, Scheduler};
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn-based duel campaign simulator
#[derive(Parser, Debug)]
#[command(name = "arena", version, about = "Run a duel campaign")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of matches
    #[arg(short, long)]
    matches: Option<u32>,

    /// Seed for a reproducible campaign
    #[arg(long)]
    seed: Option<u64>,

    /// Game-speed multiplier applied to tick delays
    #[arg(long)]
    time_scale: Option<f64>,

    /// Print the report and every event as JSON when done
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "arena=info".into());
    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let mut config = ArenaConfig::load(args.config.as_deref())?;
    if let Some(matches) = args.matches {
        config.match_cap = matches;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(time_scale) = args.time_scale {
        config.time_scale = time_scale;
    }
    config.validate()?;

    let log = EventLog::shared();
    let sink = FanoutSink::new().with(Arc::new(LogSink)).with(log.clone());
    let handle = Scheduler::configure(&config, Arc::new(sink))?.start()?;

    let token = handle.stop_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping campaign");
            token.stop();
        }
    });

    let report = handle.wait().await?;

    if args.json {
        let output = json!({
            "report": report,
            "events": log.events(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for standing in &report.standings {
            info!("{}: {} wins", standing.name, standing.wins);
        }
        info!("draws: {}, turns: {}", report.draws, report.turns);
    }

    Ok(())
}
