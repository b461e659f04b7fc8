//! arena_curve - preview the progression curve
//!
//! Prints both actors' balanced stats for every match of a campaign.

use std::path::PathBuf;

use anyhow::Result;
use arena::combat::{Actor, Side, STANDARD_DAMAGE};
use arena::progression::balance;
use arena::ArenaConfig;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Progression curve preview
#[derive(Parser, Debug)]
#[command(
    name = "arena_curve",
    version,
    about = "Print balanced stats for every match of a campaign"
)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only print every Nth match (the last match is always printed)
    #[arg(short, long, default_value_t = 1)]
    step: u32,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ArenaConfig::load(args.config.as_deref())?;
    let profiles = config.profiles()?;
    let step = args.step.max(1);

    println!(
        "{:>5}  {:<16} {:>8} {:>7} {:>7} {:>8} {:>10}",
        "match", "actor", "strike", "crit%", "eva%", "health", "rating"
    );

    for match_index in 1..=config.match_cap {
        if (match_index - 1) % step != 0 && match_index != config.match_cap {
            continue;
        }
        for side in [Side::A, Side::B] {
            let own = &profiles[side.index()];
            let opponent = &profiles[side.other().index()];
            let balanced = balance(
                match_index,
                config.match_cap,
                &own.stats,
                &opponent.stats,
                &config.progression,
            );
            let actor = Actor::new(&own.name, side, balanced.stats, balanced.max_health);
            println!(
                "{:>5}  {:<16} {:>8.2} {:>7.2} {:>7.2} {:>8.0} {:>10}",
                match_index,
                actor.name(),
                actor.stats.strike_rate,
                actor.stats.critical_rate,
                actor.stats.evasion_rate,
                actor.max_health(),
                actor.stats.rating(STANDARD_DAMAGE)
            );
        }
    }

    Ok(())
}
