//! arena - turn-based duel campaign simulator
//!
//! Two actors fight a bounded series of matches. Each match rebalances their
//! stats along a progression curve, and a tokio task resolves turns at
//! randomized intervals until one side drops.

pub mod combat;
pub mod config;
pub mod events;
pub mod progression;
pub mod scheduler;

pub use config::{ArenaConfig, ConfigError};
pub use events::{CampaignEvent, EventSink};
pub use scheduler::{CampaignHandle, CampaignReport, Phase, Scheduler, SchedulerError, StopToken};
