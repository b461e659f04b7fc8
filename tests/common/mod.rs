//! Common test utilities - ArenaTest harness for end-to-end campaigns

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use arena::combat::{ActorProfile, Roller, Stats};
use arena::events::{CampaignEvent, EventLog};
use arena::progression::ProgressionCurve;
use arena::scheduler::TickRange;
use arena::{ArenaConfig, CampaignHandle, CampaignReport, Scheduler};

/// Test harness that runs a campaign with every event recorded
pub struct ArenaTest {
    pub log: Arc<EventLog>,
    pub handle: CampaignHandle,
}

impl ArenaTest {
    /// Start a campaign seeded from the config
    pub fn start(config: &ArenaConfig) -> Result<Self> {
        let log = EventLog::shared();
        let handle = Scheduler::configure(config, log.clone())?.start()?;
        Ok(Self { log, handle })
    }

    /// Start a campaign with a caller-supplied random source
    pub fn start_with(config: &ArenaConfig, roller: impl Roller + Send + 'static) -> Result<Self> {
        let log = EventLog::shared();
        let handle = Scheduler::with_roller(config, Box::new(roller), log.clone())?.start()?;
        Ok(Self { log, handle })
    }

    /// Wait for the campaign to end
    pub async fn finish(self) -> Result<(CampaignReport, Vec<CampaignEvent>)> {
        let report = self.handle.wait().await?;
        Ok((report, self.log.events()))
    }
}

/// A fast campaign between two named actors
pub fn config(match_cap: u32, seed: u64) -> ArenaConfig {
    ArenaConfig {
        actors: vec![
            ActorProfile::new("Fighter A", Stats::default()),
            ActorProfile::new("Fighter B", Stats::default()),
        ],
        tick: TickRange::new(5, 15),
        match_cap,
        progression: ProgressionCurve {
            base_health: 300.0,
            max_health_increment: 300.0,
            ..ProgressionCurve::default()
        },
        time_scale: 1.0,
        seed: Some(seed),
    }
}

/// Count events of one kind
pub fn count(events: &[CampaignEvent], predicate: impl Fn(&CampaignEvent) -> bool) -> usize {
    events.iter().filter(|e| predicate(e)).count()
}
