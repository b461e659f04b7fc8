//! Turn scheduling
//!
//! Drives a [`Campaign`] on a tokio task:
//! - waits a randomized delay before every turn
//! - moves straight on to the next match when one concludes
//! - stops on request, dropping the pending wait so no late turn fires

mod campaign;

pub use campaign::{Campaign, CampaignError, CampaignReport, Phase, Standing};

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::combat::{Roller, RngRoller};
use crate::config::{ArenaConfig, ConfigError};
use crate::events::EventSink;

/// Inclusive range of delays between turns, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl TickRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Reject empty or inverted ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ms == 0 {
            return Err(ConfigError::EmptyTickRange);
        }
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvertedTickRange {
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }

    /// Range for a game running at `speed` times normal pace
    ///
    /// A non-empty range stays non-empty, however fast the game runs.
    pub fn scaled(&self, speed: f64) -> Self {
        if !speed.is_finite() || speed <= 0.0 {
            return *self;
        }
        let scale = |ms: u64| (ms as f64 / speed).round() as u64;
        let max_ms = if self.max_ms > 0 {
            scale(self.max_ms).max(1)
        } else {
            0
        };
        Self {
            min_ms: scale(self.min_ms),
            max_ms,
        }
    }

    /// Draw the delay before the next turn
    pub fn draw<R: Roller + ?Sized>(&self, roller: &mut R) -> Duration {
        Duration::from_millis(roller.between_ms(self.min_ms, self.max_ms))
    }
}

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("campaign error: {0}")]
    Campaign(#[from] CampaignError),

    #[error("campaign task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("no tokio runtime to run the campaign on: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// A configured campaign waiting to be started
pub struct Scheduler {
    campaign: Campaign,
    roller: Box<dyn Roller + Send>,
    sink: Arc<dyn EventSink>,
    ticks: TickRange,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("phase", &self.campaign.phase())
            .field("match_cap", &self.campaign.match_cap())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Scheduler {
    /// Configure a campaign, seeding randomness from the config when set
    pub fn configure(config: &ArenaConfig, sink: Arc<dyn EventSink>) -> Result<Self, ConfigError> {
        let roller: Box<dyn Roller + Send> = match config.seed {
            Some(seed) => Box::new(RngRoller::seeded(seed)),
            None => Box::new(RngRoller::from_os()),
        };
        Self::with_roller(config, roller, sink)
    }

    /// Configure a campaign with a caller-supplied random source
    pub fn with_roller(
        config: &ArenaConfig,
        roller: Box<dyn Roller + Send>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        let campaign = Campaign::from_config(config)?;
        let ticks = config.effective_tick();
        ticks.validate()?;
        Ok(Self {
            campaign,
            roller,
            sink,
            ticks,
        })
    }

    pub fn phase(&self) -> Phase {
        self.campaign.phase()
    }

    /// Start the first match and spawn the turn loop on the current tokio runtime
    pub fn start(mut self) -> Result<CampaignHandle, SchedulerError> {
        let runtime = tokio::runtime::Handle::try_current()?;
        let id = Uuid::new_v4();
        let span = info_span!("campaign", id = %id);

        span.in_scope(|| {
            info!(
                "starting campaign of {} matches, ticks {}..={}ms",
                self.campaign.match_cap(),
                self.ticks.min_ms,
                self.ticks.max_ms
            );
            self.campaign.start(self.sink.as_ref())
        })?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let (phase_tx, phase_rx) = watch::channel(self.campaign.phase());
        let task = runtime.spawn(self.run(stop_rx, phase_tx).instrument(span));

        Ok(CampaignHandle {
            id,
            stop: StopToken {
                tx: Arc::new(stop_tx),
            },
            phase: phase_rx,
            task,
        })
    }

    async fn run(
        mut self,
        mut stop_rx: watch::Receiver<bool>,
        phase_tx: watch::Sender<Phase>,
    ) -> CampaignReport {
        loop {
            match self.campaign.phase() {
                Phase::Running => {
                    let delay = self.ticks.draw(self.roller.as_mut());
                    tokio::select! {
                        biased;
                        _ = stop_requested(&mut stop_rx) => {
                            self.campaign.stop(self.sink.as_ref());
                        }
                        _ = tokio::time::sleep(delay) => {
                            if let Err(e) = self.campaign.tick(self.roller.as_mut(), self.sink.as_ref()) {
                                warn!("turn rejected: {}", e);
                                break;
                            }
                        }
                    }
                }
                Phase::MatchConcluding => {
                    if *stop_rx.borrow() {
                        self.campaign.stop(self.sink.as_ref());
                    } else if let Err(e) = self.campaign.advance(self.sink.as_ref()) {
                        warn!("failed to advance campaign: {}", e);
                        break;
                    }
                }
                Phase::Idle | Phase::Finished | Phase::Stopped => break,
            }
            phase_tx.send_replace(self.campaign.phase());
        }

        let report = self.campaign.report();
        info!(
            "campaign ended in phase {:?} after {} matches, {} turns",
            report.phase, report.matches_played, report.turns
        );
        report
    }
}

/// Resolves once a stop is requested or every stop token is gone
async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stop| *stop).await;
}

/// Cloneable stop request for a running campaign
#[derive(Debug, Clone)]
pub struct StopToken {
    tx: Arc<watch::Sender<bool>>,
}

impl StopToken {
    /// Request a stop; returns false if one was already requested
    pub fn stop(&self) -> bool {
        self.tx.send_if_modified(|stop| {
            if *stop {
                false
            } else {
                *stop = true;
                true
            }
        })
    }
}

/// Handle to a campaign running on a tokio task
///
/// Dropping the handle along with every [`StopToken`] stops the campaign.
#[derive(Debug)]
pub struct CampaignHandle {
    id: Uuid,
    stop: StopToken,
    phase: watch::Receiver<Phase>,
    task: JoinHandle<CampaignReport>,
}

impl CampaignHandle {
    /// Id attached to the campaign's log span
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Phase as of the last completed step
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Stop the campaign; repeated calls do nothing
    pub fn stop(&self) -> bool {
        self.stop.stop()
    }

    /// Token for stopping the campaign from elsewhere
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Wait until the campaign reaches `phase` or ends
    pub async fn wait_for_phase(&mut self, phase: Phase) -> Phase {
        let reached = self
            .phase
            .wait_for(|current| *current == phase || current.is_terminal())
            .await
            .map(|current| *current);
        reached.unwrap_or_else(|_| *self.phase.borrow())
    }

    /// Wait for the campaign to end and collect its report
    pub async fn wait(self) -> Result<CampaignReport, SchedulerError> {
        Ok(self.task.await?)
    }
}
