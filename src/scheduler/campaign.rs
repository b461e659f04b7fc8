//! Campaign state machine
//!
//! Tracks which match is being fought and moves between phases:
//! `Idle -> Running -> MatchConcluding -> Running | Finished`, with
//! `Stopped` reachable from any active phase. Nothing here waits; the
//! async driver decides when each step happens.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::combat::{resolve_turn, ActorProfile, Duel, Roller, TurnOutcome, Verdict};
use crate::config::{ArenaConfig, ConfigError};
use crate::events::{ActorSnapshot, CampaignEvent, EventSink};
use crate::progression::{prepare_match, ProgressionCurve};

/// Lifecycle of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Configured, no match yet
    Idle,
    /// A match is in progress
    Running,
    /// A match just ended and the next step is pending
    MatchConcluding,
    /// Every match has been fought
    Finished,
    /// Stopped on request
    Stopped,
}

impl Phase {
    /// Whether no further turns can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::Stopped)
    }
}

/// Campaign lifecycle errors
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("campaign already started")]
    AlreadyStarted,

    #[error("no match in progress (phase {0:?})")]
    NotRunning(Phase),

    #[error("no concluded match to advance from (phase {0:?})")]
    NotConcluding(Phase),
}

/// Wins for one actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub wins: u32,
}

/// Summary of a campaign so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub phase: Phase,
    /// Index of the current or last match
    pub match_index: u32,
    /// Matches that reached a verdict
    pub matches_played: u32,
    pub standings: [Standing; 2],
    pub draws: u32,
    pub turns: u64,
    pub last_verdict: Option<Verdict>,
}

impl CampaignReport {
    /// Whether the campaign was cut short
    pub fn stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }
}

/// A bounded sequence of matches between two actors
#[derive(Debug, Clone)]
pub struct Campaign {
    duel: Duel,
    profiles: [ActorProfile; 2],
    curve: ProgressionCurve,
    match_cap: u32,
    match_index: u32,
    phase: Phase,
    wins: [u32; 2],
    draws: u32,
    turns: u64,
    last_verdict: Option<Verdict>,
}

impl Campaign {
    /// Create an idle campaign
    pub fn new(
        profiles: [ActorProfile; 2],
        match_cap: u32,
        curve: ProgressionCurve,
    ) -> Result<Self, ConfigError> {
        if match_cap < 1 {
            return Err(ConfigError::MatchCap);
        }
        let duel = Duel::new(&profiles[0], &profiles[1], curve.base_health);
        Ok(Self {
            duel,
            profiles,
            curve,
            match_cap,
            match_index: 0,
            phase: Phase::Idle,
            wins: [0; 2],
            draws: 0,
            turns: 0,
            last_verdict: None,
        })
    }

    /// Create an idle campaign from validated configuration
    pub fn from_config(config: &ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.profiles()?, config.match_cap, config.progression)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current match, 0 before the campaign starts
    pub fn match_index(&self) -> u32 {
        self.match_index
    }

    pub fn match_cap(&self) -> u32 {
        self.match_cap
    }

    pub fn duel(&self) -> &Duel {
        &self.duel
    }

    /// Balance the first match and begin it
    pub fn start(&mut self, sink: &dyn EventSink) -> Result<(), CampaignError> {
        if self.phase != Phase::Idle || self.match_index != 0 {
            return Err(CampaignError::AlreadyStarted);
        }
        self.begin_match(1, sink);
        Ok(())
    }

    fn begin_match(&mut self, match_index: u32, sink: &dyn EventSink) {
        prepare_match(
            &mut self.duel,
            &self.profiles,
            match_index,
            self.match_cap,
            &self.curve,
        );
        self.match_index = match_index;
        self.set_phase(Phase::Running);

        let [a, b] = self.duel.actors();
        sink.emit(&CampaignEvent::MatchStarted {
            match_index,
            actors: [ActorSnapshot::from(a), ActorSnapshot::from(b)],
        });
    }

    /// Resolve one turn of the running match
    ///
    /// A turn that leaves either actor at zero health concludes the match.
    pub fn tick<R: Roller + ?Sized>(
        &mut self,
        roller: &mut R,
        sink: &dyn EventSink,
    ) -> Result<TurnOutcome, CampaignError> {
        if self.phase != Phase::Running {
            return Err(CampaignError::NotRunning(self.phase));
        }

        let outcome = resolve_turn(&mut self.duel, roller, self.match_index);
        self.turns += 1;
        sink.emit(&CampaignEvent::Turn(outcome.clone()));

        if let Some(verdict) = self.duel.verdict() {
            match &verdict {
                Verdict::Winner { side, .. } => self.wins[side.index()] += 1,
                Verdict::Draw => self.draws += 1,
            }
            self.last_verdict = Some(verdict.clone());
            self.set_phase(Phase::MatchConcluding);
            sink.emit(&CampaignEvent::MatchConcluded {
                match_index: self.match_index,
                verdict,
            });
        }

        Ok(outcome)
    }

    /// Move past a concluded match: start the next one or finish
    pub fn advance(&mut self, sink: &dyn EventSink) -> Result<Phase, CampaignError> {
        if self.phase != Phase::MatchConcluding {
            return Err(CampaignError::NotConcluding(self.phase));
        }

        if self.match_index < self.match_cap {
            self.begin_match(self.match_index + 1, sink);
        } else {
            self.set_phase(Phase::Finished);
            sink.emit(&CampaignEvent::CampaignFinished {
                match_index: self.match_index,
                verdict: self.last_verdict.clone().unwrap_or(Verdict::Draw),
            });
        }
        Ok(self.phase)
    }

    /// Stop an active campaign, leaving actor stats untouched
    ///
    /// Returns false (and reports nothing) when there is nothing to stop.
    pub fn stop(&mut self, sink: &dyn EventSink) -> bool {
        match self.phase {
            Phase::Running | Phase::MatchConcluding => {
                self.set_phase(Phase::Stopped);
                sink.emit(&CampaignEvent::Stopped {
                    match_index: self.match_index,
                });
                true
            }
            Phase::Idle | Phase::Finished | Phase::Stopped => false,
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!(
            "campaign phase {:?} -> {:?} (match {})",
            self.phase, phase, self.match_index
        );
        self.phase = phase;
    }

    /// Summary of everything so far
    pub fn report(&self) -> CampaignReport {
        let standing = |i: usize| Standing {
            name: self.profiles[i].name.clone(),
            wins: self.wins[i],
        };
        CampaignReport {
            phase: self.phase,
            match_index: self.match_index,
            matches_played: self.wins.iter().sum::<u32>() + self.draws,
            standings: [standing(0), standing(1)],
            draws: self.draws,
            turns: self.turns,
            last_verdict: self.last_verdict.clone(),
        }
    }
}
