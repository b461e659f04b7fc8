//! Campaign notifications
//!
//! The core reports what happened through an [`EventSink`]. Sinks are
//! observers only; nothing they do feeds back into the simulation.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combat::{Actor, HitKind, Stats, TurnOutcome, Verdict};

/// An actor as it enters a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub name: String,
    pub stats: Stats,
    pub max_health: f64,
    pub rating: u64,
}

impl From<&Actor> for ActorSnapshot {
    fn from(actor: &Actor) -> Self {
        Self {
            name: actor.name().to_string(),
            stats: actor.stats,
            max_health: actor.max_health(),
            rating: actor.rating(),
        }
    }
}

/// Something the campaign reports to its observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CampaignEvent {
    /// Both actors have been rebalanced for a new match
    MatchStarted {
        match_index: u32,
        actors: [ActorSnapshot; 2],
    },
    /// One turn was resolved
    Turn(TurnOutcome),
    /// A match ended
    MatchConcluded { match_index: u32, verdict: Verdict },
    /// The last match ended; no more events follow
    CampaignFinished { match_index: u32, verdict: Verdict },
    /// The campaign was stopped before finishing
    Stopped { match_index: u32 },
}

/// Receiver of campaign notifications
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CampaignEvent);
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &CampaignEvent) {}
}

/// Sink that writes every event to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &CampaignEvent) {
        match event {
            CampaignEvent::MatchStarted {
                match_index,
                actors,
            } => {
                info!("=== match #{} ===", match_index);
                for actor in actors {
                    info!(
                        "{} (health {:.0}): rating {}",
                        actor.name, actor.max_health, actor.rating
                    );
                }
            }
            CampaignEvent::Turn(turn) => match turn.kind {
                HitKind::Evaded => debug!(
                    "[#{}] {} ({}) attacks => {} evades (dmg {:.0}), health {:.0}",
                    turn.match_index,
                    turn.attacker,
                    turn.attacker_side,
                    turn.defender,
                    turn.raw_damage,
                    turn.defender_health
                ),
                kind => debug!(
                    "[#{}] {} ({}) {} (dmg {:.0}) => {} takes {:.0}, health {:.0}",
                    turn.match_index,
                    turn.attacker,
                    turn.attacker_side,
                    kind,
                    turn.raw_damage,
                    turn.defender,
                    turn.final_damage,
                    turn.defender_health
                ),
            },
            CampaignEvent::MatchConcluded {
                match_index,
                verdict,
            } => match verdict {
                Verdict::Winner { side, name } => {
                    info!("match #{} over, winner: {} ({})", match_index, name, side)
                }
                Verdict::Draw => info!("match #{} over, both eliminated", match_index),
            },
            CampaignEvent::CampaignFinished { match_index, .. } => {
                info!("campaign finished after {} matches", match_index)
            }
            CampaignEvent::Stopped { match_index } => {
                info!("campaign stopped during match #{}", match_index)
            }
        }
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<CampaignEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared instance
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<CampaignEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Count events matching a predicate
    pub fn count(&self, predicate: impl Fn(&CampaignEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &CampaignEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Sink that forwards to several others in order
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a downstream sink
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &CampaignEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Side;

    fn stopped(match_index: u32) -> CampaignEvent {
        CampaignEvent::Stopped { match_index }
    }

    #[test]
    fn test_event_log_records() {
        let log = EventLog::new();
        assert!(log.is_empty());

        log.emit(&stopped(3));
        log.emit(&stopped(4));
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[1], stopped(4));
        assert_eq!(
            log.count(|e| matches!(e, CampaignEvent::Stopped { match_index: 3 })),
            1
        );
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = EventLog::shared();
        let second = EventLog::shared();
        let fanout = FanoutSink::new()
            .with(first.clone())
            .with(Arc::new(NoopSink))
            .with(second.clone());

        fanout.emit(&stopped(1));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_log_sink_handles_every_event() {
        let turn = TurnOutcome {
            match_index: 1,
            attacker: "red".to_string(),
            attacker_side: Side::A,
            defender: "blue".to_string(),
            kind: HitKind::Evaded,
            raw_damage: 80.0,
            final_damage: 0.0,
            defender_health: 1000.0,
            move_variant: 2,
        };
        let events = [
            CampaignEvent::Turn(turn.clone()),
            CampaignEvent::Turn(TurnOutcome {
                kind: HitKind::Critical,
                final_damage: 130.0,
                defender_health: 870.0,
                ..turn
            }),
            CampaignEvent::MatchConcluded {
                match_index: 1,
                verdict: Verdict::Winner {
                    side: Side::A,
                    name: "red".to_string(),
                },
            },
            CampaignEvent::MatchConcluded {
                match_index: 2,
                verdict: Verdict::Draw,
            },
            stopped(3),
        ];
        for event in &events {
            LogSink.emit(event);
        }
    }

    #[test]
    fn test_event_json_shape() {
        let event = CampaignEvent::MatchConcluded {
            match_index: 2,
            verdict: Verdict::Winner {
                side: Side::B,
                name: "blue".to_string(),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "match_concluded");
        assert_eq!(json["match_index"], 2);
        assert_eq!(json["verdict"]["result"], "winner");
        assert_eq!(json["verdict"]["side"], "b");
        assert_eq!(json["verdict"]["name"], "blue");

        let draw = serde_json::to_value(CampaignEvent::CampaignFinished {
            match_index: 5,
            verdict: Verdict::Draw,
        })
        .unwrap();
        assert_eq!(draw["verdict"]["result"], "draw");
    }
}
