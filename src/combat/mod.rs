//! Combat core
//!
//! Implements stat-driven dueling with:
//! - Actors, their stats and strategic rating
//! - Swappable random sources (seeded, scripted)
//! - Turn resolution: priority, critical, evasion and flat defense

mod actor;
mod dice;
mod resolve;

pub use actor::{
    Actor, ActorProfile, Duel, Side, Stats, Verdict, RATING_CEILING, STANDARD_DAMAGE,
};
pub use dice::{pick_varied, Roller, RngRoller, ScriptedRoller};
pub use resolve::{
    critical_roll, evasion_roll, mitigate, priority, resolve_turn, HitKind, TurnOutcome,
    MOVE_VARIANTS,
};
