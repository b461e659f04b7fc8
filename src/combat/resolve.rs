//! Turn resolution
//!
//! One turn is three independent draws:
//! - priority, weighted by strike rate
//! - critical roll against the attacker's critical rate
//! - evasion roll against the defender's evasion rate
//!
//! A landed hit loses the defender's flat defense and never goes below zero.

use serde::{Deserialize, Serialize};

use super::actor::{Duel, Side};
use super::dice::{pick_varied, Roller};

/// Number of distinct attack variants a presentation layer can play
pub const MOVE_VARIANTS: usize = 5;

/// How an attack landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    /// Defender dodged; no damage
    Evaded,
    /// Basic damage, less flat defense
    Basic,
    /// Critical damage, less flat defense
    Critical,
}

impl std::fmt::Display for HitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HitKind::Evaded => "evaded",
            HitKind::Basic => "basic hit",
            HitKind::Critical => "critical hit",
        };
        write!(f, "{}", s)
    }
}

/// Result of a single turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Match the turn belongs to
    pub match_index: u32,
    pub attacker: String,
    pub attacker_side: Side,
    pub defender: String,
    /// Attack category
    pub kind: HitKind,
    /// Damage before evasion and flat defense
    pub raw_damage: f64,
    /// Damage after evasion and flat defense
    pub final_damage: f64,
    /// Defender health after the turn
    pub defender_health: f64,
    /// Attack variant for presentation, never the attacker's previous one
    pub move_variant: usize,
}

/// Critical or basic, by comparing a `[0, 100)` draw with the critical rate
pub fn critical_roll(draw: f64, critical_rate: f64) -> bool {
    draw < critical_rate
}

/// Evaded or not, by comparing a `[0, 100)` draw with the evasion rate
pub fn evasion_roll(draw: f64, evasion_rate: f64) -> bool {
    draw < evasion_rate
}

/// Damage left after flat defense, never negative
pub fn mitigate(raw_damage: f64, flat_defense: f64) -> f64 {
    (raw_damage - flat_defense).max(0.0)
}

/// Who attacks this turn, drawn in proportion to strike rate
pub fn priority<R: Roller + ?Sized>(duel: &Duel, roller: &mut R) -> Side {
    let a = duel.actor(Side::A).stats.strike_rate;
    let b = duel.actor(Side::B).stats.strike_rate;
    if roller.below(a + b) < a {
        Side::A
    } else {
        Side::B
    }
}

/// Resolve one turn, mutating the defender's health
pub fn resolve_turn<R: Roller + ?Sized>(duel: &mut Duel, roller: &mut R, match_index: u32) -> TurnOutcome {
    let attacker_side = priority(duel, roller);
    let (attacker, defender) = duel.pair_mut(attacker_side);

    let move_variant = pick_varied(roller, MOVE_VARIANTS, attacker.last_move());
    attacker.set_last_move(move_variant);

    let critical = critical_roll(roller.percent(), attacker.stats.critical_rate);
    let raw_damage = if critical {
        attacker.stats.critical_damage
    } else {
        attacker.stats.basic_damage
    };

    let (kind, final_damage) = if evasion_roll(roller.percent(), defender.stats.evasion_rate) {
        (HitKind::Evaded, 0.0)
    } else {
        let kind = if critical { HitKind::Critical } else { HitKind::Basic };
        (kind, mitigate(raw_damage, defender.stats.flat_defense))
    };

    if final_damage > 0.0 {
        defender.take_damage(final_damage);
    }

    TurnOutcome {
        match_index,
        attacker: attacker.name().to_string(),
        attacker_side,
        defender: defender.name().to_string(),
        kind,
        raw_damage,
        final_damage,
        defender_health: defender.health(),
        move_variant,
    }
}
