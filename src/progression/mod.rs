//! Cross-match balancing
//!
//! Each match recomputes both actors from their base profiles:
//! - strike rate is pulled toward the pair's average as matches go on
//! - critical and evasion rates grow by the same amount for both actors
//! - max health grows linearly from a base value
//!
//! Damage and flat defense always come straight from the base profile.
//! Balanced rates are kept to two decimal places.

use serde::{Deserialize, Serialize};

use crate::combat::{ActorProfile, Duel, Side, Stats};

/// Tuning constants for the difficulty curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionCurve {
    /// Strike-rate convergence reached at the last match
    pub k_alpha: f64,
    /// Critical/evasion growth reached at the last match (fraction of 100)
    pub k_rand: f64,
    /// Max health in the first match
    pub base_health: f64,
    /// Extra max health added by the last match
    pub max_health_increment: f64,
}

impl Default for ProgressionCurve {
    fn default() -> Self {
        Self {
            k_alpha: 0.7,
            k_rand: 0.05,
            base_health: 1000.0,
            max_health_increment: 1000.0,
        }
    }
}

/// Factors derived from the match index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScaling {
    /// Weight of the average strike rate
    pub alpha: f64,
    /// Growth applied to critical and evasion rates, as a fraction of 100
    pub volatility: f64,
    /// Max health for both actors, rounded to a whole number
    pub max_health: f64,
}

impl MatchScaling {
    /// Scaling for match `match_index` (1-based) of `match_cap`
    ///
    /// A single-match campaign has no progress, so every factor is zero.
    pub fn for_match(match_index: u32, match_cap: u32, curve: &ProgressionCurve) -> Self {
        let progress = progress(match_index, match_cap);
        Self {
            alpha: curve.k_alpha * progress,
            volatility: curve.k_rand * progress,
            max_health: (curve.base_health + curve.max_health_increment * progress).round(),
        }
    }
}

/// How far through the campaign a match is, in `[0, 1]`
fn progress(match_index: u32, match_cap: u32) -> f64 {
    if match_cap <= 1 {
        return 0.0;
    }
    let done = match_index.clamp(1, match_cap) - 1;
    f64::from(done) / f64::from(match_cap - 1)
}

/// Stats for one actor, scaled against its opponent's base profile
pub fn balance_stats(own: &Stats, opponent: &Stats, scaling: &MatchScaling) -> Stats {
    let average_strike = (own.strike_rate + opponent.strike_rate) / 2.0;
    let growth = scaling.volatility * 100.0;
    let strike_rate = own.strike_rate * (1.0 - scaling.alpha) + average_strike * scaling.alpha;

    Stats {
        strike_rate: round_cents(strike_rate),
        critical_rate: round_cents(clamp_percent(own.critical_rate + growth)),
        evasion_rate: round_cents(clamp_percent(own.evasion_rate + growth)),
        basic_damage: own.basic_damage,
        critical_damage: own.critical_damage,
        flat_defense: own.flat_defense,
    }
}

fn clamp_percent(rate: f64) -> f64 {
    rate.clamp(0.0, 100.0)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stats and max health an actor enters a match with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balanced {
    pub stats: Stats,
    pub max_health: f64,
}

/// Balance one actor for a match
pub fn balance(
    match_index: u32,
    match_cap: u32,
    own: &Stats,
    opponent: &Stats,
    curve: &ProgressionCurve,
) -> Balanced {
    let scaling = MatchScaling::for_match(match_index, match_cap, curve);
    Balanced {
        stats: balance_stats(own, opponent, &scaling),
        max_health: scaling.max_health,
    }
}

/// Rebalance both actors for a match and refill their health
///
/// Must only run between matches.
pub fn prepare_match(
    duel: &mut Duel,
    profiles: &[ActorProfile; 2],
    match_index: u32,
    match_cap: u32,
    curve: &ProgressionCurve,
) {
    for side in [Side::A, Side::B] {
        let own = &profiles[side.index()].stats;
        let opponent = &profiles[side.other().index()].stats;
        let balanced = balance(match_index, match_cap, own, opponent, curve);
        duel.actor_mut(side).reset(balanced.stats, balanced.max_health);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lopsided() -> (Stats, Stats) {
        let strong = Stats {
            strike_rate: 120.0,
            critical_rate: 40.0,
            evasion_rate: 20.0,
            ..Stats::default()
        };
        let weak = Stats {
            strike_rate: 60.0,
            critical_rate: 10.0,
            evasion_rate: 5.0,
            basic_damage: 50.0,
            ..Stats::default()
        };
        (strong, weak)
    }

    #[test]
    fn test_first_match_is_base_profile() {
        let (strong, weak) = lopsided();
        let curve = ProgressionCurve::default();

        let balanced = balance(1, 100, &strong, &weak, &curve);
        assert_eq!(balanced.stats, strong);
        assert_eq!(balanced.max_health, 1000.0);

        let balanced = balance(1, 100, &weak, &strong, &curve);
        assert_eq!(balanced.stats, weak);
    }

    #[test]
    fn test_full_convergence_at_last_match() {
        let (strong, weak) = lopsided();
        let curve = ProgressionCurve {
            k_alpha: 1.0,
            ..ProgressionCurve::default()
        };

        let a = balance(100, 100, &strong, &weak, &curve);
        let b = balance(100, 100, &weak, &strong, &curve);
        assert_eq!(a.stats.strike_rate, 90.0);
        assert_eq!(b.stats.strike_rate, 90.0);
    }

    #[test]
    fn test_default_curve_at_last_match() {
        let (strong, weak) = lopsided();
        let curve = ProgressionCurve::default();

        let a = balance(100, 100, &strong, &weak, &curve);
        // 120 * 0.3 + 90 * 0.7
        assert_eq!(a.stats.strike_rate, 99.0);
        // +5 percentage points
        assert_eq!(a.stats.critical_rate, 45.0);
        assert_eq!(a.stats.evasion_rate, 25.0);
        assert_eq!(a.stats.basic_damage, strong.basic_damage);
        assert_eq!(a.stats.critical_damage, strong.critical_damage);
        assert_eq!(a.stats.flat_defense, strong.flat_defense);
        assert_eq!(a.max_health, 2000.0);
    }

    #[test]
    fn test_rates_rounded_to_two_decimals() {
        let (strong, weak) = lopsided();
        let curve = ProgressionCurve::default();

        // alpha = 0.7 * 49/99, growth = 5 * 49/99
        let a = balance(50, 100, &strong, &weak, &curve);
        assert_eq!(a.stats.strike_rate, 109.61);
        assert_eq!(a.stats.critical_rate, 42.47);
        assert_eq!(a.stats.evasion_rate, 22.47);
        assert_eq!(a.max_health, 1495.0);

        let b = balance(50, 100, &weak, &strong, &curve);
        assert_eq!(b.stats.strike_rate, 70.39);
        assert_eq!(b.stats.critical_rate, 12.47);
        assert_eq!(b.stats.evasion_rate, 7.47);
    }

    #[test]
    fn test_health_curve() {
        let curve = ProgressionCurve::default();
        assert_eq!(MatchScaling::for_match(1, 100, &curve).max_health, 1000.0);
        assert_eq!(MatchScaling::for_match(100, 100, &curve).max_health, 2000.0);
        // 1000 + 1000 * 49/99 = 1494.9...
        assert_eq!(MatchScaling::for_match(50, 100, &curve).max_health, 1495.0);
    }

    #[test]
    fn test_single_match_campaign_has_no_scaling() {
        let curve = ProgressionCurve::default();
        let scaling = MatchScaling::for_match(1, 1, &curve);
        assert_eq!(scaling.alpha, 0.0);
        assert_eq!(scaling.volatility, 0.0);
        assert_eq!(scaling.max_health, 1000.0);
    }

    #[test]
    fn test_rates_clamped_to_percent() {
        let (strong, weak) = lopsided();
        let curve = ProgressionCurve {
            k_rand: 2.0,
            ..ProgressionCurve::default()
        };

        let balanced = balance(100, 100, &strong, &weak, &curve);
        assert_eq!(balanced.stats.critical_rate, 100.0);
        assert_eq!(balanced.stats.evasion_rate, 100.0);
    }

    #[test]
    fn test_volatility_grows_monotonically() {
        let curve = ProgressionCurve::default();
        let mut last = -1.0;
        for t in 1..=100 {
            let scaling = MatchScaling::for_match(t, 100, &curve);
            assert!(scaling.volatility > last);
            last = scaling.volatility;
        }
    }

    #[test]
    fn test_prepare_match_uses_opponent_profile() {
        let (strong, weak) = lopsided();
        let profiles = [
            ActorProfile::new("strong", strong),
            ActorProfile::new("weak", weak),
        ];
        let mut duel = Duel::new(&profiles[0], &profiles[1], 1.0);
        duel.actor_mut(Side::A).take_damage(1.0);

        let curve = ProgressionCurve {
            k_alpha: 1.0,
            ..ProgressionCurve::default()
        };
        prepare_match(&mut duel, &profiles, 10, 10, &curve);

        for actor in duel.actors() {
            assert_eq!(actor.stats.strike_rate, 90.0);
            assert_eq!(actor.max_health(), 2000.0);
            assert_eq!(actor.health(), 2000.0);
        }
        assert_eq!(duel.actor(Side::B).stats.basic_damage, 50.0);
    }
}
