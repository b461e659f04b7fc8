//! Combatants
//!
//! - Stat blocks and the strategic rating
//! - Health tracking with clamped damage
//! - The fixed two-sided duel pairing

use serde::{Deserialize, Serialize};

/// Rating reported when an actor cannot take damage at all
pub const RATING_CEILING: u64 = u64::MAX;

/// Raw hit size used to measure defensive efficiency
pub const STANDARD_DAMAGE: f64 = 100.0;

/// Which corner of the duel an actor stands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The opposing side
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Position of this side in a two-element array
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Offense and defense stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Weight for winning turn priority
    pub strike_rate: f64,
    /// Chance of a critical hit, in percent
    pub critical_rate: f64,
    /// Damage of a basic hit
    pub basic_damage: f64,
    /// Damage of a critical hit
    pub critical_damage: f64,
    /// Chance of evading a hit entirely, in percent
    pub evasion_rate: f64,
    /// Damage subtracted from every hit that lands
    pub flat_defense: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strike_rate: 85.0,
            critical_rate: 30.0,
            basic_damage: 80.0,
            critical_damage: 170.0,
            evasion_rate: 50.0,
            flat_defense: 40.0,
        }
    }
}

impl Stats {
    /// Expected raw damage of one attack
    pub fn average_damage(&self) -> f64 {
        let p_crit = self.critical_rate / 100.0;
        self.critical_damage * p_crit + self.basic_damage * (1.0 - p_crit)
    }

    /// Fraction of a `standard_damage` hit this stat block expects to take
    pub fn damage_taken_rate(&self, standard_damage: f64) -> f64 {
        if standard_damage <= 0.0 {
            return 0.0;
        }
        let hit_probability = 1.0 - self.evasion_rate / 100.0;
        let retained = (standard_damage - self.flat_defense).max(0.0) / standard_damage;
        hit_probability * retained
    }

    /// Strategic rating: strike rate times average damage over damage taken
    ///
    /// Returns [`RATING_CEILING`] when no damage gets through.
    pub fn rating(&self, standard_damage: f64) -> u64 {
        let taken = self.damage_taken_rate(standard_damage);
        if taken <= 0.0 {
            return RATING_CEILING;
        }
        (self.strike_rate * self.average_damage() / taken).round() as u64
    }

    /// Names and values of every stat, for validation and display
    pub fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("strike_rate", self.strike_rate),
            ("critical_rate", self.critical_rate),
            ("basic_damage", self.basic_damage),
            ("critical_damage", self.critical_damage),
            ("evasion_rate", self.evasion_rate),
            ("flat_defense", self.flat_defense),
        ]
    }
}

/// A base profile: who an actor is and the stats every match scales from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub name: String,
    #[serde(default)]
    pub stats: Stats,
}

impl ActorProfile {
    pub fn new(name: impl Into<String>, stats: Stats) -> Self {
        Self {
            name: name.into(),
            stats,
        }
    }
}

/// A combatant in the current match
#[derive(Debug, Clone)]
pub struct Actor {
    name: String,
    side: Side,
    /// Stats for the current match
    pub stats: Stats,
    max_health: f64,
    health: f64,
    last_move: Option<usize>,
}

impl Actor {
    /// Create an actor at full health
    pub fn new(name: impl Into<String>, side: Side, stats: Stats, max_health: f64) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            name: name.into(),
            side,
            stats,
            max_health,
            health: max_health,
            last_move: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The side this actor fights for the whole campaign
    pub fn opponent(&self) -> Side {
        self.side.other()
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    /// Check if actor still has health left
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Take damage, returning the health actually lost
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        if !self.is_alive() {
            return 0.0;
        }
        let lost = amount.max(0.0).min(self.health);
        self.health = (self.health - lost).max(0.0);
        lost
    }

    /// Install new stats and max health and refill health
    pub fn reset(&mut self, stats: Stats, max_health: f64) {
        self.stats = stats;
        self.max_health = max_health.max(0.0);
        self.health = self.max_health;
    }

    /// Rating against the standard hit size
    pub fn rating(&self) -> u64 {
        self.stats.rating(STANDARD_DAMAGE)
    }

    pub(crate) fn last_move(&self) -> Option<usize> {
        self.last_move
    }

    pub(crate) fn set_last_move(&mut self, id: usize) {
        self.last_move = Some(id);
    }
}

/// Who is left standing after a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Verdict {
    Winner { side: Side, name: String },
    Draw,
}

/// The two actors of a campaign, each the other's opponent
#[derive(Debug, Clone)]
pub struct Duel {
    actors: [Actor; 2],
}

impl Duel {
    /// Pair two profiles; the first takes side A, the second side B
    pub fn new(a: &ActorProfile, b: &ActorProfile, max_health: f64) -> Self {
        Self {
            actors: [
                Actor::new(&a.name, Side::A, a.stats, max_health),
                Actor::new(&b.name, Side::B, b.stats, max_health),
            ],
        }
    }

    pub fn actor(&self, side: Side) -> &Actor {
        &self.actors[side.index()]
    }

    pub fn actor_mut(&mut self, side: Side) -> &mut Actor {
        &mut self.actors[side.index()]
    }

    pub fn actors(&self) -> &[Actor; 2] {
        &self.actors
    }

    /// Borrow an actor and its opponent together
    pub fn pair_mut(&mut self, side: Side) -> (&mut Actor, &mut Actor) {
        let [a, b] = &mut self.actors;
        match side {
            Side::A => (a, b),
            Side::B => (b, a),
        }
    }

    /// Whether both actors are still standing
    pub fn both_alive(&self) -> bool {
        self.actors.iter().all(Actor::is_alive)
    }

    /// Decide the match from current health
    ///
    /// Returns `None` while both actors are alive.
    pub fn verdict(&self) -> Option<Verdict> {
        match (self.actors[0].is_alive(), self.actors[1].is_alive()) {
            (true, true) => None,
            (true, false) => Some(self.winner(Side::A)),
            (false, true) => Some(self.winner(Side::B)),
            (false, false) => Some(Verdict::Draw),
        }
    }

    fn winner(&self, side: Side) -> Verdict {
        Verdict::Winner {
            side,
            name: self.actor(side).name().to_string(),
        }
    }
}
