//! Random draws for combat
//!
//! Every roll the resolver and scheduler make goes through the [`Roller`]
//! trait so a deterministic source can stand in for the real one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws
pub trait Roller {
    /// Uniform draw in `[0, upper)`
    fn below(&mut self, upper: f64) -> f64;

    /// Uniform draw in `[0, 100)`
    fn percent(&mut self) -> f64 {
        self.below(100.0)
    }

    /// Uniform index in `0..len` (0 when `len` is 0)
    fn index(&mut self, len: usize) -> usize;

    /// Uniform milliseconds in `min..=max`
    fn between_ms(&mut self, min: u64, max: u64) -> u64;
}

/// Roller backed by a `rand` generator
#[derive(Debug, Clone)]
pub struct RngRoller<R> {
    rng: R,
}

impl<R: Rng> RngRoller<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngRoller<StdRng> {
    /// Reproducible roller from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Roller seeded from the operating system
    pub fn from_os() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> Roller for RngRoller<R> {
    fn below(&mut self, upper: f64) -> f64 {
        if upper <= 0.0 || !upper.is_finite() {
            return 0.0;
        }
        self.rng.random_range(0.0..upper)
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn between_ms(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }
}

/// Roller that replays a fixed cycle of raw draws
///
/// `below` and `percent` return the next scripted value as-is, wrapping back
/// to the start when the script runs out. Index draws always return 0 and
/// interval draws the range minimum.
#[derive(Debug, Clone)]
pub struct ScriptedRoller {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRoller {
    /// Create a roller replaying `draws` in order
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            cursor: 0,
        }
    }

    fn next_draw(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}

impl Roller for ScriptedRoller {
    fn below(&mut self, _upper: f64) -> f64 {
        self.next_draw()
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }

    fn between_ms(&mut self, min: u64, _max: u64) -> u64 {
        min
    }
}

/// Pick an index in `0..len` that differs from `previous` when possible
///
/// A repeat of the previous pick advances to the next index, wrapping to 0.
pub fn pick_varied<R: Roller + ?Sized>(roller: &mut R, len: usize, previous: Option<usize>) -> usize {
    if len == 0 {
        return 0;
    }
    let pick = roller.index(len) % len;
    if Some(pick) == previous {
        (pick + 1) % len
    } else {
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_bounds() {
        let mut roller = RngRoller::seeded(7);
        for _ in 0..1000 {
            let draw = roller.below(170.0);
            assert!((0.0..170.0).contains(&draw), "draw {} out of range", draw);
        }
    }

    #[test]
    fn test_percent_bounds() {
        let mut roller = RngRoller::seeded(11);
        for _ in 0..1000 {
            let draw = roller.percent();
            assert!((0.0..100.0).contains(&draw));
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut roller = RngRoller::seeded(1);
        assert_eq!(roller.below(0.0), 0.0);
        assert_eq!(roller.below(-5.0), 0.0);
        assert_eq!(roller.index(0), 0);
        assert_eq!(roller.between_ms(300, 300), 300);
        assert_eq!(roller.between_ms(500, 200), 500);
    }

    #[test]
    fn test_between_ms_inclusive() {
        let mut roller = RngRoller::seeded(3);
        for _ in 0..500 {
            let ms = roller.between_ms(500, 1000);
            assert!((500..=1000).contains(&ms));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RngRoller::seeded(42);
        let mut b = RngRoller::seeded(42);
        for _ in 0..50 {
            assert_eq!(a.percent(), b.percent());
        }
    }

    #[test]
    fn test_scripted_cycles() {
        let mut roller = ScriptedRoller::new([0.0, 50.0, 99.0]);
        assert_eq!(roller.below(170.0), 0.0);
        assert_eq!(roller.percent(), 50.0);
        assert_eq!(roller.percent(), 99.0);
        assert_eq!(roller.percent(), 0.0);
        assert_eq!(roller.between_ms(250, 900), 250);
        assert_eq!(roller.index(5), 0);
    }

    #[test]
    fn test_scripted_empty() {
        let mut roller = ScriptedRoller::new([]);
        assert_eq!(roller.percent(), 0.0);
    }

    #[test]
    fn test_pick_varied_avoids_repeat() {
        let mut roller = ScriptedRoller::new([]);
        // Scripted index is always 0
        assert_eq!(pick_varied(&mut roller, 5, None), 0);
        assert_eq!(pick_varied(&mut roller, 5, Some(0)), 1);
        assert_eq!(pick_varied(&mut roller, 5, Some(3)), 0);
        assert_eq!(pick_varied(&mut roller, 0, Some(0)), 0);
    }

    #[test]
    fn test_pick_varied_wraps() {
        struct Last;
        impl Roller for Last {
            fn below(&mut self, _upper: f64) -> f64 {
                0.0
            }
            fn index(&mut self, len: usize) -> usize {
                len - 1
            }
            fn between_ms(&mut self, min: u64, _max: u64) -> u64 {
                min
            }
        }

        assert_eq!(pick_varied(&mut Last, 5, Some(4)), 0);
        assert_eq!(pick_varied(&mut Last, 5, Some(2)), 4);
        // A single option has nothing to vary to
        assert_eq!(pick_varied(&mut Last, 1, Some(0)), 0);
    }

    #[test]
    fn test_pick_varied_never_repeats() {
        let mut roller = RngRoller::seeded(99);
        let mut previous = None;
        for _ in 0..200 {
            let pick = pick_varied(&mut roller, 5, previous);
            assert!(pick < 5);
            assert_ne!(Some(pick), previous);
            previous = Some(pick);
        }
    }
}
