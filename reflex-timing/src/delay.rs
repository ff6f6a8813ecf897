use log::warn;
use rand::Rng;
use reflex_core::Millis;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cue delay drawn uniformly from `[min_ms, min_ms + spread_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayPolicy {
    pub min_ms: Millis,
    pub spread_ms: Millis,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            min_ms: 1000,
            spread_ms: 3000,
        }
    }
}

impl DelayPolicy {
    /// A policy that always yields `ms`.
    pub fn fixed(ms: Millis) -> Self {
        Self {
            min_ms: ms,
            spread_ms: 0,
        }
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(self.draw_ms(rng))
    }

    pub fn draw_ms<R: Rng + ?Sized>(&self, rng: &mut R) -> Millis {
        if self.spread_ms == 0 {
            return self.min_ms;
        }
        let u: f64 = rng.random();
        // u < 1, but the product can still round up to spread_ms
        let offset = ((u * self.spread_ms as f64) as Millis).min(self.spread_ms - 1);
        self.min_ms.saturating_add(offset)
    }
}

/// Draws a cue delay in [1000, 4000) ms.
pub fn draw_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    DelayPolicy::default().draw(rng)
}

/// Reaction time: elapsed ms between the cue and the reaction.
pub fn compute_score(cue_at: Millis, react_at: Millis) -> Millis {
    if react_at < cue_at {
        warn!("reaction at {react_at} precedes cue at {cue_at}; clamping score to 0");
    }
    react_at.saturating_sub(cue_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    struct ConstRng(u64);

    impl RngCore for ConstRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0
        }
        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(self.0 as u8);
        }
    }

    #[test]
    fn draws_stay_in_half_open_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut lo = Millis::MAX;
        let mut hi = 0;
        for _ in 0..20_000 {
            let ms = draw_delay(&mut rng).as_millis() as Millis;
            assert!((1000..4000).contains(&ms), "delay {ms} out of range");
            lo = lo.min(ms);
            hi = hi.max(ms);
        }
        // spread actually gets used
        assert!(lo < 1100 && hi > 3900, "lo {lo} hi {hi}");
    }

    #[test]
    fn extreme_uniform_values_hit_bounds() {
        assert_eq!(DelayPolicy::default().draw_ms(&mut ConstRng(0)), 1000);
        assert_eq!(DelayPolicy::default().draw_ms(&mut ConstRng(u64::MAX)), 3999);
    }

    #[test]
    fn consecutive_draws_are_independent() {
        let mut rng = StdRng::seed_from_u64(7);
        let draws: Vec<_> = (0..8).map(|_| draw_delay(&mut rng)).collect();
        assert!(draws.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn fixed_policy_ignores_rng() {
        let policy = DelayPolicy::fixed(2500);
        assert_eq!(policy.draw(&mut ConstRng(u64::MAX)), Duration::from_millis(2500));
    }

    #[test]
    fn huge_minimum_saturates() {
        let policy = DelayPolicy {
            min_ms: Millis::MAX - 1,
            spread_ms: 3000,
        };
        assert_eq!(policy.draw_ms(&mut ConstRng(u64::MAX)), Millis::MAX);
        assert_eq!(policy.draw_ms(&mut ConstRng(0)), Millis::MAX - 1);
    }

    #[test]
    fn score_is_reaction_minus_cue() {
        assert_eq!(compute_score(2500, 2700), 200);
        assert_eq!(compute_score(2500, 2500), 0);
        assert_eq!(compute_score(2700, 2500), 0);
    }
}
