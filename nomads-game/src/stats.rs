//! Character stat block with clamped mutation primitives.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    START_COMFORT, START_CONFIDENCE, START_CREATIVITY, START_ENERGY, START_HEALTH, START_MORALE,
    STAT_CEILING, STAT_FLOOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Morale,
    Energy,
    Health,
    Confidence,
    Creativity,
    Comfort,
}

impl Stat {
    pub const ALL: [Self; 6] = [
        Self::Morale,
        Self::Energy,
        Self::Health,
        Self::Confidence,
        Self::Creativity,
        Self::Comfort,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morale => "morale",
            Self::Energy => "energy",
            Self::Health => "health",
            Self::Confidence => "confidence",
            Self::Creativity => "creativity",
            Self::Comfort => "comfort",
        }
    }

    /// Inclusive bounds every value of this stat is clamped to.
    #[must_use]
    pub const fn bounds(self) -> (f32, f32) {
        (STAT_FLOOR, STAT_CEILING)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stat| stat.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub morale: f32,
    pub energy: f32,
    pub health: f32,
    pub confidence: f32,
    pub creativity: f32,
    pub comfort: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            morale: START_MORALE,
            energy: START_ENERGY,
            health: START_HEALTH,
            confidence: START_CONFIDENCE,
            creativity: START_CREATIVITY,
            comfort: START_COMFORT,
        }
    }
}

impl StatBlock {
    #[must_use]
    pub const fn get(&self, stat: Stat) -> f32 {
        match stat {
            Stat::Morale => self.morale,
            Stat::Energy => self.energy,
            Stat::Health => self.health,
            Stat::Confidence => self.confidence,
            Stat::Creativity => self.creativity,
            Stat::Comfort => self.comfort,
        }
    }

    const fn slot(&mut self, stat: Stat) -> &mut f32 {
        match stat {
            Stat::Morale => &mut self.morale,
            Stat::Energy => &mut self.energy,
            Stat::Health => &mut self.health,
            Stat::Confidence => &mut self.confidence,
            Stat::Creativity => &mut self.creativity,
            Stat::Comfort => &mut self.comfort,
        }
    }

    /// Apply `delta` to `stat`, clamping into the stat's bounds, and return
    /// the post-adjustment value. Non-finite deltas are ignored.
    pub fn adjust(&mut self, stat: Stat, delta: f32) -> f32 {
        let (lo, hi) = stat.bounds();
        let slot = self.slot(stat);
        if delta.is_finite() {
            *slot = (*slot + delta).clamp(lo, hi);
        }
        *slot
    }

    /// Set `stat` outright, clamped into bounds.
    pub fn set(&mut self, stat: Stat, value: f32) -> f32 {
        let (lo, hi) = stat.bounds();
        let slot = self.slot(stat);
        if value.is_finite() {
            *slot = value.clamp(lo, hi);
        }
        *slot
    }

    #[must_use]
    pub fn is_at_floor(&self, stat: Stat) -> bool {
        self.get(stat) <= stat.bounds().0
    }

    #[must_use]
    pub fn is_at_ceiling(&self, stat: Stat) -> bool {
        self.get(stat) >= stat.bounds().1
    }

    /// Re-clamp every stat; used after deserializing foreign snapshots.
    pub fn clamp(&mut self) {
        for stat in Stat::ALL {
            let value = self.get(stat);
            self.set(stat, if value.is_finite() { value } else { 0.0 });
        }
    }
}

/// Net change recorded for one stat while resolving an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    pub stat: Stat,
    pub before: f32,
    pub after: f32,
}

impl StatDelta {
    #[must_use]
    pub fn change(&self) -> f32 {
        self.after - self.before
    }
}

/// Compare two stat blocks and list the stats that moved.
#[must_use]
pub fn diff(before: &StatBlock, after: &StatBlock) -> Vec<StatDelta> {
    Stat::ALL
        .into_iter()
        .filter_map(|stat| {
            let (b, a) = (before.get(stat), after.get(stat));
            ((a - b).abs() > f32::EPSILON).then_some(StatDelta {
                stat,
                before: b,
                after: a,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_clamps_and_returns_post_value() {
        let mut stats = StatBlock::default();
        assert!((stats.adjust(Stat::Morale, 500.0) - 100.0).abs() < f32::EPSILON);
        assert!(stats.is_at_ceiling(Stat::Morale));
        assert!((stats.adjust(Stat::Energy, -1_000.0)).abs() < f32::EPSILON);
        assert!(stats.is_at_floor(Stat::Energy));
    }

    #[test]
    fn non_finite_deltas_are_ignored() {
        let mut stats = StatBlock::default();
        let before = stats.health;
        stats.adjust(Stat::Health, f32::NAN);
        stats.adjust(Stat::Health, f32::INFINITY);
        assert!((stats.health - before).abs() < f32::EPSILON);
    }

    #[test]
    fn every_stat_stays_bounded_under_random_walk() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::SmallRng::seed_from_u64(0x5EED);
        let mut stats = StatBlock::default();
        for _ in 0..2_000 {
            let stat = Stat::ALL[rng.gen_range(0..Stat::ALL.len())];
            let value = stats.adjust(stat, rng.gen_range(-250.0..250.0));
            assert!((0.0..=100.0).contains(&value), "{stat} escaped: {value}");
        }
    }

    #[test]
    fn diff_lists_only_moved_stats() {
        let before = StatBlock::default();
        let mut after = before.clone();
        after.adjust(Stat::Comfort, 5.0);
        let deltas = diff(&before, &after);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].stat, Stat::Comfort);
        assert!((deltas[0].change() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn stat_parses_case_insensitively() {
        assert_eq!("Creativity".parse::<Stat>(), Ok(Stat::Creativity));
        assert!("luck".parse::<Stat>().is_err());
    }

    #[test]
    fn clamp_repairs_out_of_range_snapshot() {
        let mut stats = StatBlock {
            morale: 140.0,
            energy: -3.0,
            health: f32::NAN,
            ..StatBlock::default()
        };
        stats.clamp();
        assert!((stats.morale - 100.0).abs() < f32::EPSILON);
        assert!(stats.energy.abs() < f32::EPSILON);
        assert!(stats.health.abs() < f32::EPSILON);
    }
}
