//! Travel companion.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    PET_ENERGY_DRAIN_PER_HOUR, PET_START_ALERTNESS, PET_START_BOND, PET_START_ENERGY, STAT_CEILING,
    STAT_FLOOR,
};
use crate::numbers::u32_to_f32;

pub const PET_NAMES: [&str; 7] = ["Oreo", "Mesa", "Juniper", "Pixel", "Bowie", "Zion", "Havasu"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    pub bond: f32,
    pub energy: f32,
    pub alertness: f32,
    #[serde(default)]
    pub guard_mode: bool,
}

impl Pet {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bond: PET_START_BOND,
            energy: PET_START_ENERGY,
            alertness: PET_START_ALERTNESS,
            guard_mode: false,
        }
    }

    /// A stray with a random name from the shelter list.
    pub fn adopt<R: Rng>(rng: &mut R) -> Self {
        let idx = rng.gen_range(0..PET_NAMES.len());
        Self::new(PET_NAMES[idx])
    }

    pub fn tick(&mut self, minutes: u32) {
        let drain = u32_to_f32(minutes) / 60.0 * PET_ENERGY_DRAIN_PER_HOUR;
        self.energy = clamp(self.energy - drain);
    }

    pub fn adjust_bond(&mut self, delta: f32) {
        self.bond = clamp(self.bond + delta);
    }

    pub fn adjust_energy(&mut self, delta: f32) {
        self.energy = clamp(self.energy + delta);
    }

    pub fn set_guard(&mut self, on: bool) {
        self.guard_mode = on;
        let delta = if on { 10.0 } else { -10.0 };
        self.alertness = clamp(self.alertness + delta);
    }

    /// An alert dog barks at passing flashlights.
    #[must_use]
    pub fn draws_attention(&self) -> bool {
        self.alertness > 60.0
    }
}

fn clamp(value: f32) -> f32 {
    value.clamp(STAT_FLOOR, STAT_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn energy_drains_two_per_hour() {
        let mut pet = Pet::new("Oreo");
        pet.tick(120);
        assert!((pet.energy - 66.0).abs() < f32::EPSILON);
        pet.tick(10_000);
        assert!(pet.energy.abs() < f32::EPSILON);
    }

    #[test]
    fn guard_mode_raises_alertness() {
        let mut pet = Pet::new("Mesa");
        assert!(!pet.draws_attention());
        pet.set_guard(true);
        pet.set_guard(true);
        assert!(pet.draws_attention());
        pet.set_guard(false);
        assert!(!pet.guard_mode);
    }

    #[test]
    fn adoption_picks_from_shelter_list() {
        let mut rng = StepRng::new(0, 0);
        let pet = Pet::adopt(&mut rng);
        assert!(PET_NAMES.contains(&pet.name.as_str()));
        assert!((pet.bond - PET_START_BOND).abs() < f32::EPSILON);
    }
}
