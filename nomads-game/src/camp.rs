//! Overnight camping: rest gains, ranger knocks and night scenes.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::CampStyle;
use crate::constants::{PAID_CAMP_COST_CENTS, RANGER_FINE_CENTS, RANGER_FINE_MORALE};
use crate::environment::EnvironmentSnapshot;
use crate::numbers::{i64_to_f64, round_f64_to_i64, u32_to_f32};
use crate::pet::Pet;
use crate::vehicle::VehicleSpec;

/// Where the rig slept last and for how many nights in a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CampState {
    pub last_location: Option<String>,
    pub nights_here: u32,
}

impl CampState {
    /// Record a night at `location_id` and return the streak including it.
    pub fn record_night(&mut self, location_id: &str) -> u32 {
        if self.last_location.as_deref() == Some(location_id) {
            self.nights_here = self.nights_here.saturating_add(1);
        } else {
            self.last_location = Some(location_id.to_string());
            self.nights_here = 1;
        }
        self.nights_here
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CampProfile {
    pub energy: f32,
    pub morale: f32,
    pub pet_energy: f32,
    pub pet_bond: f32,
    pub ranger_chance: f32,
    pub cost_cents: i64,
}

impl CampProfile {
    #[must_use]
    pub fn for_style(
        style: CampStyle,
        vehicle: &VehicleSpec,
        has_tent: bool,
        env: &EnvironmentSnapshot,
        pet: Option<&Pet>,
        prior_nights: u32,
    ) -> Self {
        // Rangers notice rigs that overstay.
        let overstay = u32_to_f32(prior_nights) * 0.02;
        match style {
            CampStyle::Paid => Self {
                energy: 20.0,
                morale: 10.0,
                pet_energy: 18.0,
                pet_bond: 2.0,
                ranger_chance: 0.01,
                cost_cents: PAID_CAMP_COST_CENTS,
            },
            CampStyle::Stealth => {
                let mut ranger = 0.08 + u32_to_f32(3_u32.saturating_sub(u32::from(vehicle.stealth_tier))) * 0.03;
                if pet.is_some_and(Pet::draws_attention) {
                    ranger += 0.04;
                }
                Self {
                    energy: 15.0,
                    morale: 6.0,
                    pet_energy: 14.0,
                    pet_bond: 2.0,
                    ranger_chance: ranger + overstay,
                    cost_cents: 0,
                }
            }
            CampStyle::Dispersed => {
                let tier_bonus = u32_to_f32(u32::from(vehicle.dispersed_tier.saturating_sub(1)));
                let tent = if has_tent { 1.0 } else { 0.0 };
                let ranger = if env.facilities.park { 0.04 } else { 0.005 };
                Self {
                    energy: 23.0 + 4.0 * tent,
                    morale: 12.0 + 3.0 * tent + tier_bonus,
                    pet_energy: 20.0 + 3.0 * tent,
                    pet_bond: 3.0,
                    ranger_chance: ranger + overstay,
                    cost_cents: 0,
                }
            }
        }
    }
}

/// What happens when a flashlight sweeps the curtains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangerVisit {
    PermitChecked,
    Reminder,
    Fine { cents: i64, morale: f32 },
}

impl RangerVisit {
    #[must_use]
    pub const fn for_style(style: CampStyle) -> Self {
        match style {
            CampStyle::Paid => Self::PermitChecked,
            CampStyle::Dispersed => Self::Reminder,
            CampStyle::Stealth => Self::Fine {
                cents: RANGER_FINE_CENTS,
                morale: RANGER_FINE_MORALE,
            },
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::PermitChecked => "camp.ranger.permit",
            Self::Reminder => "camp.ranger.reminder",
            Self::Fine { .. } => "camp.ranger.fine",
        }
    }
}

/// Print-sale value of a night-sky scene, scaled by the job's epic bonus.
pub fn epic_scene_payout_cents<R: Rng>(rng: &mut R, epic_bonus: f32) -> i64 {
    let dollars = rng.gen_range(30_i64..=80);
    round_f64_to_i64(i64_to_f64(dollars * 100) * (1.0 + f64::from(epic_bonus)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{VehicleCatalog, VehicleKind};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn spec(kind: VehicleKind) -> VehicleSpec {
        VehicleCatalog::embedded().get(kind).unwrap().clone()
    }

    #[test]
    fn stealthy_rigs_draw_fewer_rangers() {
        let env = EnvironmentSnapshot::new("moab");
        let prius = CampProfile::for_style(CampStyle::Stealth, &spec(VehicleKind::Prius), false, &env, None, 0);
        let bus = CampProfile::for_style(CampStyle::Stealth, &spec(VehicleKind::Skoolie), false, &env, None, 0);
        assert!(prius.ranger_chance < bus.ranger_chance);
    }

    #[test]
    fn tent_improves_dispersed_rest() {
        let env = EnvironmentSnapshot::backcountry("swell");
        let van = spec(VehicleKind::Van);
        let bare = CampProfile::for_style(CampStyle::Dispersed, &van, false, &env, None, 0);
        let tent = CampProfile::for_style(CampStyle::Dispersed, &van, true, &env, None, 0);
        assert!((tent.energy - bare.energy - 4.0).abs() < f32::EPSILON);
        assert!((bare.morale - 13.0).abs() < f32::EPSILON);
    }

    #[test]
    fn overstaying_raises_ranger_odds() {
        let env = EnvironmentSnapshot::backcountry("swell");
        let van = spec(VehicleKind::Van);
        let first = CampProfile::for_style(CampStyle::Dispersed, &van, false, &env, None, 0);
        let fourth = CampProfile::for_style(CampStyle::Dispersed, &van, false, &env, None, 3);
        assert!(fourth.ranger_chance > first.ranger_chance);
    }

    #[test]
    fn night_streaks_reset_on_move() {
        let mut camp = CampState::default();
        assert_eq!(camp.record_night("moab"), 1);
        assert_eq!(camp.record_night("moab"), 2);
        assert_eq!(camp.record_night("zion"), 1);
    }

    #[test]
    fn only_stealth_is_fined() {
        assert!(matches!(
            RangerVisit::for_style(CampStyle::Stealth),
            RangerVisit::Fine { cents: 2_500, .. }
        ));
        assert_eq!(RangerVisit::for_style(CampStyle::Paid).key(), "camp.ranger.permit");
    }

    #[test]
    fn epic_payout_scales_with_bonus() {
        let mut rng = SmallRng::seed_from_u64(5);
        let base = epic_scene_payout_cents(&mut rng, 0.0);
        assert!((3_000..=8_000).contains(&base));
        let mut rng = SmallRng::seed_from_u64(5);
        let boosted = epic_scene_payout_cents(&mut rng, 0.25);
        assert_eq!(boosted, round_f64_to_i64(i64_to_f64(base) * 1.25));
    }
}
