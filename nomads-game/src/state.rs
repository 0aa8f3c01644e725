//! Complete game state and the passive effects of elapsed time.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::camp::CampState;
use crate::clock::{Clock, turns_for};
use crate::constants::{
    BUTANE_CAP_CANS, COLD_COMFORT_PER_TURN, DIESEL_CAN_CAP_GAL, ENERGY_PER_TURN,
    EXTRA_FUEL_CAP_GAL, HEATER_COMFORT_PER_TURN, HEATER_DIESEL_GAL_PER_HOUR,
    HUNGER_GRACE_MINUTES, HUNGER_HEALTH_PER_TURN, PARTS_CAP, PROPANE_CAP_LB, START_CASH_CENTS,
    START_FUEL_FRACTION, START_MEALS, START_WATER_GAL, THIRST_HEALTH_PER_TURN, TURN_MINUTES,
    WATER_PER_TURN_GAL,
};
use crate::electrical::{ElectricalSystem, PowerTransition, TurnConditions};
use crate::environment::{EnvironmentSnapshot, HeatBand};
use crate::error::CatalogError;
use crate::inventory::{Device, Inventory};
use crate::jobs::{Job, JobKind, JobTable};
use crate::numbers::u32_to_f32;
use crate::pet::Pet;
use crate::quests::Progress;
use crate::resources::{Consumable, ResourceLedger, max_range_miles};
use crate::rng::RngStreams;
use crate::stats::{Stat, StatBlock};
use crate::vehicle::{Drivetrain, Vehicle, VehicleCatalog, VehicleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Active,
    /// Health hit its floor. Terminal.
    GameOver,
}

/// Character creation choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    pub player_name: String,
    pub vehicle: VehicleKind,
    pub color: String,
    pub job: JobKind,
    /// Overrides the vehicle's default drivetrain.
    pub drivetrain: Option<Drivetrain>,
    pub seed: u64,
    pub start_cash_cents: i64,
}

impl Default for NewGame {
    fn default() -> Self {
        Self {
            player_name: "Traveler".to_string(),
            vehicle: VehicleKind::Van,
            color: "white".to_string(),
            job: JobKind::Photographer,
            drivetrain: None,
            seed: 0,
            start_cash_cents: START_CASH_CENTS,
        }
    }
}

/// Whether the character sleeps through the elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rest {
    Awake,
    Asleep,
}

/// Side effects of elapsed time worth reporting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassiveReport {
    pub turns: u32,
    pub transitions: SmallVec<[PowerTransition; 2]>,
    pub heater_ran_dry: bool,
    pub thirsty: bool,
    pub hungry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player_name: String,
    #[serde(default)]
    pub phase: GamePhase,
    pub clock: Clock,
    pub stats: StatBlock,
    pub job: Job,
    pub vehicle: Vehicle,
    pub inventory: Inventory,
    pub power: ElectricalSystem,
    pub progress: Progress,
    #[serde(default)]
    pub pet: Option<Pet>,
    pub cash_cents: i64,
    pub last_meal_minute: u32,
    #[serde(default)]
    pub camp: CampState,
    pub rng: RngStreams,
    /// Actions resolved so far, rejected ones excluded.
    #[serde(default)]
    pub actions_taken: u64,
}

impl GameState {
    /// Start a journey from the embedded catalogs.
    ///
    /// # Errors
    ///
    /// Propagates [`GameState::from_catalogs`] failures.
    pub fn new(cfg: &NewGame) -> Result<Self, CatalogError> {
        Self::from_catalogs(cfg, VehicleCatalog::embedded(), JobTable::embedded())
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::MissingEntry`] when the chosen vehicle or job
    /// is absent from the supplied catalogs.
    pub fn from_catalogs(
        cfg: &NewGame,
        vehicles: &VehicleCatalog,
        jobs: &JobTable,
    ) -> Result<Self, CatalogError> {
        let spec = vehicles
            .get(cfg.vehicle)
            .cloned()
            .ok_or(CatalogError::MissingEntry(cfg.vehicle.as_str()))?;
        let job = jobs
            .get(cfg.job)
            .cloned()
            .ok_or(CatalogError::MissingEntry(cfg.job.as_str()))?;

        let mut vehicle = Vehicle::new(spec, cfg.color.clone());
        if let Some(drivetrain) = cfg.drivetrain {
            vehicle.drivetrain = drivetrain;
        }
        let spec = &vehicle.spec;
        let fuel = match vehicle.drivetrain {
            Drivetrain::Fuel => spec.tank_gal * START_FUEL_FRACTION,
            Drivetrain::Electric => 0.0,
        };
        let supplies = ResourceLedger::new()
            .with_stock(
                Consumable::Meals,
                START_MEALS.min(spec.base_meals),
                spec.base_meals,
            )
            .with_stock(
                Consumable::Water,
                START_WATER_GAL.min(spec.base_water_gal),
                spec.base_water_gal,
            )
            .with_stock(Consumable::Fuel, fuel, spec.tank_gal)
            .with_stock(Consumable::Propane, 0.0, PROPANE_CAP_LB)
            .with_stock(Consumable::Butane, 0.0, BUTANE_CAP_CANS)
            .with_stock(Consumable::Diesel, 0.0, DIESEL_CAN_CAP_GAL)
            .with_stock(Consumable::ExtraFuel, 0.0, EXTRA_FUEL_CAP_GAL)
            .with_stock(Consumable::Parts, 0.0, PARTS_CAP);
        let power = ElectricalSystem::for_vehicle(spec);
        let clock = Clock::default();

        Ok(Self {
            player_name: cfg.player_name.clone(),
            phase: GamePhase::Active,
            clock,
            stats: StatBlock::default(),
            progress: Progress::new(job.quest.clone()),
            job,
            vehicle,
            inventory: Inventory {
                supplies,
                ..Inventory::default()
            },
            power,
            pet: None,
            cash_cents: cfg.start_cash_cents,
            last_meal_minute: clock.minutes,
            camp: CampState::default(),
            rng: RngStreams::from_user_seed(cfg.seed),
            actions_taken: 0,
        })
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver)
    }

    #[must_use]
    pub const fn supplies(&self) -> &ResourceLedger {
        &self.inventory.supplies
    }

    /// Switched on and actually powered.
    #[must_use]
    pub fn is_running(&self, device: Device) -> bool {
        self.inventory.devices.is_on(device) && self.power.is_online()
    }

    /// Signal from the location itself or from a running dish.
    #[must_use]
    pub fn has_signal(&self, env: &EnvironmentSnapshot) -> bool {
        env.has_signal || self.is_running(Device::Starlink)
    }

    /// Furthest the rig can go on the tank plus jerry cans, or the pack.
    #[must_use]
    pub fn max_range_miles(&self) -> f32 {
        match self.vehicle.drivetrain {
            Drivetrain::Fuel => max_range_miles(
                self.supplies().quantity(Consumable::Fuel)
                    + self.supplies().quantity(Consumable::ExtraFuel),
                self.vehicle.spec.mpg,
            ),
            Drivetrain::Electric => self.power.ev_range_now(),
        }
    }

    /// Re-clamp values that a hand-edited snapshot could have pushed out of range.
    pub fn normalize(&mut self) {
        self.stats.clamp();
        self.inventory.supplies.normalize();
        self.power.normalize();
        if self.stats.is_at_floor(Stat::Health) {
            self.phase = GamePhase::GameOver;
        }
    }

    /// Apply the passive effects of `minutes` of elapsed time, one turn at a time.
    pub fn pass_time(
        &mut self,
        minutes: u32,
        env: &EnvironmentSnapshot,
        rest: Rest,
    ) -> PassiveReport {
        let mut report = PassiveReport::default();
        for _ in 0..turns_for(minutes) {
            self.pass_turn(env, rest, &mut report);
            report.turns += 1;
        }
        report
    }

    fn pass_turn(&mut self, env: &EnvironmentSnapshot, rest: Rest, report: &mut PassiveReport) {
        let conditions = TurnConditions {
            minute_of_day: self.clock.minute_of_day(),
            site: env.solar_site,
            weather: env.weather,
            device_amps: self.inventory.devices.switched_load_amps(),
            job_amps: self.job.perks.power_drain_amps,
            electric_drive: self.vehicle.drivetrain == Drivetrain::Electric,
        };
        let tick = self.power.tick(&conditions, self.clock.minutes);
        if let Some(transition) = tick.transition {
            report.transitions.push(transition);
        }

        let heater_running = self.is_running(Device::Heater);
        if heater_running {
            let burn = HEATER_DIESEL_GAL_PER_HOUR * u32_to_f32(TURN_MINUTES) / 60.0;
            if self.inventory.supplies.drain(Consumable::Diesel, burn) > 0.0 {
                self.inventory.devices.switch_off(Device::Heater);
                report.heater_ran_dry = true;
            }
        }

        self.clock.advance_turn();

        if self
            .inventory
            .supplies
            .drain(Consumable::Water, WATER_PER_TURN_GAL)
            > 0.0
        {
            self.stats.adjust(Stat::Health, -THIRST_HEALTH_PER_TURN);
            report.thirsty = true;
        }
        if rest == Rest::Awake {
            self.stats.adjust(Stat::Energy, -ENERGY_PER_TURN);
        }
        if self.clock.minutes.saturating_sub(self.last_meal_minute) > HUNGER_GRACE_MINUTES {
            self.stats.adjust(Stat::Health, -HUNGER_HEALTH_PER_TURN);
            report.hungry = true;
        }
        if env.weather.heat == HeatBand::Cold {
            let comfort = if heater_running {
                HEATER_COMFORT_PER_TURN
            } else {
                -COLD_COMFORT_PER_TURN
            };
            self.stats.adjust(Stat::Comfort, comfort);
        }
        if let Some(pet) = self.pet.as_mut() {
            pet.tick(TURN_MINUTES);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::electrical::PowerState;

    fn van() -> GameState {
        GameState::new(&NewGame::default()).unwrap()
    }

    #[test]
    fn new_game_uses_vehicle_catalog() {
        let state = van();
        assert_eq!(state.vehicle.kind(), VehicleKind::Van);
        assert_eq!(state.clock.to_string(), "Day 1 08:00");
        let fuel = state.supplies().stock(Consumable::Fuel);
        assert!((fuel.capacity - 24.0).abs() < f32::EPSILON);
        assert!((fuel.quantity - 14.4).abs() < 0.01);
        assert!((state.supplies().quantity(Consumable::Meals) - 6.0).abs() < f32::EPSILON);
        assert!((state.power.house_pct() - 62.0).abs() < 0.01);
        assert_eq!(state.progress.level, 1);
    }

    #[test]
    fn electric_sedan_starts_with_empty_tank() {
        let state = GameState::new(&NewGame {
            vehicle: VehicleKind::Sedan,
            ..NewGame::default()
        })
        .unwrap();
        assert_eq!(state.vehicle.drivetrain, Drivetrain::Electric);
        assert!(state.supplies().quantity(Consumable::Fuel).abs() < f32::EPSILON);
        assert!((state.max_range_miles() - 240.0).abs() < 0.01);
    }

    #[test]
    fn passive_turns_drain_water_and_energy() {
        let mut state = van();
        let env = EnvironmentSnapshot::new("moab");
        let report = state.pass_time(60, &env, Rest::Awake);
        assert_eq!(report.turns, 4);
        assert_eq!(state.clock.minutes, 9 * 60);
        assert!((state.stats.energy - (80.0 - 4.0 * ENERGY_PER_TURN)).abs() < 0.001);
        assert!((state.supplies().quantity(Consumable::Water) - (5.0 - 4.0 * WATER_PER_TURN_GAL)).abs() < 0.001);

        let before = state.stats.energy;
        state.pass_time(60, &env, Rest::Asleep);
        assert!((state.stats.energy - before).abs() < f32::EPSILON);
    }

    #[test]
    fn heater_shuts_itself_off_when_diesel_runs_out() {
        let mut state = van();
        state.inventory.devices.install(Device::Heater).unwrap();
        state.inventory.supplies.refill(Consumable::Diesel, 0.05).unwrap();
        state.inventory.devices.set_switch(Device::Heater, true).unwrap();
        let env = EnvironmentSnapshot::new("bryce");
        let report = state.pass_time(120, &env, Rest::Awake);
        assert!(report.heater_ran_dry);
        assert!(!state.inventory.devices.is_on(Device::Heater));
        assert!(state.supplies().quantity(Consumable::Diesel).abs() < f32::EPSILON);
    }

    #[test]
    fn starlink_signal_needs_power() {
        let mut state = van();
        let env = EnvironmentSnapshot::backcountry("swell");
        assert!(!state.has_signal(&env));
        state.inventory.devices.install(Device::Starlink).unwrap();
        state.inventory.devices.set_switch(Device::Starlink, true).unwrap();
        assert!(state.has_signal(&env));
        state.power.state = PowerState::Offline;
        assert!(!state.has_signal(&env));
    }

    #[test]
    fn missing_catalog_entry_is_reported() {
        let err = GameState::from_catalogs(
            &NewGame::default(),
            &VehicleCatalog::default(),
            JobTable::embedded(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MissingEntry("van")));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let state = van();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
