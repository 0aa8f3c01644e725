//! Centralized balance and tuning constants for the Nomads simulation.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Clock --------------------------------------------------------------------
pub const TURN_MINUTES: u32 = 15;
pub const DAY_MINUTES: u32 = 24 * 60;
pub const START_MINUTE: u32 = 8 * 60;
pub const DAYLIGHT_START: u32 = 6 * 60;
pub const DAYLIGHT_END: u32 = 20 * 60;
pub const SUN_RISE: u32 = 6 * 60;
pub const SUN_SET: u32 = 20 * 60;

// Stats --------------------------------------------------------------------
pub const STAT_FLOOR: f32 = 0.0;
pub const STAT_CEILING: f32 = 100.0;
pub const START_MORALE: f32 = 60.0;
pub const START_ENERGY: f32 = 80.0;
pub const START_HEALTH: f32 = 100.0;
pub const START_CONFIDENCE: f32 = 50.0;
pub const START_CREATIVITY: f32 = 40.0;
pub const START_COMFORT: f32 = 50.0;
pub const CONFIDENCE_PER_LEVEL: f32 = 5.0;
pub const CONFIDENCE_MORALE_FLOOR_PENALTY: f32 = 2.0;
pub const XP_PER_LEVEL: u32 = 100;

// Passive drains per turn --------------------------------------------------
pub const WATER_PER_TURN_GAL: f32 = 0.008;
pub const ENERGY_PER_TURN: f32 = 0.8;
pub const HUNGER_GRACE_MINUTES: u32 = 24 * 60;
pub const HUNGER_HEALTH_PER_TURN: f32 = 0.5;
pub const THIRST_HEALTH_PER_TURN: f32 = 0.75;
pub const COLD_COMFORT_PER_TURN: f32 = 0.5;
pub const HEATER_COMFORT_PER_TURN: f32 = 0.5;

// Electrical ---------------------------------------------------------------
pub const SYSTEM_VOLTAGE: f32 = 12.0;
pub const BASE_DRAW_AMPS: f32 = 0.8;
pub const FRIDGE_AMPS: f32 = 4.0;
pub const STARLINK_AMPS: f32 = 6.0;
pub const HEATER_AMPS: f32 = 1.2;
pub const INVERTER_COOK_AMPS: f32 = 40.0;
pub const HOUSE_BATTERY_BASE_AH: f32 = 100.0;
pub const START_HOUSE_PCT: f32 = 62.0;
pub const START_EV_PCT: f32 = 80.0;
pub const POWER_RESTORE_PCT: f32 = 5.0;
pub const HEATER_DIESEL_GAL_PER_HOUR: f32 = 0.15;
pub const SOLAR_PANEL_WATTS: u32 = 200;
pub const WIND_TURBINE_WATTS: u32 = 300;
pub const EV_SOLAR_TRICKLE_PCT_PER_KW: f32 = 1.0;
pub const EV_WIND_TRICKLE_PCT_PER_300W: f32 = 0.25;
pub const EV_STATION_CHARGE_PCT: f32 = 40.0;
pub const EV_STATION_COST_CENTS: i64 = 2_000;
pub const EV_STATION_MINUTES: u32 = 60;
pub const EV_RANGE_MAX_MILES: f32 = 360.0;
pub const TRICKLE_CHARGE_MINUTES: u32 = 120;
pub const SOLAR_CHARGE_PCT_PER_KW: f32 = 8.0;
pub const WIND_CHARGE_PCT_PER_300W: f32 = 2.0;

// Actions ------------------------------------------------------------------
pub const HIKE_BASE_ENERGY: f32 = 10.0;
pub const HIKE_MINUTES: u32 = 120;
pub const HIKE_WATER_GAL: f32 = 0.06;
pub const HIKE_DISCOVERY_BASE: f32 = 0.08;
pub const HIKE_DISCOVERY_MORALE: f32 = 4.0;
pub const HIKE_XP: u32 = 10;
pub const TRAIL_MIN_HEALTH: f32 = 15.0;
pub const WORK_DEFAULT_HOURS: u32 = 2;
pub const WORK_MAX_HOURS: u32 = 6;
pub const WORK_ENERGY_PER_HOUR: f32 = 2.5;
pub const WORK_MIN_ENERGY: f32 = 5.0;
pub const WORK_XP_PER_HOUR: u32 = 5;
pub const NAP_MINUTES: u32 = 120;
pub const NAP_ENERGY: f32 = 12.0;
pub const COOK_WATER_GAL: f32 = 0.13;
pub const COOK_PROPANE_LB: f32 = 0.2;
pub const COOK_BUTANE_CANS: f32 = 0.25;
pub const COOK_STOVE_MORALE: f32 = 9.0;
pub const COOK_INVERTER_MORALE: f32 = 6.0;
pub const COOK_ENERGY: f32 = 6.0;
pub const COOK_COLD_MORALE: f32 = 3.0;
pub const MEAL_MINUTES: u32 = 15;
pub const PET_CARE_MINUTES: u32 = 15;
pub const PET_PLAY_MINUTES: u32 = 30;
pub const EAT_ENERGY: f32 = 4.0;
pub const EAT_HEALTH: f32 = 3.0;
pub const FRIDGE_MEAL_COMFORT: f32 = 2.0;
pub const READ_MINUTES: u32 = 60;
pub const READ_CREATIVITY: f32 = 4.0;
pub const READ_COMFORT: f32 = 2.0;
pub const WATCH_MINUTES: u32 = 90;
pub const WATCH_MORALE: f32 = 5.0;
pub const WATCH_ENERGY: f32 = 2.0;
pub const QUEST_ACTION_MINUTES: u32 = 60;
pub const QUEST_ACTION_ENERGY: f32 = 6.0;
pub const QUEST_ACTION_XP: u32 = 15;
pub const GUIDE_HIKE_MIN_LEVEL: u32 = 2;
pub const PHOTO_BASE_CENTS: i64 = 1_000;
pub const PHOTO_CREATIVITY: f32 = 3.0;
pub const PERFORM_BASE_CENTS: i64 = 1_500;
pub const PERFORM_CONFIDENCE_FREE_MORALE: f32 = 3.0;
pub const GUIDE_BASE_CENTS: i64 = 2_400;
pub const EPIC_BONUS_CENTS: i64 = 6_000;
pub const EPIC_MORALE: f32 = 6.0;
pub const GATHER_PARTS_YIELD: f32 = 1.0;
pub const QUEST_INCOME_MULTIPLIER: f64 = 1.10;

// Travel -------------------------------------------------------------------
pub const DRIVE_MPH: f32 = 45.0;
pub const DRIVE_ENERGY_PER_HOUR: f32 = 6.0;
pub const DRIVE_WATER_GAL_PER_HOUR: f32 = 0.025;
pub const DRIVE_ALTERNATOR_PCT_PER_HOUR: f32 = 2.0;
pub const BREAKDOWN_CHANCE_PER_100_MILES: f32 = 0.03;
pub const REFUEL_PRICE_CENTS_PER_GAL: i64 = 400;
pub const REFUEL_MINUTES: u32 = 10;
pub const REPAIR_MINUTES: u32 = 90;
pub const REPAIR_SHOP_COST_CENTS: i64 = 15_000;
pub const REPAIR_ENERGY: f32 = 5.0;
pub const REPAIR_XP: u32 = 10;
pub const START_FUEL_FRACTION: f32 = 0.6;
pub const BATTERY_MODULE_RANGE_MILES: f32 = 40.0;

// Camping ------------------------------------------------------------------
pub const RANGER_FINE_CENTS: i64 = 2_500;
pub const RANGER_FINE_MORALE: f32 = 6.0;
pub const CAMP_EPIC_SCENE_CHANCE: f32 = 0.35;
pub const CAMP_EPIC_MORALE: f32 = 4.0;
pub const PAID_CAMP_COST_CENTS: i64 = 3_500;

// Pets ---------------------------------------------------------------------
pub const PET_ENERGY_DRAIN_PER_HOUR: f32 = 2.0;
pub const PET_WATER_GAL: f32 = 0.08;
pub const PET_START_BOND: f32 = 30.0;
pub const PET_START_ENERGY: f32 = 70.0;
pub const PET_START_ALERTNESS: f32 = 50.0;
pub const PET_NAP_ENERGY: f32 = 10.0;
pub const ADOPT_MORALE: f32 = 10.0;

// Economy ------------------------------------------------------------------
pub const START_CASH_CENTS: i64 = 120_000;
pub const SHOP_MINUTES: u32 = 15;
pub const WATER_PRICE_CENTS_PER_GAL: i64 = 400;
pub const MEAL_PRICE_CENTS: i64 = 500;
pub const STORAGE_WATER_STEP_GAL: f32 = 2.5;
pub const STORAGE_MEAL_STEP: f32 = 5.0;
pub const START_WATER_GAL: f32 = 5.0;
pub const START_MEALS: f32 = 6.0;
pub const PROPANE_CAP_LB: f32 = 20.0;
pub const BUTANE_CAP_CANS: f32 = 8.0;
pub const DIESEL_CAN_CAP_GAL: f32 = 5.0;
pub const EXTRA_FUEL_CAP_GAL: f32 = 10.0;
pub const PARTS_CAP: f32 = 6.0;
