//! 12 V house system: battery bank, solar and wind inputs, and the EV pack.
//!
//! Every turn the net current is integrated into the house bank. A flat bank
//! with a negative net current drops the system `Offline`, which cuts every
//! switched device until the bank recovers past [`POWER_RESTORE_PCT`].
use log::info;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::constants::{
    BASE_DRAW_AMPS, EV_RANGE_MAX_MILES, EV_SOLAR_TRICKLE_PCT_PER_KW, EV_WIND_TRICKLE_PCT_PER_300W,
    HOUSE_BATTERY_BASE_AH, POWER_RESTORE_PCT, START_EV_PCT, START_HOUSE_PCT, SUN_RISE, SUN_SET,
    SYSTEM_VOLTAGE, TURN_MINUTES,
};
use crate::environment::{SolarSite, Weather};
use crate::error::{Generator, Rejection};
use crate::numbers::u32_to_f32;
use crate::vehicle::VehicleSpec;

const TURN_HOURS: f32 = TURN_MINUTES as f32 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    #[default]
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerTransition {
    pub from: PowerState,
    pub to: PowerState,
    /// Simulated minute at which the switch happened.
    pub at_minute: u32,
}

/// One installed generator and the ceiling it may grow to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSource {
    pub installed_watts: u32,
    pub ceiling_watts: u32,
    /// Output during the most recent turn.
    #[serde(default)]
    pub input_watts: f32,
}

impl PowerSource {
    #[must_use]
    pub const fn new(ceiling_watts: u32) -> Self {
        Self {
            installed_watts: 0,
            ceiling_watts,
            input_watts: 0.0,
        }
    }

    #[must_use]
    pub const fn headroom_watts(&self) -> u32 {
        self.ceiling_watts.saturating_sub(self.installed_watts)
    }

    /// Current contributed at the system voltage during the last turn.
    #[must_use]
    pub fn input_amps(&self) -> f32 {
        self.input_watts / SYSTEM_VOLTAGE
    }
}

/// Conditions sampled for a single turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnConditions {
    pub minute_of_day: u32,
    pub site: SolarSite,
    pub weather: Weather,
    /// Draw of switched-on devices.
    pub device_amps: f32,
    /// Constant extra draw carried by the job.
    pub job_amps: f32,
    pub electric_drive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnReport {
    pub net_amps: f32,
    pub transition: Option<PowerTransition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalSystem {
    pub house_charge_ah: f32,
    pub house_capacity_ah: f32,
    pub solar: PowerSource,
    pub wind: PowerSource,
    pub ev_pct: f32,
    pub ev_range_miles: f32,
    pub state: PowerState,
    /// Net current during the most recent turn.
    #[serde(default)]
    pub net_amps: f32,
}

impl ElectricalSystem {
    #[must_use]
    pub fn for_vehicle(spec: &VehicleSpec) -> Self {
        let capacity = HOUSE_BATTERY_BASE_AH * spec.house_cap_factor;
        let ceiling = spec.power_ceiling();
        Self {
            house_charge_ah: capacity * START_HOUSE_PCT / 100.0,
            house_capacity_ah: capacity,
            solar: PowerSource::new(ceiling.solar_watts),
            wind: PowerSource::new(ceiling.wind_watts),
            ev_pct: START_EV_PCT,
            ev_range_miles: spec.ev_range_miles,
            state: PowerState::Online,
            net_amps: 0.0,
        }
    }

    /// House bank state of charge, 0–100.
    #[must_use]
    pub fn house_pct(&self) -> f32 {
        if self.house_capacity_ah <= 0.0 {
            return 0.0;
        }
        (self.house_charge_ah / self.house_capacity_ah * 100.0).clamp(0.0, 100.0)
    }

    /// Clamp stored charge into the battery's range.
    pub fn normalize(&mut self) {
        self.house_capacity_ah = self.house_capacity_ah.max(0.0);
        self.house_charge_ah = self.house_charge_ah.clamp(0.0, self.house_capacity_ah);
        self.ev_pct = self.ev_pct.clamp(0.0, 100.0);
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self.state, PowerState::Online)
    }

    /// Add generator capacity. Purchases that would cross the vehicle's
    /// ceiling are refused whole; nothing is partially installed.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::CapacityExceeded`] when `installed + watts`
    /// exceeds the ceiling, and [`Rejection::InvalidAction`] for zero watts.
    pub fn install(&mut self, generator: Generator, watts: u32) -> Result<u32, Rejection> {
        if watts == 0 {
            return Err(Rejection::invalid("nothing to install"));
        }
        let source = match generator {
            Generator::Solar => &mut self.solar,
            Generator::Wind => &mut self.wind,
        };
        let total = source.installed_watts.saturating_add(watts);
        if total > source.ceiling_watts {
            return Err(Rejection::CapacityExceeded {
                generator,
                installed: source.installed_watts,
                requested: watts,
                ceiling: source.ceiling_watts,
            });
        }
        source.installed_watts = total;
        Ok(total)
    }

    /// # Errors
    ///
    /// See [`ElectricalSystem::install`].
    pub fn install_solar(&mut self, watts: u32) -> Result<u32, Rejection> {
        self.install(Generator::Solar, watts)
    }

    /// # Errors
    ///
    /// See [`ElectricalSystem::install`].
    pub fn install_wind(&mut self, watts: u32) -> Result<u32, Rejection> {
        self.install(Generator::Wind, watts)
    }

    /// Solar output for the given minute of day, following a half-sine sun
    /// curve between sunrise and sunset.
    #[must_use]
    pub fn solar_watts_at(&self, minute_of_day: u32, site: SolarSite, weather: Weather) -> f32 {
        if self.solar.installed_watts == 0 || !(SUN_RISE..=SUN_SET).contains(&minute_of_day) {
            return 0.0;
        }
        let t = u32_to_f32(minute_of_day - SUN_RISE) / u32_to_f32(SUN_SET - SUN_RISE);
        let sun = (PI * t).sin().max(0.0);
        u32_to_f32(self.solar.installed_watts) * site.factor() * sun * weather.solar_multiplier()
    }

    #[must_use]
    pub fn wind_watts_in(&self, weather: Weather) -> f32 {
        u32_to_f32(self.wind.installed_watts) * weather.wind.turbine_fraction()
    }

    /// House load for the turn. Offline systems only carry the base draw.
    #[must_use]
    pub fn load_amps(&self, device_amps: f32, job_amps: f32) -> f32 {
        match self.state {
            PowerState::Online => BASE_DRAW_AMPS + device_amps.max(0.0) + job_amps.max(0.0),
            PowerState::Offline => BASE_DRAW_AMPS,
        }
    }

    /// Integrate one turn of generation and load into the house bank.
    pub fn tick(&mut self, conditions: &TurnConditions, now_minute: u32) -> TurnReport {
        self.solar.input_watts =
            self.solar_watts_at(conditions.minute_of_day, conditions.site, conditions.weather);
        self.wind.input_watts = self.wind_watts_in(conditions.weather);

        let generated = self.solar.input_amps() + self.wind.input_amps();
        let net = generated - self.load_amps(conditions.device_amps, conditions.job_amps);
        self.net_amps = net;
        self.house_charge_ah =
            (self.house_charge_ah + net * TURN_HOURS).clamp(0.0, self.house_capacity_ah);

        if conditions.electric_drive {
            self.trickle_ev(conditions);
        }

        let transition = self.update_state(now_minute);
        TurnReport {
            net_amps: net,
            transition,
        }
    }

    fn trickle_ev(&mut self, conditions: &TurnConditions) {
        let mut gain = 0.0;
        if self.solar.input_watts > 0.0 {
            gain += u32_to_f32(self.solar.installed_watts) / 1000.0
                * EV_SOLAR_TRICKLE_PCT_PER_KW
                * conditions.site.factor();
        }
        if self.wind.installed_watts > 0 {
            gain += u32_to_f32(self.wind.installed_watts) / 300.0
                * conditions.weather.wind.turbine_fraction()
                * EV_WIND_TRICKLE_PCT_PER_300W;
        }
        self.charge_ev(gain);
    }

    fn update_state(&mut self, now_minute: u32) -> Option<PowerTransition> {
        let next = match self.state {
            PowerState::Online if self.house_charge_ah <= 0.0 && self.net_amps < 0.0 => {
                PowerState::Offline
            }
            PowerState::Offline if self.house_pct() >= POWER_RESTORE_PCT => PowerState::Online,
            current => current,
        };
        if next == self.state {
            return None;
        }
        let transition = PowerTransition {
            from: self.state,
            to: next,
            at_minute: now_minute,
        };
        info!(
            "house power {:?} -> {:?} at {:.1}%",
            transition.from,
            transition.to,
            self.house_pct()
        );
        self.state = next;
        Some(transition)
    }

    /// Charge the house bank by a percentage of capacity, returning the
    /// percentage actually added. May bring the system back online.
    pub fn charge_house_pct(&mut self, pct: f32, now_minute: u32) -> (f32, Option<PowerTransition>) {
        if !pct.is_finite() || pct <= 0.0 {
            return (0.0, None);
        }
        let before = self.house_pct();
        self.house_charge_ah =
            (self.house_charge_ah + self.house_capacity_ah * pct / 100.0).min(self.house_capacity_ah);
        let added = self.house_pct() - before;
        (added, self.update_state(now_minute))
    }

    /// Pull a one-off load from the house bank, such as an inverter burst.
    /// Returns false, leaving the bank untouched, when offline or short.
    pub fn draw_house_ah(&mut self, amp_hours: f32) -> bool {
        if !self.is_online() || self.house_charge_ah < amp_hours {
            return false;
        }
        self.house_charge_ah -= amp_hours;
        true
    }

    /// Returns the percentage actually added.
    pub fn charge_ev(&mut self, pct: f32) -> f32 {
        if !pct.is_finite() || pct <= 0.0 {
            return 0.0;
        }
        let before = self.ev_pct;
        self.ev_pct = (self.ev_pct + pct).clamp(0.0, 100.0);
        self.ev_pct - before
    }

    /// Pack percentage needed to cover `miles`.
    #[must_use]
    pub fn ev_pct_for(&self, miles: f32) -> f32 {
        miles.max(0.0) / self.ev_range_miles.max(1.0) * 100.0
    }

    /// Furthest distance the pack covers right now.
    #[must_use]
    pub fn ev_range_now(&self) -> f32 {
        self.ev_range_miles * self.ev_pct / 100.0
    }

    /// # Errors
    ///
    /// Returns [`Rejection::InsufficientCharge`] when the pack holds less
    /// than the leg needs.
    pub fn draw_ev_for(&mut self, miles: f32) -> Result<f32, Rejection> {
        let needed = self.ev_pct_for(miles);
        if needed > self.ev_pct + 1e-4 {
            return Err(Rejection::InsufficientCharge {
                needed_pct: needed,
                available_pct: self.ev_pct,
            });
        }
        self.ev_pct = (self.ev_pct - needed).max(0.0);
        Ok(self.ev_pct)
    }

    /// Add battery modules to the EV pack.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InvalidAction`] once the pack is at its maximum range.
    pub fn extend_ev_range(&mut self, miles: f32) -> Result<f32, Rejection> {
        if self.ev_range_miles >= EV_RANGE_MAX_MILES {
            return Err(Rejection::invalid("EV pack is already at maximum range"));
        }
        self.ev_range_miles = (self.ev_range_miles + miles.max(0.0)).min(EV_RANGE_MAX_MILES);
        Ok(self.ev_range_miles)
    }
}
