//! Vehicle catalog, drivetrain, storage and breakdowns.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::constants::BREAKDOWN_CHANCE_PER_100_MILES;
use crate::error::{CatalogError, Rejection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Prius,
    Sedan,
    Van,
    TruckCamper,
    Skoolie,
    ClassC,
}

impl VehicleKind {
    pub const ALL: [Self; 6] = [
        Self::Prius,
        Self::Sedan,
        Self::Van,
        Self::TruckCamper,
        Self::Skoolie,
        Self::ClassC,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prius => "prius",
            Self::Sedan => "sedan",
            Self::Van => "van",
            Self::TruckCamper => "truck_camper",
            Self::Skoolie => "skoolie",
            Self::ClassC => "class_c",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Drivetrain {
    #[default]
    Fuel,
    Electric,
}

/// Solar and wind ceilings for a power tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerCeiling {
    pub solar_watts: u32,
    pub wind_watts: u32,
}

impl PowerCeiling {
    /// Tier table; tiers outside 1..=4 clamp to the nearest entry.
    #[must_use]
    pub const fn for_tier(tier: u8) -> Self {
        match tier {
            0 | 1 => Self {
                solar_watts: 400,
                wind_watts: 300,
            },
            2 => Self {
                solar_watts: 800,
                wind_watts: 300,
            },
            3 => Self {
                solar_watts: 1_000,
                wind_watts: 600,
            },
            _ => Self {
                solar_watts: 1_800,
                wind_watts: 900,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub kind: VehicleKind,
    pub label: String,
    pub cost_cents: i64,
    pub drivetrain: Drivetrain,
    pub ev_range_miles: f32,
    pub mpg: f32,
    pub tank_gal: f32,
    pub storage_slots: u32,
    pub base_water_gal: f32,
    pub max_water_gal: f32,
    pub base_meals: f32,
    pub max_meals: f32,
    pub house_cap_factor: f32,
    pub stealth_tier: u8,
    pub dispersed_tier: u8,
    pub power_tier: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct VehicleSpecNoId {
    label: String,
    cost_cents: i64,
    #[serde(default)]
    drivetrain: Drivetrain,
    ev_range_miles: f32,
    mpg: f32,
    tank_gal: f32,
    storage_slots: u32,
    base_water_gal: f32,
    max_water_gal: f32,
    base_meals: f32,
    max_meals: f32,
    house_cap_factor: f32,
    stealth_tier: u8,
    dispersed_tier: u8,
    power_tier: u8,
}

impl VehicleSpec {
    fn with_kind(kind: VehicleKind, v: VehicleSpecNoId) -> Self {
        Self {
            kind,
            label: v.label,
            cost_cents: v.cost_cents,
            drivetrain: v.drivetrain,
            ev_range_miles: v.ev_range_miles,
            mpg: v.mpg,
            tank_gal: v.tank_gal,
            storage_slots: v.storage_slots,
            base_water_gal: v.base_water_gal,
            max_water_gal: v.max_water_gal,
            base_meals: v.base_meals,
            max_meals: v.max_meals,
            house_cap_factor: v.house_cap_factor,
            stealth_tier: v.stealth_tier,
            dispersed_tier: v.dispersed_tier,
            power_tier: v.power_tier,
        }
    }

    #[must_use]
    pub const fn power_ceiling(&self) -> PowerCeiling {
        PowerCeiling::for_tier(self.power_tier)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let checks = [
            ("mpg", self.mpg, 1.0, 100.0),
            ("tank_gal", self.tank_gal, 1.0, 200.0),
            ("house_cap_factor", self.house_cap_factor, 0.1, 10.0),
            ("base_water_gal", self.base_water_gal, 0.0, self.max_water_gal),
            ("base_meals", self.base_meals, 0.0, self.max_meals),
        ];
        for (field, value, min, max) in checks {
            if !(min..=max).contains(&value) {
                return Err(CatalogError::RangeViolation {
                    field: format!("{}.{field}", self.kind),
                    min,
                    max,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VehicleCatalog(pub Vec<VehicleSpec>);

impl VehicleCatalog {
    /// Load the catalog from a JSON object keyed by vehicle id.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed, a variant is missing,
    /// or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let map: HashMap<String, VehicleSpecNoId> = serde_json::from_str(json)?;
        let mut specs = Vec::with_capacity(VehicleKind::ALL.len());
        for kind in VehicleKind::ALL {
            let raw = map
                .get(kind.as_str())
                .cloned()
                .ok_or(CatalogError::MissingEntry(kind.as_str()))?;
            let spec = VehicleSpec::with_kind(kind, raw);
            spec.validate()?;
            specs.push(spec);
        }
        Ok(Self(specs))
    }

    /// Embedded catalog, parsed once.
    ///
    #[must_use]
    pub fn embedded() -> &'static Self {
        static CATALOG: OnceLock<VehicleCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            Self::from_json(include_str!("../data/vehicles.json")).unwrap_or_else(|err| {
                log::error!("embedded vehicle catalog rejected: {err}");
                Self::default()
            })
        })
    }

    #[must_use]
    pub fn get(&self, kind: VehicleKind) -> Option<&VehicleSpec> {
        self.0.iter().find(|spec| spec.kind == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VehicleSpec> {
        self.0.iter()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Part {
    Tire,
    Battery,
    Alternator,
    FuelPump,
}

impl Part {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Tire => "vehicle.parts.tire",
            Self::Battery => "vehicle.parts.battery",
            Self::Alternator => "vehicle.parts.alt",
            Self::FuelPump => "vehicle.parts.pump",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub part: Part,
    pub day_started: u32,
}

/// The player's rig: catalog spec plus mutable condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub spec: VehicleSpec,
    pub drivetrain: Drivetrain,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub storage_used: u32,
    pub storage_max: u32,
    #[serde(default)]
    pub breakdown: Option<Breakdown>,
    #[serde(default)]
    pub odometer_miles: f32,
}

impl Vehicle {
    #[must_use]
    pub fn new(spec: VehicleSpec, color: impl Into<String>) -> Self {
        Self {
            drivetrain: spec.drivetrain,
            storage_max: spec.storage_slots,
            spec,
            color: color.into(),
            storage_used: 0,
            breakdown: None,
            odometer_miles: 0.0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> VehicleKind {
        self.spec.kind
    }

    #[must_use]
    pub const fn is_broken_down(&self) -> bool {
        self.breakdown.is_some()
    }

    #[must_use]
    pub const fn storage_free(&self) -> u32 {
        self.storage_max.saturating_sub(self.storage_used)
    }

    /// Claim storage slots for a newly installed item.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::StorageFull`] when fewer than `slots` are free.
    pub const fn reserve_storage(&mut self, slots: u32) -> Result<(), Rejection> {
        if slots > self.storage_free() {
            return Err(Rejection::StorageFull {
                used: self.storage_used,
                max: self.storage_max,
                needed: slots,
            });
        }
        self.storage_used += slots;
        Ok(())
    }
}

/// Part weights for weighted random selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartWeights {
    pub tire: u32,
    pub battery: u32,
    pub alt: u32,
    pub pump: u32,
}

impl Default for PartWeights {
    fn default() -> Self {
        Self {
            tire: 50,
            battery: 20,
            alt: 15,
            pump: 15,
        }
    }
}

/// Weighted random selection from a list of options
pub fn weighted_pick<T, R>(options: &[(T, u32)], rng: &mut R) -> Option<T>
where
    R: Rng,
    T: Clone,
{
    let total_weight: u32 = options.iter().map(|(_, weight)| *weight).sum();
    if total_weight == 0 {
        return None;
    }

    let roll = rng.gen_range(0..total_weight);
    let mut current_weight = 0;
    for (item, weight) in options {
        current_weight += weight;
        if roll < current_weight {
            return Some(item.clone());
        }
    }
    options.first().map(|(item, _)| item.clone())
}

/// Chance of breaking down across a leg of `miles`.
#[must_use]
pub fn breakdown_chance(miles: f32) -> f32 {
    (miles.max(0.0) / 100.0 * BREAKDOWN_CHANCE_PER_100_MILES).clamp(0.0, 0.9)
}

/// Roll for a breakdown over a driven leg and pick the failed part.
pub fn roll_breakdown<R: Rng>(miles: f32, rng: &mut R) -> Option<Part> {
    if rng.r#gen::<f32>() >= breakdown_chance(miles) {
        return None;
    }
    let weights = PartWeights::default();
    let options = [
        (Part::Tire, weights.tire),
        (Part::Battery, weights.battery),
        (Part::Alternator, weights.alt),
        (Part::FuelPump, weights.pump),
    ];
    weighted_pick(&options, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn embedded_catalog_has_all_six_variants() {
        let catalog = VehicleCatalog::embedded();
        assert_eq!(catalog.iter().count(), 6);
        let prius = catalog.get(VehicleKind::Prius).unwrap();
        assert!((prius.mpg - 30.0).abs() < f32::EPSILON);
        assert_eq!(prius.power_ceiling().solar_watts, 400);
    }

    #[test]
    fn missing_variant_is_reported() {
        let err = VehicleCatalog::from_json("{}").unwrap_err();
        assert!(matches!(err, CatalogError::MissingEntry("prius")));
    }

    #[test]
    fn storage_reservation_respects_max() {
        let spec = VehicleCatalog::embedded()
            .get(VehicleKind::Prius)
            .cloned()
            .unwrap();
        let mut vehicle = Vehicle::new(spec, "white");
        assert!(vehicle.reserve_storage(4).is_ok());
        let err = vehicle.reserve_storage(3).unwrap_err();
        assert!(matches!(err, Rejection::StorageFull { used: 4, max: 6, .. }));
        assert_eq!(vehicle.storage_used, 4);
    }

    #[test]
    fn kinds_parse_from_labels() {
        assert_eq!("Truck Camper".parse::<VehicleKind>(), Ok(VehicleKind::TruckCamper));
        assert_eq!("class-c".parse::<VehicleKind>(), Ok(VehicleKind::ClassC));
        assert!("yacht".parse::<VehicleKind>().is_err());
    }

    #[test]
    fn weighted_pick_breaks_on_match() {
        let options = vec![(Part::Tire, 2), (Part::Battery, 1)];
        let mut rng = StepRng::new(0, 0);
        let pick = weighted_pick(&options, &mut rng);
        assert_eq!(pick, Some(Part::Tire));
    }

    #[test]
    fn zero_mile_leg_never_breaks_down() {
        let mut rng = StepRng::new(0, 0);
        assert!(roll_breakdown(0.0, &mut rng).is_none());
        assert!(breakdown_chance(10_000.0) <= 0.9);
    }
}
