//! Consumable ledger: the single authority for quantities and capacities.
//!
//! Every draw-down and replenishment of fuel, water, food and cooking or
//! heating fuel goes through [`ResourceLedger`]. Callers never touch the
//! raw quantities, so a quantity can never leave `[0, capacity]`.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Rejection;

const EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consumable {
    /// Ready-to-cook rations.
    Meals,
    /// Fresh water, gallons.
    Water,
    /// Stove propane, pounds.
    Propane,
    /// Jetboil butane, cans.
    Butane,
    /// Heater diesel can, gallons.
    Diesel,
    /// Jerry-can fuel carried outside the tank, gallons.
    ExtraFuel,
    /// Vehicle tank, gallons.
    Fuel,
    /// Salvaged spare parts.
    Parts,
}

impl Consumable {
    pub const ALL: [Self; 8] = [
        Self::Meals,
        Self::Water,
        Self::Propane,
        Self::Butane,
        Self::Diesel,
        Self::ExtraFuel,
        Self::Fuel,
        Self::Parts,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meals => "meals",
            Self::Water => "water",
            Self::Propane => "propane",
            Self::Butane => "butane",
            Self::Diesel => "diesel",
            Self::ExtraFuel => "extra_fuel",
            Self::Fuel => "fuel",
            Self::Parts => "parts",
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Meals => "meal",
            Self::Water | Self::Diesel | Self::ExtraFuel | Self::Fuel => "gal",
            Self::Propane => "lb",
            Self::Butane => "can",
            Self::Parts => "part",
        }
    }
}

impl fmt::Display for Consumable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consumable {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meals" | "meal" | "food" => Ok(Self::Meals),
            "water" => Ok(Self::Water),
            "propane" | "propane_lb" => Ok(Self::Propane),
            "butane" | "butane_can" => Ok(Self::Butane),
            "diesel" | "diesel_can" => Ok(Self::Diesel),
            "extra_fuel" | "jerry_can" => Ok(Self::ExtraFuel),
            "fuel" | "gas" => Ok(Self::Fuel),
            "parts" | "part" => Ok(Self::Parts),
            _ => Err(()),
        }
    }
}

/// Quantity and ceiling for one consumable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub quantity: f32,
    pub capacity: f32,
}

impl Stock {
    #[must_use]
    pub fn new(quantity: f32, capacity: f32) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            quantity: quantity.clamp(0.0, capacity),
            capacity,
        }
    }

    #[must_use]
    pub fn headroom(&self) -> f32 {
        (self.capacity - self.quantity).max(0.0)
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.capacity <= 0.0 {
            0.0
        } else {
            (self.quantity / self.capacity).clamp(0.0, 1.0)
        }
    }
}

/// Signed movement of one consumable during an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub kind: Consumable,
    pub amount: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceLedger {
    stocks: BTreeMap<Consumable, Stock>,
}

impl ResourceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a consumable with its starting quantity.
    #[must_use]
    pub fn with_stock(mut self, kind: Consumable, quantity: f32, capacity: f32) -> Self {
        self.stocks.insert(kind, Stock::new(quantity, capacity));
        self
    }

    /// Pull every stock back into `[0, capacity]`, e.g. after loading a
    /// snapshot that skipped [`Stock::new`].
    pub fn normalize(&mut self) {
        for stock in self.stocks.values_mut() {
            *stock = Stock::new(stock.quantity, stock.capacity);
        }
    }

    #[must_use]
    pub fn stock(&self, kind: Consumable) -> Stock {
        self.stocks
            .get(&kind)
            .copied()
            .unwrap_or(Stock::new(0.0, 0.0))
    }

    #[must_use]
    pub fn quantity(&self, kind: Consumable) -> f32 {
        self.stock(kind).quantity
    }

    #[must_use]
    pub fn capacity(&self, kind: Consumable) -> f32 {
        self.stock(kind).capacity
    }

    #[must_use]
    pub fn has(&self, kind: Consumable, amount: f32) -> bool {
        self.quantity(kind) + EPSILON >= amount
    }

    /// Remove exactly `amount` or fail without touching the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InsufficientResource`] when less than `amount`
    /// is on hand, and [`Rejection::InvalidAction`] for negative or
    /// non-finite amounts.
    pub fn consume(&mut self, kind: Consumable, amount: f32) -> Result<f32, Rejection> {
        validate_amount(amount)?;
        let available = self.quantity(kind);
        if available + EPSILON < amount {
            return Err(Rejection::InsufficientResource {
                kind,
                needed: amount,
                available,
            });
        }
        let stock = self.entry(kind);
        stock.quantity = (stock.quantity - amount).max(0.0);
        Ok(stock.quantity)
    }

    /// Take `amount` from `primary`, covering any shortfall from `reserve`.
    /// Returns how much came out of the reserve.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InsufficientResource`] (reported against
    /// `primary`) when both together fall short; nothing is taken.
    pub fn consume_with_reserve(
        &mut self,
        primary: Consumable,
        reserve: Consumable,
        amount: f32,
    ) -> Result<f32, Rejection> {
        validate_amount(amount)?;
        let on_hand = self.quantity(primary);
        let spare = self.quantity(reserve);
        if on_hand + spare + EPSILON < amount {
            return Err(Rejection::InsufficientResource {
                kind: primary,
                needed: amount,
                available: on_hand + spare,
            });
        }
        let from_primary = amount.min(on_hand);
        let from_reserve = (amount - from_primary).min(spare);
        self.entry(primary).quantity = (on_hand - from_primary).max(0.0);
        if from_reserve > 0.0 {
            self.entry(reserve).quantity = (spare - from_reserve).max(0.0);
        }
        Ok(from_reserve)
    }

    /// Add exactly `amount` or fail without touching the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::OverCapacity`] when the result would exceed the
    /// consumable's capacity, and [`Rejection::InvalidAction`] for negative
    /// or non-finite amounts.
    pub fn refill(&mut self, kind: Consumable, amount: f32) -> Result<f32, Rejection> {
        validate_amount(amount)?;
        let current = self.stock(kind);
        if current.quantity + amount > current.capacity + EPSILON {
            return Err(Rejection::OverCapacity {
                kind,
                current: current.quantity,
                requested: amount,
                capacity: current.capacity,
            });
        }
        let stock = self.entry(kind);
        stock.quantity = (stock.quantity + amount).min(stock.capacity);
        Ok(stock.quantity)
    }

    /// Passive draw-down over elapsed time. Takes what is there and returns
    /// the shortfall that could not be covered.
    pub fn drain(&mut self, kind: Consumable, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let stock = self.entry(kind);
        let taken = amount.min(stock.quantity);
        stock.quantity = (stock.quantity - taken).max(0.0);
        amount - taken
    }

    /// Passive top-up that saturates at capacity. Returns the amount added.
    pub fn top_up(&mut self, kind: Consumable, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let stock = self.entry(kind);
        let added = amount.min(stock.headroom());
        stock.quantity += added;
        added
    }

    /// Change a ceiling. Capacity never drops below the quantity on hand.
    pub fn set_capacity(&mut self, kind: Consumable, capacity: f32) -> f32 {
        let stock = self.entry(kind);
        stock.capacity = capacity.max(stock.quantity).max(0.0);
        stock.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = (Consumable, Stock)> + '_ {
        self.stocks.iter().map(|(kind, stock)| (*kind, *stock))
    }

    /// Signed per-kind differences between two ledgers (`after - self`).
    #[must_use]
    pub fn diff(&self, after: &Self) -> Vec<ResourceDelta> {
        Consumable::ALL
            .into_iter()
            .filter_map(|kind| {
                let amount = after.quantity(kind) - self.quantity(kind);
                (amount.abs() > EPSILON).then_some(ResourceDelta { kind, amount })
            })
            .collect()
    }

    fn entry(&mut self, kind: Consumable) -> &mut Stock {
        self.stocks.entry(kind).or_insert(Stock::new(0.0, 0.0))
    }
}

fn validate_amount(amount: f32) -> Result<(), Rejection> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Rejection::invalid(format!("invalid amount {amount}")));
    }
    Ok(())
}

/// Gallons burned covering `miles` at `mpg`.
#[must_use]
pub fn gallons_for(miles: f32, mpg: f32) -> f32 {
    miles.max(0.0) / mpg.max(1.0)
}

/// Furthest distance `fuel_gal` covers at `mpg`.
#[must_use]
pub fn max_range_miles(fuel_gal: f32, mpg: f32) -> f32 {
    fuel_gal.max(0.0) * mpg.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn ledger() -> ResourceLedger {
        ResourceLedger::new()
            .with_stock(Consumable::Water, 5.0, 10.0)
            .with_stock(Consumable::Fuel, 2.0, 11.0)
    }

    #[test]
    fn consume_rejects_without_mutating() {
        let mut ledger = ledger();
        let err = ledger.consume(Consumable::Water, 6.0).unwrap_err();
        assert!(matches!(
            err,
            Rejection::InsufficientResource {
                kind: Consumable::Water,
                ..
            }
        ));
        assert!((ledger.quantity(Consumable::Water) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn refill_rejects_over_capacity() {
        let mut ledger = ledger();
        let err = ledger.refill(Consumable::Water, 5.5).unwrap_err();
        assert!(matches!(err, Rejection::OverCapacity { .. }));
        assert!(ledger.refill(Consumable::Water, 5.0).is_ok());
        assert!((ledger.quantity(Consumable::Water) - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn negative_amounts_are_invalid() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.consume(Consumable::Water, -1.0),
            Err(Rejection::InvalidAction { .. })
        ));
        assert!(matches!(
            ledger.refill(Consumable::Water, f32::NAN),
            Err(Rejection::InvalidAction { .. })
        ));
    }

    #[test]
    fn drain_reports_shortfall() {
        let mut ledger = ledger();
        let short = ledger.drain(Consumable::Water, 7.5);
        assert!((short - 2.5).abs() < 1e-5);
        assert!(ledger.quantity(Consumable::Water).abs() < f32::EPSILON);
    }

    #[test]
    fn quantities_stay_in_bounds_for_any_sequence() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(77);
        let mut ledger = ledger();
        for _ in 0..5_000 {
            let amount: f32 = rng.gen_range(0.0..8.0);
            let _ = if rng.gen_bool(0.5) {
                ledger.consume(Consumable::Water, amount)
            } else {
                ledger.refill(Consumable::Water, amount)
            };
            let stock = ledger.stock(Consumable::Water);
            assert!(stock.quantity >= 0.0 && stock.quantity <= stock.capacity);
        }
    }

    #[test]
    fn prius_range_math() {
        assert!((max_range_miles(2.0, 30.0) - 60.0).abs() < f32::EPSILON);
        assert!((gallons_for(100.0, 30.0) - 3.333_333).abs() < 1e-4);
    }

    #[test]
    fn capacity_never_drops_below_quantity() {
        let mut ledger = ledger();
        assert!((ledger.set_capacity(Consumable::Water, 2.0) - 5.0).abs() < f32::EPSILON);
        assert!((ledger.set_capacity(Consumable::Water, 12.5) - 12.5).abs() < f32::EPSILON);
    }

    #[test]
    fn reserve_covers_the_shortfall_or_nothing_moves() {
        let mut ledger = ledger().with_stock(Consumable::ExtraFuel, 1.0, 10.0);
        let err = ledger
            .consume_with_reserve(Consumable::Fuel, Consumable::ExtraFuel, 3.5)
            .unwrap_err();
        assert!(matches!(
            err,
            Rejection::InsufficientResource {
                kind: Consumable::Fuel,
                ..
            }
        ));
        assert!((ledger.quantity(Consumable::Fuel) - 2.0).abs() < f32::EPSILON);
        assert!((ledger.quantity(Consumable::ExtraFuel) - 1.0).abs() < f32::EPSILON);

        let from_cans = ledger
            .consume_with_reserve(Consumable::Fuel, Consumable::ExtraFuel, 2.5)
            .unwrap();
        assert!((from_cans - 0.5).abs() < 1e-5);
        assert!(ledger.quantity(Consumable::Fuel).abs() < f32::EPSILON);
        assert!((ledger.quantity(Consumable::ExtraFuel) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn normalize_pulls_loaded_stocks_back_in_bounds() {
        let mut ledger = ledger();
        ledger.stocks.insert(
            Consumable::Water,
            Stock {
                quantity: 999.0,
                capacity: 10.0,
            },
        );
        ledger.stocks.insert(
            Consumable::Fuel,
            Stock {
                quantity: -3.0,
                capacity: 11.0,
            },
        );
        ledger.normalize();
        assert!((ledger.quantity(Consumable::Water) - 10.0).abs() < f32::EPSILON);
        assert!(ledger.quantity(Consumable::Fuel).abs() < f32::EPSILON);
    }

    #[test]
    fn diff_reports_signed_movement() {
        let before = ledger();
        let mut after = before.clone();
        after.consume(Consumable::Fuel, 1.5).unwrap();
        let deltas = before.diff(&after);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].kind, Consumable::Fuel);
        assert!((deltas[0].amount + 1.5).abs() < 1e-5);
    }
}
