//! Outfitter price list and job discounts.
use crate::actions::BuyItem;
use crate::constants::{
    MEAL_PRICE_CENTS, REFUEL_PRICE_CENTS_PER_GAL, SOLAR_PANEL_WATTS, WATER_PRICE_CENTS_PER_GAL,
    WIND_TURBINE_WATTS,
};
use crate::inventory::Device;
use crate::numbers::{ceil_f64_to_i64, i64_to_f64};
use crate::resources::Consumable;

/// Sticker price for one unit of `item`, in cents.
#[must_use]
pub const fn base_price_cents(item: BuyItem) -> i64 {
    match item {
        BuyItem::Supply(kind) => match kind {
            Consumable::Meals => MEAL_PRICE_CENTS,
            Consumable::Water => WATER_PRICE_CENTS_PER_GAL,
            Consumable::Propane => 300,
            Consumable::Butane => 600,
            Consumable::Diesel => 500,
            Consumable::ExtraFuel | Consumable::Fuel => REFUEL_PRICE_CENTS_PER_GAL,
            Consumable::Parts => 4_000,
        },
        BuyItem::Device(device) => match device {
            Device::Fridge => 80_000,
            Device::Stove => 8_000,
            Device::Jetboil => 12_000,
            Device::Heater => 20_000,
            Device::Starlink => 50_000,
            Device::Tent => 15_000,
        },
        BuyItem::Solar => 40_000,
        BuyItem::Wind => 60_000,
        BuyItem::Battery => 120_000,
        BuyItem::Storage => 30_000,
    }
}

/// Upgrades and devices take the job's shop discount; consumables never do.
#[must_use]
pub const fn is_discountable(item: BuyItem) -> bool {
    !matches!(item, BuyItem::Supply(_))
}

/// Watts added per unit of a generator purchase.
#[must_use]
pub const fn watts_per_unit(item: BuyItem) -> u32 {
    match item {
        BuyItem::Solar => SOLAR_PANEL_WATTS,
        BuyItem::Wind => WIND_TURBINE_WATTS,
        _ => 0,
    }
}

/// Calculate the effective price after job discount.
/// Returns price in cents, rounded up.
#[must_use]
pub fn calculate_effective_price(base_price_cents: i64, discount_pct: f64) -> i64 {
    if discount_pct <= 0.0 {
        return base_price_cents;
    }

    let multiplier = 1.0 - (discount_pct / 100.0);
    ceil_f64_to_i64(i64_to_f64(base_price_cents) * multiplier)
}

/// Total for `qty` units with `discount` (a fraction, e.g. 0.15).
#[must_use]
pub fn quote_cents(item: BuyItem, qty: u32, discount: f32) -> i64 {
    let unit = if is_discountable(item) {
        calculate_effective_price(base_price_cents(item), f64::from(discount) * 100.0)
    } else {
        base_price_cents(item)
    };
    unit.saturating_mul(i64::from(qty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_applies_to_upgrades_only() {
        assert_eq!(quote_cents(BuyItem::Solar, 1, 0.15), 34_000);
        assert_eq!(quote_cents(BuyItem::Device(Device::Fridge), 1, 0.15), 68_000);
        assert_eq!(
            quote_cents(BuyItem::Supply(Consumable::Propane), 5, 0.15),
            1_500
        );
    }

    #[test]
    fn effective_price_rounds_up() {
        assert_eq!(calculate_effective_price(999, 10.0), 900);
        assert_eq!(calculate_effective_price(1_001, 10.0), 901);
        assert_eq!(calculate_effective_price(1_000, 0.0), 1_000);
    }

    #[test]
    fn generator_units() {
        assert_eq!(watts_per_unit(BuyItem::Solar), 200);
        assert_eq!(watts_per_unit(BuyItem::Wind), 300);
        assert_eq!(watts_per_unit(BuyItem::Device(Device::Tent)), 0);
    }
}
