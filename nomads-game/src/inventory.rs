//! Owned devices and the supplies ledger they draw from.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::constants::{FRIDGE_AMPS, HEATER_AMPS, STARLINK_AMPS};
use crate::error::Rejection;
use crate::jobs::QuestItem;
use crate::resources::ResourceLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Fridge,
    /// Propane stove.
    Stove,
    /// Butane jetboil.
    Jetboil,
    /// Diesel heater.
    Heater,
    Starlink,
    Tent,
}

impl Device {
    pub const ALL: [Self; 6] = [
        Self::Fridge,
        Self::Stove,
        Self::Jetboil,
        Self::Heater,
        Self::Starlink,
        Self::Tent,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fridge => "fridge",
            Self::Stove => "stove",
            Self::Jetboil => "jetboil",
            Self::Heater => "heater",
            Self::Starlink => "starlink",
            Self::Tent => "tent",
        }
    }

    /// Devices with an on/off switch that draw from the house battery.
    #[must_use]
    pub const fn is_switchable(self) -> bool {
        matches!(self, Self::Fridge | Self::Heater | Self::Starlink)
    }

    #[must_use]
    pub const fn amps(self) -> f32 {
        match self {
            Self::Fridge => FRIDGE_AMPS,
            Self::Heater => HEATER_AMPS,
            Self::Starlink => STARLINK_AMPS,
            Self::Stove | Self::Jetboil | Self::Tent => 0.0,
        }
    }

    #[must_use]
    pub const fn storage_slots(self) -> u32 {
        match self {
            Self::Fridge => 2,
            Self::Stove | Self::Jetboil | Self::Heater | Self::Starlink | Self::Tent => 1,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fridge" => Ok(Self::Fridge),
            "stove" | "propane_stove" => Ok(Self::Stove),
            "jetboil" => Ok(Self::Jetboil),
            "heater" | "diesel_heater" => Ok(Self::Heater),
            "starlink" => Ok(Self::Starlink),
            "tent" => Ok(Self::Tent),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeviceSlot {
    pub owned: bool,
    /// Switch position; only meaningful for switchable devices.
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Devices {
    slots: BTreeMap<Device, DeviceSlot>,
}

impl Devices {
    #[must_use]
    pub fn owns(&self, device: Device) -> bool {
        self.slots.get(&device).is_some_and(|slot| slot.owned)
    }

    /// Switch is on. Whether it actually runs also depends on house power.
    #[must_use]
    pub fn is_on(&self, device: Device) -> bool {
        self.slots
            .get(&device)
            .is_some_and(|slot| slot.owned && slot.on)
    }

    /// # Errors
    ///
    /// Returns [`Rejection::InvalidAction`] when the device is already owned.
    pub fn install(&mut self, device: Device) -> Result<(), Rejection> {
        if self.owns(device) {
            return Err(Rejection::invalid(format!("already own a {device}")));
        }
        self.slots.insert(
            device,
            DeviceSlot {
                owned: true,
                on: false,
            },
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Rejects devices that are not owned or have no switch.
    pub fn set_switch(&mut self, device: Device, on: bool) -> Result<(), Rejection> {
        if !self.owns(device) {
            return Err(Rejection::invalid(format!("you don't own a {device}")));
        }
        if !device.is_switchable() {
            return Err(Rejection::invalid(format!("{device} has no switch")));
        }
        if let Some(slot) = self.slots.get_mut(&device) {
            slot.on = on;
        }
        Ok(())
    }

    /// Flip a switch off without validation; used when a device shuts itself down.
    pub fn switch_off(&mut self, device: Device) {
        if let Some(slot) = self.slots.get_mut(&device) {
            slot.on = false;
        }
    }

    /// Combined draw of every switched-on device, in amps.
    #[must_use]
    pub fn switched_load_amps(&self) -> f32 {
        Device::ALL
            .into_iter()
            .filter(|device| self.is_on(*device))
            .map(Device::amps)
            .sum()
    }

    pub fn owned(&self) -> impl Iterator<Item = Device> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.owned)
            .map(|(device, _)| *device)
    }
}

/// Everything the rig carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Inventory {
    pub supplies: ResourceLedger,
    pub devices: Devices,
    #[serde(default)]
    pub quest_items: BTreeSet<QuestItem>,
}
