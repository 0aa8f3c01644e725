//! Read-only description of where the rig is parked right now.
//!
//! The map layer owns locations and routing; the core only ever sees the
//! snapshot it is handed at the start of an action.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeatBand {
    Cold,
    #[default]
    Mild,
    Hot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindBand {
    #[default]
    Low,
    Medium,
    High,
}

impl WindBand {
    /// Share of rated turbine output produced in this wind.
    #[must_use]
    pub const fn turbine_fraction(self) -> f32 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.6,
            Self::High => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Weather {
    #[serde(default)]
    pub heat: HeatBand,
    #[serde(default)]
    pub wind: WindBand,
    #[serde(default)]
    pub storm: bool,
}

impl Weather {
    #[must_use]
    pub const fn solar_multiplier(self) -> f32 {
        if self.storm {
            0.25
        } else {
            match self.heat {
                HeatBand::Cold => 0.85,
                HeatBand::Mild | HeatBand::Hot => 1.0,
            }
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heat = match self.heat {
            HeatBand::Cold => "cold",
            HeatBand::Mild => "mild",
            HeatBand::Hot => "hot",
        };
        let wind = match self.wind {
            WindBand::Low => "calm",
            WindBand::Medium => "breezy",
            WindBand::High => "windy",
        };
        write!(f, "{heat}, {wind}")?;
        if self.storm {
            f.write_str(", stormy")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolarSite {
    Excellent,
    Good,
    #[default]
    Fair,
    Poor,
}

impl SolarSite {
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::Excellent => 1.0,
            Self::Good => 0.75,
            Self::Fair => 0.5,
            Self::Poor => 0.25,
        }
    }
}

impl FromStr for SolarSite {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(Self::Excellent),
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            _ => Err(()),
        }
    }
}

/// What the current stop offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Facilities {
    #[serde(default)]
    pub water: bool,
    #[serde(default)]
    pub cell: bool,
    #[serde(default)]
    pub restrooms: bool,
    #[serde(default)]
    pub fuel: bool,
    #[serde(default)]
    pub store: bool,
    #[serde(default)]
    pub charger: bool,
    #[serde(default)]
    pub trailhead: bool,
    #[serde(default)]
    pub town: bool,
    #[serde(default)]
    pub pet_adoption: bool,
    /// Inside a national park, where rangers patrol dispersed sites.
    #[serde(default)]
    pub park: bool,
}

impl Facilities {
    /// A full-service town stop.
    #[must_use]
    pub const fn town() -> Self {
        Self {
            water: true,
            cell: true,
            restrooms: true,
            fuel: true,
            store: true,
            charger: true,
            trailhead: false,
            town: true,
            pet_adoption: false,
            park: false,
        }
    }

    /// Nothing but dirt and sky.
    #[must_use]
    pub const fn backcountry() -> Self {
        Self {
            water: false,
            cell: false,
            restrooms: false,
            fuel: false,
            store: false,
            charger: false,
            trailhead: true,
            town: false,
            pet_adoption: false,
            park: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub location_id: String,
    #[serde(default)]
    pub elevation_ft: i32,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub has_signal: bool,
    #[serde(default)]
    pub facilities: Facilities,
    #[serde(default)]
    pub solar_site: SolarSite,
}

impl EnvironmentSnapshot {
    #[must_use]
    pub fn new(location_id: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            elevation_ft: 0,
            weather: Weather::default(),
            has_signal: false,
            facilities: Facilities::default(),
            solar_site: SolarSite::default(),
        }
    }

    /// A town stop with signal and every facility.
    #[must_use]
    pub fn town(location_id: impl Into<String>) -> Self {
        Self::new(location_id)
            .with_signal(true)
            .with_facilities(Facilities::town())
    }

    /// A remote stop with no services and no bars.
    #[must_use]
    pub fn backcountry(location_id: impl Into<String>) -> Self {
        Self::new(location_id).with_facilities(Facilities::backcountry())
    }

    #[must_use]
    pub const fn with_signal(mut self, has_signal: bool) -> Self {
        self.has_signal = has_signal;
        self
    }

    #[must_use]
    pub const fn with_facilities(mut self, facilities: Facilities) -> Self {
        self.facilities = facilities;
        self
    }

    #[must_use]
    pub const fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    #[must_use]
    pub const fn with_solar_site(mut self, site: SolarSite) -> Self {
        self.solar_site = site;
        self
    }

    #[must_use]
    pub const fn with_elevation(mut self, elevation_ft: i32) -> Self {
        self.elevation_ft = elevation_ft;
        self
    }
}
