//! Typed rejections and catalog errors.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resources::Consumable;
use crate::stats::Stat;

/// Which installed generator a capacity check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    Solar,
    Wind,
}

impl Generator {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Wind => "wind",
        }
    }
}

/// Why an action was refused. Every variant is recoverable and is reported
/// back through the outcome record; none of them mutate state.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "rejection", rename_all = "snake_case")]
pub enum Rejection {
    #[error("not enough {kind:?}: need {needed:.2}, have {available:.2}")]
    InsufficientResource {
        kind: Consumable,
        needed: f32,
        available: f32,
    },
    #[error("{kind:?} would exceed capacity {capacity:.2} (have {current:.2}, adding {requested:.2})")]
    OverCapacity {
        kind: Consumable,
        current: f32,
        requested: f32,
        capacity: f32,
    },
    #[error("{generator:?} ceiling of {ceiling}W reached (installed {installed}W, adding {requested}W)")]
    CapacityExceeded {
        generator: Generator,
        installed: u32,
        requested: u32,
        ceiling: u32,
    },
    #[error("EV battery too low: need {needed_pct:.1}%, have {available_pct:.1}%")]
    InsufficientCharge { needed_pct: f32, available_pct: f32 },
    #[error("storage full: {used}/{max} slots, item needs {needed}")]
    StorageFull { used: u32, max: u32, needed: u32 },
    #[error("not enough energy: need {needed:.1}, have {available:.1}")]
    InsufficientEnergy { needed: f32, available: f32 },
    #[error("not enough health: need {needed:.1}, have {available:.1}")]
    InsufficientHealth { needed: f32, available: f32 },
    #[error("not enough cash: need {needed_cents}c, have {available_cents}c")]
    InsufficientFunds {
        needed_cents: i64,
        available_cents: i64,
    },
    #[error("not available here: {reason}")]
    LocationRestricted { reason: String },
    #[error("invalid action: {reason}")]
    InvalidAction { reason: String },
    #[error("the journey is over")]
    GameOver,
}

impl Rejection {
    pub(crate) fn location(reason: impl Into<String>) -> Self {
        Self::LocationRestricted {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAction {
            reason: reason.into(),
        }
    }

    pub(crate) const fn stat_floor(stat: Stat, needed: f32, available: f32) -> Self {
        match stat {
            Stat::Health => Self::InsufficientHealth { needed, available },
            _ => Self::InsufficientEnergy { needed, available },
        }
    }

    /// Stable key for renderers that look up their own message text.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::InsufficientResource { .. } => "reject.insufficient-resource",
            Self::OverCapacity { .. } => "reject.over-capacity",
            Self::CapacityExceeded { .. } => "reject.capacity-exceeded",
            Self::InsufficientCharge { .. } => "reject.insufficient-charge",
            Self::StorageFull { .. } => "reject.storage-full",
            Self::InsufficientEnergy { .. } => "reject.insufficient-energy",
            Self::InsufficientHealth { .. } => "reject.insufficient-health",
            Self::InsufficientFunds { .. } => "reject.insufficient-funds",
            Self::LocationRestricted { .. } => "reject.location-restricted",
            Self::InvalidAction { .. } => "reject.invalid-action",
            Self::GameOver => "reject.game-over",
        }
    }
}

/// Errors raised while loading or validating the static catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog is missing an entry for {0}")]
    MissingEntry(&'static str),
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: String,
        min: f32,
        max: f32,
        value: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_and_health_floors_map_to_distinct_rejections() {
        assert!(matches!(
            Rejection::stat_floor(Stat::Energy, 10.0, 5.0),
            Rejection::InsufficientEnergy { .. }
        ));
        assert!(matches!(
            Rejection::stat_floor(Stat::Health, 10.0, 5.0),
            Rejection::InsufficientHealth { .. }
        ));
    }

    #[test]
    fn rejection_keys_are_stable() {
        assert_eq!(Rejection::GameOver.key(), "reject.game-over");
        assert_eq!(
            Rejection::location("no store").key(),
            "reject.location-restricted"
        );
        let message = Rejection::invalid("unknown verb").to_string();
        assert!(message.contains("unknown verb"));
    }
}
