//! Simulated time, counted in minutes since the journey began.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DAY_MINUTES, DAYLIGHT_END, DAYLIGHT_START, START_MINUTE, TURN_MINUTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Clock {
    pub minutes: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            minutes: START_MINUTE,
        }
    }
}

impl Clock {
    /// 1-based day number.
    #[must_use]
    pub const fn day(self) -> u32 {
        self.minutes / DAY_MINUTES + 1
    }

    #[must_use]
    pub const fn minute_of_day(self) -> u32 {
        self.minutes % DAY_MINUTES
    }

    #[must_use]
    pub const fn is_daylight(self) -> bool {
        let m = self.minute_of_day();
        m >= DAYLIGHT_START && m < DAYLIGHT_END
    }

    /// Minutes until the next 06:00, or until today's 06:00 when it is
    /// still before dawn.
    #[must_use]
    pub const fn minutes_until_dawn(self) -> u32 {
        let now = self.minute_of_day();
        if now <= DAYLIGHT_START {
            DAYLIGHT_START - now
        } else {
            DAY_MINUTES - now + DAYLIGHT_START
        }
    }

    pub const fn advance_turn(&mut self) {
        self.minutes = self.minutes.saturating_add(TURN_MINUTES);
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minute_of_day();
        write!(f, "Day {} {:02}:{:02}", self.day(), m / 60, m % 60)
    }
}

/// Number of whole turns needed to cover `minutes`, rounding up.
#[must_use]
pub const fn turns_for(minutes: u32) -> u32 {
    minutes.div_ceil(TURN_MINUTES)
}
