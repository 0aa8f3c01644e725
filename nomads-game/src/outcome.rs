//! Structured result of resolving one action.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::content::FlavorPayload;
use crate::electrical::PowerTransition;
use crate::error::Rejection;
use crate::jobs::QuestItem;
use crate::resources::{Consumable, ResourceDelta};
use crate::stats::{Stat, StatDelta};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActionOutcome {
    pub verb: String,
    /// Simulated minutes the action took.
    pub minutes: u32,
    /// Energy the action itself cost, after job multipliers and before
    /// passive drain.
    pub energy_cost: f32,
    pub stat_deltas: SmallVec<[StatDelta; 6]>,
    pub resource_deltas: SmallVec<[ResourceDelta; 4]>,
    pub cash_delta_cents: i64,
    pub rejection: Option<Rejection>,
    /// Quest counter after this action, when it qualified.
    pub quest_count: Option<u32>,
    pub quest_grant: Option<QuestItem>,
    pub epic: bool,
    pub discovery: bool,
    pub flavor: Option<FlavorPayload>,
    pub power_transitions: SmallVec<[PowerTransition; 2]>,
    pub levels_gained: u32,
    /// Morale or energy bottomed out; the renderer should nudge toward rest.
    pub rest_suggested: bool,
    pub game_over: bool,
    /// Stable keys for renderer-side narration.
    pub events: Vec<String>,
}

impl ActionOutcome {
    #[must_use]
    pub fn new(verb: &str) -> Self {
        Self {
            verb: verb.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rejected(verb: &str, rejection: Rejection) -> Self {
        Self {
            rejection: Some(rejection),
            ..Self::new(verb)
        }
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    /// Net change applied to `stat`, zero when it did not move.
    #[must_use]
    pub fn stat_change(&self, stat: Stat) -> f32 {
        self.stat_deltas
            .iter()
            .find(|delta| delta.stat == stat)
            .map_or(0.0, StatDelta::change)
    }

    /// Net signed movement of `kind`, zero when untouched.
    #[must_use]
    pub fn resource_change(&self, kind: Consumable) -> f32 {
        self.resource_deltas
            .iter()
            .find(|delta| delta.kind == kind)
            .map_or(0.0, |delta| delta.amount)
    }

    pub(crate) fn note(&mut self, key: &str) {
        self.events.push(key.to_string());
    }
}
