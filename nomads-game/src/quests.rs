//! Experience, levels and the per-job quest state machine.
use serde::{Deserialize, Serialize};

use crate::constants::{QUEST_INCOME_MULTIPLIER, XP_PER_LEVEL};
use crate::jobs::{QuestItem, QuestSpec};

/// Forward-only quest lifecycle. `ItemGranted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuestStatus {
    #[default]
    NotStarted,
    InProgress {
        count: u32,
    },
    Completed,
    ItemGranted,
}

impl QuestStatus {
    #[must_use]
    pub const fn count(self, threshold: u32) -> u32 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress { count } => count,
            Self::Completed | Self::ItemGranted => threshold,
        }
    }

    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::ItemGranted)
    }
}

/// What a qualifying action did to the quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestStep {
    Advanced { count: u32, threshold: u32 },
    Granted(QuestItem),
    /// Already granted; nothing changes.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub xp: u32,
    pub level: u32,
    pub quest: QuestSpec,
    #[serde(default)]
    pub status: QuestStatus,
}

impl Progress {
    #[must_use]
    pub fn new(quest: QuestSpec) -> Self {
        Self {
            xp: 0,
            level: 1,
            quest,
            status: QuestStatus::NotStarted,
        }
    }

    /// Add experience and return the number of levels gained.
    pub fn gain_xp(&mut self, xp: u32) -> u32 {
        self.xp = self.xp.saturating_add(xp);
        let level = self.xp / XP_PER_LEVEL + 1;
        let gained = level.saturating_sub(self.level);
        self.level = level.max(self.level);
        gained
    }

    /// Count one qualifying action. Crossing the threshold moves the quest
    /// through `Completed` into `ItemGranted` in the same step.
    pub fn record_qualifying(&mut self) -> QuestStep {
        let threshold = self.quest.threshold.max(1);
        let next = match self.status {
            QuestStatus::ItemGranted => return QuestStep::Ignored,
            QuestStatus::Completed => QuestStatus::Completed,
            QuestStatus::NotStarted => QuestStatus::InProgress { count: 1 },
            QuestStatus::InProgress { count } => QuestStatus::InProgress {
                count: count.saturating_add(1),
            },
        };
        self.status = match next {
            QuestStatus::InProgress { count } if count >= threshold => QuestStatus::Completed,
            other => other,
        };
        match self.status {
            QuestStatus::Completed => self.grant().map_or(QuestStep::Ignored, QuestStep::Granted),
            QuestStatus::InProgress { count } => QuestStep::Advanced { count, threshold },
            QuestStatus::NotStarted | QuestStatus::ItemGranted => QuestStep::Ignored,
        }
    }

    /// `Completed -> ItemGranted`. Returns the item only on that transition.
    pub fn grant(&mut self) -> Option<QuestItem> {
        if self.status == QuestStatus::Completed {
            self.status = QuestStatus::ItemGranted;
            Some(self.quest.item)
        } else {
            None
        }
    }

    /// Income multiplier earned by the quest item; applies once, never stacks.
    #[must_use]
    pub const fn income_multiplier(&self) -> f64 {
        if self.status.is_granted() {
            QUEST_INCOME_MULTIPLIER
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::QuestVerb;

    fn photo_quest() -> Progress {
        Progress::new(QuestSpec {
            verb: QuestVerb::TakePhoto,
            threshold: 4,
            item: QuestItem::Drone,
        })
    }

    #[test]
    fn item_granted_exactly_once() {
        let mut progress = photo_quest();
        let mut grants = 0;
        for n in 1..=10 {
            match progress.record_qualifying() {
                QuestStep::Granted(item) => {
                    assert_eq!(n, 4);
                    assert_eq!(item, QuestItem::Drone);
                    grants += 1;
                }
                QuestStep::Advanced { count, threshold } => {
                    assert_eq!(count, n);
                    assert_eq!(threshold, 4);
                }
                QuestStep::Ignored => assert!(n > 4),
            }
            assert_eq!(progress.status.is_granted(), n >= 4);
        }
        assert_eq!(grants, 1);
        assert!((progress.income_multiplier() - 1.10).abs() < f64::EPSILON);
    }

    #[test]
    fn grant_requires_completion() {
        let mut progress = photo_quest();
        assert!(progress.grant().is_none());
        progress.status = QuestStatus::Completed;
        assert_eq!(progress.grant(), Some(QuestItem::Drone));
        assert!(progress.grant().is_none());
    }

    #[test]
    fn levels_follow_xp() {
        let mut progress = photo_quest();
        assert_eq!(progress.gain_xp(99), 0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.gain_xp(1), 1);
        assert_eq!(progress.gain_xp(250), 2);
        assert_eq!(progress.level, 4);
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_string(&QuestStatus::InProgress { count: 2 }).unwrap();
        assert_eq!(json, r#"{"status":"in_progress","count":2}"#);
        assert_eq!(QuestStatus::Completed.count(3), 3);
    }
}
