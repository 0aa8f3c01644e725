//! Job classes and their fixed perk tables.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Photographer,
    Mechanic,
    RemoteDev,
    TrailGuide,
    Artist,
}

impl JobKind {
    pub const ALL: [Self; 5] = [
        Self::Photographer,
        Self::Mechanic,
        Self::RemoteDev,
        Self::TrailGuide,
        Self::Artist,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photographer => "photographer",
            Self::Mechanic => "mechanic",
            Self::RemoteDev => "remote_dev",
            Self::TrailGuide => "trail_guide",
            Self::Artist => "artist",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|job| job.as_str() == needle)
            .ok_or(())
    }
}

/// Action that advances a job's quest counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestVerb {
    TakePhoto,
    Perform,
    GuideHike,
    GatherParts,
    /// WORK completed somewhere with signal.
    RemoteWork,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestItem {
    Drone,
    ToolChest,
    MeshRouter,
    GpsBeacon,
    TravelEasel,
}

impl QuestItem {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Drone => "quest.item.drone",
            Self::ToolChest => "quest.item.tool-chest",
            Self::MeshRouter => "quest.item.mesh-router",
            Self::GpsBeacon => "quest.item.gps-beacon",
            Self::TravelEasel => "quest.item.travel-easel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPerks {
    /// Probability of an epic moment on the job's signature action.
    #[serde(default)]
    pub epic_bonus: f32,
    /// Extra morale when camping dispersed.
    #[serde(default)]
    pub morale_bonus_dispersed: f32,
    /// Fractional discount on upgrades and devices.
    #[serde(default)]
    pub shop_discount: f32,
    /// Flat bonus for work done with signal.
    #[serde(default)]
    pub remote_income_cents: i64,
    #[serde(default = "JobPerks::default_mult")]
    pub hike_energy_mult: f32,
    #[serde(default)]
    pub hike_find_bonus: f32,
    /// Constant extra house draw while this job is carried.
    #[serde(default)]
    pub power_drain_amps: f32,
}

impl JobPerks {
    const fn default_mult() -> f32 {
        1.0
    }
}

impl Default for JobPerks {
    fn default() -> Self {
        Self {
            epic_bonus: 0.0,
            morale_bonus_dispersed: 0.0,
            shop_discount: 0.0,
            remote_income_cents: 0,
            hike_energy_mult: Self::default_mult(),
            hike_find_bonus: 0.0,
            power_drain_amps: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSpec {
    pub verb: QuestVerb,
    pub threshold: u32,
    pub item: QuestItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub kind: JobKind,
    pub label: String,
    pub work_rate_cents: i64,
    #[serde(default)]
    pub perks: JobPerks,
    pub quest: QuestSpec,
}

#[derive(Debug, Clone, Deserialize)]
struct JobNoId {
    label: String,
    work_rate_cents: i64,
    #[serde(default)]
    perks: JobPerks,
    quest: QuestSpec,
}

impl Job {
    fn with_kind(kind: JobKind, j: JobNoId) -> Self {
        Self {
            kind,
            label: j.label,
            work_rate_cents: j.work_rate_cents,
            perks: j.perks,
            quest: j.quest,
        }
    }

    /// The action on which this job's epic bonus is rolled, if any.
    #[must_use]
    pub fn signature_verb(&self) -> Option<QuestVerb> {
        (self.perks.epic_bonus > 0.0).then_some(self.quest.verb)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let checks = [
            ("epic_bonus", self.perks.epic_bonus, 0.0, 1.0),
            ("shop_discount", self.perks.shop_discount, 0.0, 0.9),
            ("hike_energy_mult", self.perks.hike_energy_mult, 0.1, 2.0),
            ("hike_find_bonus", self.perks.hike_find_bonus, 0.0, 0.9),
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

/// Static lookup of every job, loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JobTable(pub Vec<Job>);

impl JobTable {
    /// Load the job table from a JSON object keyed by job id.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed, a class is missing,
    /// or a perk is out of range.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let map: HashMap<String, JobNoId> = serde_json::from_str(json)?;
        let mut jobs = Vec::with_capacity(JobKind::ALL.len());
        for kind in JobKind::ALL {
            let raw = map
                .get(kind.as_str())
                .cloned()
                .ok_or(CatalogError::MissingEntry(kind.as_str()))?;
            let job = Job::with_kind(kind, raw);
            job.validate()?;
            jobs.push(job);
        }
        Ok(Self(jobs))
    }

    /// Embedded table, parsed once.
    ///
    #[must_use]
    pub fn embedded() -> &'static Self {
        static TABLE: OnceLock<JobTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            Self::from_json(include_str!("../data/jobs.json")).unwrap_or_else(|err| {
                log::error!("embedded job table rejected: {err}");
                Self::default()
            })
        })
    }

    #[must_use]
    pub fn get(&self, kind: JobKind) -> Option<&Job> {
        self.0.iter().find(|job| job.kind == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Job> {
        self.0.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a JobTable {
    type Item = &'a Job;
    type IntoIter = std::slice::Iter<'a, Job>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_matches_documented_perks() {
        let table = JobTable::embedded();
        assert_eq!(table.len(), 5);

        let guide = table.get(JobKind::TrailGuide).unwrap();
        assert!((guide.perks.hike_energy_mult - 0.8).abs() < f32::EPSILON);
        assert!((guide.perks.hike_find_bonus - 0.10).abs() < f32::EPSILON);

        let dev = table.get(JobKind::RemoteDev).unwrap();
        assert_eq!(dev.perks.remote_income_cents, 3_000);

        let photo = table.get(JobKind::Photographer).unwrap();
        assert!((photo.perks.epic_bonus - 0.25).abs() < f32::EPSILON);
        assert_eq!(photo.signature_verb(), Some(QuestVerb::TakePhoto));

        let mechanic = table.get(JobKind::Mechanic).unwrap();
        assert!((mechanic.perks.hike_energy_mult - 1.0).abs() < f32::EPSILON);
        assert!(mechanic.signature_verb().is_none());
    }

    #[test]
    fn quest_thresholds_are_three_or_four() {
        for job in JobTable::embedded() {
            assert!((3..=4).contains(&job.quest.threshold), "{}", job.kind);
        }
    }

    #[test]
    fn out_of_range_perk_is_rejected() {
        let json = include_str!("../data/jobs.json").replace("0.25", "1.25");
        let err = JobTable::from_json(&json).unwrap_err();
        assert!(matches!(err, CatalogError::RangeViolation { .. }));
    }

    #[test]
    fn into_iter_matches_iter() {
        let table = JobTable::embedded();
        let a: Vec<_> = table.iter().map(|j| j.kind).collect();
        let b: Vec<_> = table.into_iter().map(|j| j.kind).collect();
        assert_eq!(a, b);
        assert_eq!(a[0], JobKind::Photographer);
    }
}
