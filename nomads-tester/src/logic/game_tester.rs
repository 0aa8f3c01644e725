use anyhow::{Context, Result};
use log::debug;
use nomads_game::{
    EmbeddedLoader, EnvironmentSnapshot, Facilities, GameEngine, GameState, JobKind, NewGame, Session,
    VehicleKind, encode_friendly,
};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::FileStorage;

/// Where a scripted step takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// Full-service town with signal.
    Town,
    /// Trailhead with no services and no bars.
    Backcountry,
    /// Backcountry with a cell tower in range.
    Connected,
    /// Freezing backcountry night.
    Cold,
    /// Town stop with an animal shelter.
    Shelter,
}

impl Stop {
    #[must_use]
    pub fn environment(self) -> EnvironmentSnapshot {
        match self {
            Self::Town => EnvironmentSnapshot::town("flagstaff"),
            Self::Backcountry => EnvironmentSnapshot::backcountry("san-rafael-swell"),
            Self::Connected => EnvironmentSnapshot::backcountry("moab-rim").with_signal(true),
            Self::Cold => {
                EnvironmentSnapshot::backcountry("kaibab").with_weather(nomads_game::Weather {
                    heat: nomads_game::HeatBand::Cold,
                    ..nomads_game::Weather::default()
                })
            }
            Self::Shelter => EnvironmentSnapshot::town("page").with_facilities(Facilities {
                pet_adoption: true,
                ..Facilities::town()
            }),
        }
    }
}

/// One dispatcher command issued at a stop.
#[derive(Debug, Clone)]
pub struct Step {
    pub verb: &'static str,
    pub arg: &'static str,
    pub stop: Stop,
}

impl Step {
    #[must_use]
    pub const fn at(stop: Stop, verb: &'static str, arg: &'static str) -> Self {
        Self { verb, arg, stop }
    }
}

type ExpectationFn = dyn Fn(&RunSummary) -> Result<()> + Send + Sync;

#[derive(Clone)]
pub struct Expectation(Arc<ExpectationFn>);

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation").finish()
    }
}

impl Expectation {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RunSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Returns the expectation's failure.
    pub fn evaluate(&self, summary: &RunSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for Expectation
where
    F: Fn(&RunSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// A scripted run: character choices, optional state tweaks, commands, checks.
#[derive(Debug, Clone)]
pub struct ScriptPlan {
    pub vehicle: VehicleKind,
    pub job: JobKind,
    pub setup: Option<fn(&mut GameState)>,
    pub steps: Vec<Step>,
    /// Save and reload through file storage after this many steps.
    pub checkpoint_after: Option<usize>,
    /// Run the script a second time and require an identical final state.
    pub verify_replay: bool,
    pub expectations: Vec<Expectation>,
}

impl ScriptPlan {
    #[must_use]
    pub const fn new(vehicle: VehicleKind, job: JobKind) -> Self {
        Self {
            vehicle,
            job,
            setup: None,
            steps: Vec::new(),
            checkpoint_after: None,
            verify_replay: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_setup(mut self, setup: fn(&mut GameState)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    #[must_use]
    pub const fn with_checkpoint(mut self, after: usize) -> Self {
        self.checkpoint_after = Some(after);
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.verify_replay = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<Expectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// What one command did, flattened for reports.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub command: String,
    pub rejection: Option<String>,
    pub minutes: u32,
    pub cash_delta_cents: i64,
    pub quest_grant: Option<nomads_game::QuestItem>,
    pub outcome: nomads_game::ActionOutcome,
}

impl TurnRecord {
    #[must_use]
    pub const fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub share_code: String,
    pub turns: Vec<TurnRecord>,
    pub final_state: GameState,
    pub resumed_from_save: bool,
    pub replay_matched: Option<bool>,
}

impl RunSummary {
    #[must_use]
    pub fn rejections(&self) -> usize {
        self.turns.iter().filter(|turn| !turn.accepted()).count()
    }

    #[must_use]
    pub fn grants(&self) -> Vec<nomads_game::QuestItem> {
        self.turns.iter().filter_map(|turn| turn.quest_grant).collect()
    }
}

/// Drives the core through scripted plans.
#[derive(Debug, Clone)]
pub struct GameTester {
    verbose: bool,
    save_dir: PathBuf,
}

impl GameTester {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            save_dir: std::env::temp_dir().join("nomads-tester-saves"),
        }
    }

    #[must_use]
    pub fn with_save_dir(mut self, save_dir: PathBuf) -> Self {
        self.save_dir = save_dir;
        self
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// # Errors
    ///
    /// Fails when the game cannot be created or a checkpoint cannot be
    /// written or read back.
    pub fn run_plan(&self, plan: &ScriptPlan, seed: u64) -> Result<RunSummary> {
        let mut summary = self.execute(plan, seed, plan.checkpoint_after)?;
        if plan.verify_replay {
            let replay = self.execute(plan, seed, None)?;
            summary.replay_matched = Some(replay.final_state == summary.final_state);
        }
        Ok(summary)
    }

    fn execute(
        &self,
        plan: &ScriptPlan,
        seed: u64,
        checkpoint_after: Option<usize>,
    ) -> Result<RunSummary> {
        let engine = GameEngine::new(EmbeddedLoader, FileStorage::new(&self.save_dir));
        let mut state = engine.create_game(&NewGame {
            player_name: "Tester".to_string(),
            vehicle: plan.vehicle,
            job: plan.job,
            seed,
            ..NewGame::default()
        })?;
        if let Some(setup) = plan.setup {
            setup(&mut state);
        }
        log_initial_state(seed, plan, &state);

        let mut session = Session::new(state);
        let mut turns = Vec::with_capacity(plan.steps.len());
        let mut resumed_from_save = false;

        for (index, step) in plan.steps.iter().enumerate() {
            if checkpoint_after == Some(index) {
                let slot = format!("seed-{seed}-step-{index}");
                engine
                    .save_game(&slot, session.state())
                    .with_context(|| format!("saving checkpoint {slot}"))?;
                let loaded = engine
                    .load_game(&slot)
                    .with_context(|| format!("loading checkpoint {slot}"))?
                    .with_context(|| format!("checkpoint {slot} vanished"))?;
                engine
                    .delete_save(&slot)
                    .with_context(|| format!("deleting checkpoint {slot}"))?;
                session = Session::new(loaded);
                resumed_from_save = true;
            }

            let env = step.stop.environment();
            let outcome = session.apply_command(step.verb, step.arg, &env);
            let record = TurnRecord {
                command: format!("{} {}", step.verb, step.arg).trim().to_string(),
                rejection: outcome.rejection.as_ref().map(ToString::to_string),
                minutes: outcome.minutes,
                cash_delta_cents: outcome.cash_delta_cents,
                quest_grant: outcome.quest_grant,
                outcome,
            };
            if self.verbose {
                log_turn(&record, session.state());
            }
            turns.push(record);
        }

        Ok(RunSummary {
            seed,
            share_code: encode_friendly(seed),
            turns,
            final_state: session.into_state(),
            resumed_from_save,
            replay_matched: None,
        })
    }
}

fn log_initial_state(seed: u64, plan: &ScriptPlan, state: &GameState) {
    debug!(
        "seed {seed} ({}) {} {} cash {} energy {:.1}",
        encode_friendly(seed),
        plan.vehicle,
        plan.job,
        format_cents(state.cash_cents),
        state.stats.energy
    );
}

fn log_turn(record: &TurnRecord, state: &GameState) {
    let status = record
        .rejection
        .as_deref()
        .map_or_else(|| "ok".to_string(), |reason| format!("rejected: {reason}"));
    println!(
        "     ↳ {:<20} {:>4} min {:>9} | day {} {:02}:{:02} | energy {:.1} morale {:.1} health {:.1} | {status}",
        record.command,
        record.minutes,
        format_cents(record.cash_delta_cents),
        state.clock.day(),
        state.clock.minute_of_day() / 60,
        state.clock.minute_of_day() % 60,
        state.stats.energy,
        state.stats.morale,
        state.stats.health,
    );
}

#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "nomads-tester-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn day_plan() -> ScriptPlan {
        ScriptPlan::new(VehicleKind::Van, JobKind::Photographer).with_steps([
            Step::at(Stop::Backcountry, "READ", ""),
            Step::at(Stop::Backcountry, "TAKE PHOTO", ""),
            Step::at(Stop::Backcountry, "EAT", ""),
            Step::at(Stop::Backcountry, "HIKE", ""),
        ])
    }

    #[test]
    fn format_cents_handles_signs() {
        assert_eq!(format_cents(123_456), "$1234.56");
        assert_eq!(format_cents(-5), "-$0.05");
        assert_eq!(format_cents(0), "$0.00");
    }

    #[test]
    fn run_plan_records_every_step() {
        let tester = GameTester::new(false).with_save_dir(scratch_dir("record"));
        let summary = tester.run_plan(&day_plan(), 42).unwrap();
        assert_eq!(summary.turns.len(), 4);
        assert_eq!(summary.rejections(), 0);
        assert_eq!(summary.share_code, encode_friendly(42));
        assert_eq!(summary.final_state.actions_taken, 4);
        assert!(!summary.resumed_from_save);
        assert!(summary.replay_matched.is_none());
    }

    #[test]
    fn checkpoint_resume_matches_straight_run() {
        let tester = GameTester::new(false).with_save_dir(scratch_dir("checkpoint"));
        let plan = day_plan().with_checkpoint(2).with_replay_check();
        let summary = tester.run_plan(&plan, 7).unwrap();
        assert!(summary.resumed_from_save);
        assert_eq!(summary.replay_matched, Some(true));
    }

    #[test]
    fn setup_runs_before_the_first_step() {
        let tester = GameTester::new(false).with_save_dir(scratch_dir("setup"));
        let plan = ScriptPlan::new(VehicleKind::Van, JobKind::Mechanic)
            .with_setup(|state| state.stats.energy = 5.0)
            .with_steps([Step::at(Stop::Backcountry, "HIKE", "")]);
        let summary = tester.run_plan(&plan, 1).unwrap();
        assert_eq!(summary.rejections(), 1);
    }
}
