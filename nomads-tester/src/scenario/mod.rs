//! Named scripted runs the CLI can select with `--scenarios`.
use anyhow::{Result, ensure};
use nomads_game::electrical::PowerState;
use nomads_game::{Consumable, Device, GameState, JobKind, QuestItem, Rejection, VehicleKind};

use crate::logic::{RunSummary, ScriptPlan, Step, Stop};

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub key: &'static str,
    pub plan: ScriptPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, key: &'static str, plan: ScriptPlan) -> Self {
        Self {
            name: name.into(),
            key,
            plan,
        }
    }
}

const CATALOG: [(&str, &str); 9] = [
    ("smoke", "Photographer day out"),
    ("quest-mechanic", "Mechanic gathers parts until the tool chest drops"),
    ("quest-remote", "Remote dev works online until the mesh router drops"),
    ("photo-replay", "Photographer epics replay under a fixed seed"),
    ("power-outage", "Flat battery takes starlink offline, solar brings it back"),
    ("prius-range", "Prius range follows the tank"),
    ("night-camp", "Skoolie camps through a cold night on the diesel heater"),
    ("pet-routine", "Adopt a pet and run its care routine"),
    ("save-resume", "Mid-day checkpoint through file storage resumes identically"),
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.to_vec()
}

#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    CATALOG.iter().map(|(key, _)| (*key).to_string()).collect()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = name.trim().to_lowercase();
    let (key, description) = CATALOG.iter().find(|(k, _)| *k == key)?;
    let plan = match *key {
        "smoke" => day_out_plan().with_expectation(everything_accepted),
        "quest-mechanic" => mechanic_plan(),
        "quest-remote" => remote_plan(),
        "photo-replay" => photo_replay_plan(),
        "power-outage" => outage_plan(),
        "prius-range" => prius_plan(),
        "night-camp" => night_camp_plan(),
        "pet-routine" => pet_plan(),
        "save-resume" => day_out_plan()
            .with_checkpoint(2)
            .with_replay_check()
            .with_expectation(everything_accepted)
            .with_expectation(resumed_identically),
        _ => return None,
    };
    Some(TestScenario::new(*description, *key, plan))
}

fn repeat(stop: Stop, verb: &'static str, arg: &'static str, times: usize) -> Vec<Step> {
    vec![Step::at(stop, verb, arg); times]
}

// Plans ----------------------------------------------------------------------

fn day_out_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Van, JobKind::Photographer)
        .with_steps([
            Step::at(Stop::Backcountry, "READ", ""),
            Step::at(Stop::Backcountry, "TAKE PHOTO", ""),
            Step::at(Stop::Backcountry, "EAT", ""),
            Step::at(Stop::Backcountry, "HIKE", ""),
            Step::at(Stop::Backcountry, "WORK", "2"),
        ])
        .with_expectation(invariants_hold)
        .with_expectation(clock_moved_forward)
}

fn mechanic_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Van, JobKind::Mechanic)
        .with_steps(repeat(Stop::Backcountry, "GATHER PARTS", "", 6))
        .with_expectation(invariants_hold)
        .with_expectation(everything_accepted)
        .with_expectation(|summary: &RunSummary| granted_once(summary, QuestItem::ToolChest))
}

fn remote_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Van, JobKind::RemoteDev)
        .with_steps(repeat(Stop::Connected, "WORK", "2", 3))
        .with_expectation(invariants_hold)
        .with_expectation(everything_accepted)
        .with_expectation(|summary: &RunSummary| granted_once(summary, QuestItem::MeshRouter))
        .with_expectation(remote_bonus_paid)
}

fn photo_replay_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Van, JobKind::Photographer)
        .with_steps(repeat(Stop::Backcountry, "TAKE PHOTO", "", 5))
        .with_replay_check()
        .with_expectation(invariants_hold)
        .with_expectation(everything_accepted)
        .with_expectation(replay_matched)
        .with_expectation(|summary: &RunSummary| granted_once(summary, QuestItem::Drone))
}

fn outage_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Van, JobKind::RemoteDev)
        .with_setup(dying_battery_with_dish)
        .with_steps([
            Step::at(Stop::Backcountry, "READ", ""),
            Step::at(Stop::Town, "BUY", "solar 4"),
            Step::at(Stop::Backcountry, "READ", ""),
        ])
        .with_expectation(invariants_hold)
        .with_expectation(everything_accepted)
        .with_expectation(outage_then_recovery)
}

fn prius_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Prius, JobKind::Artist)
        .with_setup(two_gallons_left)
        .with_steps([
            Step::at(Stop::Backcountry, "DRIVE", "100"),
            Step::at(Stop::Backcountry, "DRIVE", "60"),
        ])
        .with_expectation(invariants_hold)
        .with_expectation(range_limited_by_tank)
}

fn night_camp_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Skoolie, JobKind::TrailGuide)
        .with_steps([
            Step::at(Stop::Town, "BUY", "heater"),
            Step::at(Stop::Town, "BUY", "diesel 5"),
            Step::at(Stop::Town, "TOGGLE", "heater on"),
            Step::at(Stop::Cold, "WORK", "6"),
            Step::at(Stop::Cold, "READ", ""),
            Step::at(Stop::Cold, "CAMP", "dispersed"),
        ])
        .with_expectation(invariants_hold)
        .with_expectation(everything_accepted)
        .with_expectation(woke_at_dawn_with_diesel_burned)
}

fn pet_plan() -> ScriptPlan {
    ScriptPlan::new(VehicleKind::Van, JobKind::Artist)
        .with_steps([
            Step::at(Stop::Shelter, "ADOPT PET", ""),
            Step::at(Stop::Shelter, "FEED PET", ""),
            Step::at(Stop::Shelter, "WATER PET", ""),
            Step::at(Stop::Shelter, "WALK PET", ""),
            Step::at(Stop::Shelter, "PLAY WITH PET", ""),
            Step::at(Stop::Shelter, "COMMAND PET", "GUARD"),
        ])
        .with_expectation(invariants_hold)
        .with_expectation(everything_accepted)
        .with_expectation(pet_on_guard)
}

// Setups ---------------------------------------------------------------------

fn dying_battery_with_dish(state: &mut GameState) {
    state.cash_cents = 1_000_000;
    state.power.house_charge_ah = 0.5;
    let devices = &mut state.inventory.devices;
    if devices.install(Device::Starlink).is_ok() {
        let _ = devices.set_switch(Device::Starlink, true);
    }
}

fn two_gallons_left(state: &mut GameState) {
    let tank = state.vehicle.spec.tank_gal;
    state.inventory.supplies = state
        .inventory
        .supplies
        .clone()
        .with_stock(Consumable::Fuel, 2.0, tank);
}

// Expectations ---------------------------------------------------------------

fn invariants_hold(summary: &RunSummary) -> Result<()> {
    let state = &summary.final_state;
    for stat in nomads_game::Stat::ALL {
        let value = state.stats.get(stat);
        ensure!(
            (0.0..=100.0).contains(&value),
            "{stat} out of bounds: {value}"
        );
    }
    for (kind, stock) in state.supplies().iter() {
        ensure!(
            stock.quantity >= 0.0 && stock.quantity <= stock.capacity + 1e-4,
            "{kind} stock out of bounds: {} of {}",
            stock.quantity,
            stock.capacity
        );
    }
    ensure!(state.cash_cents >= 0, "cash went negative: {}", state.cash_cents);
    Ok(())
}

fn everything_accepted(summary: &RunSummary) -> Result<()> {
    if let Some(turn) = summary.turns.iter().find(|turn| !turn.accepted()) {
        anyhow::bail!(
            "{} was rejected: {}",
            turn.command,
            turn.rejection.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

fn clock_moved_forward(summary: &RunSummary) -> Result<()> {
    let spent: u32 = summary.turns.iter().map(|turn| turn.minutes).sum();
    ensure!(spent > 0, "no time passed");
    ensure!(
        summary.final_state.clock.minutes >= spent,
        "clock at {} after {spent} minutes of actions",
        summary.final_state.clock.minutes
    );
    Ok(())
}

fn granted_once(summary: &RunSummary, item: QuestItem) -> Result<()> {
    let grants = summary.grants();
    ensure!(
        grants == [item],
        "expected exactly one {item:?} grant, saw {grants:?}"
    );
    ensure!(
        summary.final_state.inventory.quest_items.contains(&item),
        "{item:?} missing from inventory"
    );
    Ok(())
}

fn remote_bonus_paid(summary: &RunSummary) -> Result<()> {
    let job = &summary.final_state.job;
    let base = job.work_rate_cents * 2;
    let first = summary
        .turns
        .first()
        .map_or(0, |turn| turn.cash_delta_cents);
    ensure!(
        first == base + job.perks.remote_income_cents,
        "first shift paid {first}, expected base {base} plus the remote bonus"
    );
    Ok(())
}

fn replay_matched(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.replay_matched == Some(true),
        "replay under seed {} diverged",
        summary.seed
    );
    Ok(())
}

fn resumed_identically(summary: &RunSummary) -> Result<()> {
    ensure!(summary.resumed_from_save, "checkpoint never taken");
    replay_matched(summary)
}

fn outage_then_recovery(summary: &RunSummary) -> Result<()> {
    let went_dark = summary.turns.first().is_some_and(|turn| {
        turn.outcome
            .power_transitions
            .iter()
            .any(|t| t.to == PowerState::Offline)
    });
    ensure!(went_dark, "battery never went offline");
    let state = &summary.final_state;
    ensure!(
        state.power.state == PowerState::Online,
        "power still {:?}",
        state.power.state
    );
    ensure!(
        state.is_running(Device::Starlink),
        "starlink did not come back"
    );
    Ok(())
}

fn range_limited_by_tank(summary: &RunSummary) -> Result<()> {
    let [too_far, in_range] = summary.turns.as_slice() else {
        anyhow::bail!("expected two drives, saw {}", summary.turns.len());
    };
    ensure!(
        matches!(
            too_far.outcome.rejection,
            Some(Rejection::InsufficientResource {
                kind: Consumable::Fuel,
                ..
            })
        ),
        "100 miles on 2 gallons was not refused: {:?}",
        too_far.rejection
    );
    ensure!(
        in_range.accepted(),
        "60 miles refused: {:?}",
        in_range.rejection
    );
    let odometer = summary.final_state.vehicle.odometer_miles;
    ensure!(
        (odometer - 60.0).abs() < 1e-3,
        "odometer reads {odometer}"
    );
    Ok(())
}

fn woke_at_dawn_with_diesel_burned(summary: &RunSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.clock.day() == 2 && state.clock.minute_of_day() == 6 * 60,
        "camp ended on day {} at minute {}",
        state.clock.day(),
        state.clock.minute_of_day()
    );
    let diesel = state.supplies().quantity(Consumable::Diesel);
    ensure!(diesel < 5.0, "heater never burned diesel ({diesel} gal left)");
    Ok(())
}

fn pet_on_guard(summary: &RunSummary) -> Result<()> {
    let pet = summary
        .final_state
        .pet
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no pet after adoption"))?;
    ensure!(pet.guard_mode, "{} is not on guard", pet.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GameTester;

    fn run(key: &str, seed: u64) -> Result<RunSummary> {
        let scenario = get_scenario(key).expect("scenario exists");
        let tester = GameTester::new(false).with_save_dir(std::env::temp_dir().join(format!(
            "nomads-scenario-{key}-{seed}-{}",
            std::process::id()
        )));
        let summary = tester.run_plan(&scenario.plan, seed)?;
        for expectation in &scenario.plan.expectations {
            expectation.evaluate(&summary)?;
        }
        Ok(summary)
    }

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.key, key);
            assert_eq!(scenario.name, description);
        }
        assert!(get_scenario("SMOKE").is_some());
        assert!(get_scenario("boss-fight").is_none());
        assert_eq!(all_scenario_keys().len(), list_scenarios().len());
    }

    #[test]
    fn catalog_passes_on_fixed_seeds() {
        for key in all_scenario_keys() {
            for seed in [1, 1337] {
                if let Err(err) = run(&key, seed) {
                    panic!("{key} failed on seed {seed}: {err:#}");
                }
            }
        }
    }

    #[test]
    fn expectations_catch_rejections() {
        let summary = run("prius-range", 3).unwrap();
        assert!(everything_accepted(&summary).is_err());
        assert!(range_limited_by_tank(&summary).is_ok());
    }
}
