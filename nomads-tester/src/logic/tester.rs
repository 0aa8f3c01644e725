use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::game_tester::{GameTester, RunSummary, ScriptPlan};
use crate::logic::seeds::SeedInfo;
use crate::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub share_code: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    game_tester: GameTester,
}

impl LogicTester {
    pub const fn new(game_tester: GameTester) -> Self {
        Self { game_tester }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for seed in seeds {
            if self.game_tester.verbose() {
                println!(
                    "🧪 Testing scenario: {} [{}] ({} {}, seed: {} / {})",
                    scenario.name.bright_white(),
                    scenario.key,
                    scenario.plan.vehicle,
                    scenario.plan.job,
                    seed.seed,
                    seed.share_code()
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let (successes, failures, performance_data) =
            self.run_iterations(&scenario.plan, seed.seed, iterations);

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed: seed.seed,
            share_code: seed.share_code(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }

    fn run_iterations(
        &self,
        plan: &ScriptPlan,
        seed: u64,
        iterations: usize,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let verbose = self.game_tester.verbose();
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let verdict = self
                .game_tester
                .run_plan(plan, iteration_seed)
                .map_err(|err| (format!("{err:#}"), None))
                .and_then(|summary| match evaluate_expectations(plan, &summary) {
                    Some(err) => Err((err, Some(summary))),
                    None => Ok(summary),
                });

            match verdict {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) code:{} turns:{} rejected:{} cash:{}",
                            i + 1,
                            iterations,
                            summary.share_code,
                            summary.turns.len(),
                            summary.rejections(),
                            summary.final_state.cash_cents
                        );
                    }
                }
                Err((err, summary)) => {
                    let context = summary
                        .as_ref()
                        .map_or_else(|| "run aborted".to_string(), summarize_turns);
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): {err} | {context}",
                        i + 1
                    ));
                    if verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            err.red()
                        );
                        println!("     ↳ {context}");
                    }
                }
            }
        }

        (successes, failures, performance_data)
    }
}

fn evaluate_expectations(plan: &ScriptPlan, summary: &RunSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation.evaluate(summary) {
            return Some(err.to_string());
        }
    }
    None
}

fn summarize_turns(summary: &RunSummary) -> String {
    if summary.turns.is_empty() {
        return "no commands issued".to_string();
    }

    let stats = &summary.final_state.stats;
    let tail = summary
        .turns
        .iter()
        .rev()
        .take(3)
        .map(|turn| {
            let status = turn.rejection.as_deref().unwrap_or("ok");
            format!("{} [{status}]", turn.command)
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "{tail} | final energy {:.1} morale {:.1} health {:.1}",
        stats.energy, stats.morale, stats.health
    )
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
