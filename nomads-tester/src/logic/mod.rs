pub mod game_tester;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use game_tester::{GameTester, RunSummary, ScriptPlan, Step, Stop};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use tester::*;
