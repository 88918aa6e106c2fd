//! Shared fixtures for the Maple Evolve integration tests.

use async_trait::async_trait;
use maple_evolve_engine::{
    EngineResult, GenerationController, Proposer, RunConfig, ScriptedProposer,
};
use maple_evolve_evaluator::{
    CaseOutput, Evaluator, ExecutionOutcome, SimulatedSandbox, TestSuite, TestSuiteEvaluator,
};
use maple_evolve_store::{ProgramDatabase, SnapshotPersistence, StoreResult};
use maple_evolve_types::ScoreMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const SEED_PROGRAM: &str = "def solve():\n    pass";
pub const RETURN_ONE_PATCH: &str = "<<<<<<< SEARCH\npass\n=======\nreturn 1\n>>>>>>> REPLACE";
pub const UNMATCHED_PATCH: &str =
    "<<<<<<< SEARCH\nreturn 42\n=======\nreturn 43\n>>>>>>> REPLACE";

/// Metric written by [`MarkerEvaluator`].
pub const MARKER: &str = "marker";

/// The integer literal after the first `return`, if any.
pub fn returned_literal(code: &str) -> Option<i64> {
    code.lines()
        .find_map(|line| line.trim().strip_prefix("return ")?.trim().parse().ok())
}

/// Patch turning the seed's `pass` into `return <n>`.
pub fn return_patch(n: usize) -> String {
    format!("<<<<<<< SEARCH\npass\n=======\nreturn {}\n>>>>>>> REPLACE", n)
}

/// `solve()` must return 1.
pub fn solve_suite() -> TestSuite {
    TestSuite::new("solve").with_case(vec![], Value::from(1))
}

/// Sandbox that "runs" `solve()` by reading its returned literal.
pub fn literal_sandbox() -> SimulatedSandbox {
    SimulatedSandbox::from_fn(|code, inputs| {
        let output = returned_literal(code).map(Value::from).unwrap_or(Value::Null);
        ExecutionOutcome::Completed {
            cases: inputs
                .iter()
                .map(|_| CaseOutput::returned(output.clone(), 0.001))
                .collect(),
            elapsed: Duration::from_millis(1),
        }
    })
}

pub fn solve_evaluator() -> TestSuiteEvaluator<SimulatedSandbox> {
    TestSuiteEvaluator::new(solve_suite(), literal_sandbox())
}

/// True when a `python3` interpreter can be launched on this machine.
pub fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

pub fn seeded_database(
    persistence: impl SnapshotPersistence + 'static,
) -> StoreResult<ProgramDatabase> {
    ProgramDatabase::open_or_seed(persistence, Some("Return one.".into()), SEED_PROGRAM)
}

pub fn controller(
    config: RunConfig,
    database: ProgramDatabase,
    proposer: impl Proposer + 'static,
    evaluator: impl Evaluator + 'static,
) -> EngineResult<GenerationController> {
    GenerationController::new(config, database, Arc::new(proposer), Arc::new(evaluator))
}

/// Proposer whose `n`-th call answers `return_patch(n)`.
pub fn numbering_proposer() -> ScriptedProposer {
    ScriptedProposer::from_fn(|call, _, _| Ok(return_patch(call)))
}

/// Scores a candidate with the literal it returns, finishing later for
/// smaller literals so completion order is the reverse of submission.
pub struct MarkerEvaluator {
    unit: Duration,
    span: i64,
}

impl MarkerEvaluator {
    pub fn new(unit: Duration, span: i64) -> Self {
        Self { unit, span }
    }
}

#[async_trait]
impl Evaluator for MarkerEvaluator {
    async fn evaluate(&self, code: &str) -> ScoreMap {
        let Some(marker) = returned_literal(code) else {
            return self.failure_score("no marker");
        };
        let wait = (self.span - marker).max(0) as u32;
        tokio::time::sleep(self.unit * wait).await;
        ScoreMap::new().with_metric(MARKER, marker as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_parsing() {
        assert_eq!(returned_literal("def solve():\n    return 7"), Some(7));
        assert_eq!(returned_literal(SEED_PROGRAM), None);
        assert_eq!(returned_literal("return x"), None);
    }
}
