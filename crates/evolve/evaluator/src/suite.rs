use crate::evaluator::Evaluator;
use crate::sandbox::{CaseOutput, ExecutionOutcome, Sandbox};
use async_trait::async_trait;
use maple_evolve_types::{metrics, ScoreMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const FAILED_AVERAGE_TIME: f64 = 10.0;
const FAILED_WORST_TIME: f64 = 100.0;
/// Resource usage is not sampled; every score reports this ceiling.
const RESOURCE_CEILING: f64 = 100.0;

/// One call of the entry point and its expected result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub args: Vec<Value>,
    pub expected: Value,
}

impl TestCase {
    pub fn new(args: Vec<Value>, expected: Value) -> Self {
        Self { args, expected }
    }
}

/// A named entry point and the cases it must satisfy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub entrypoint: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            cases: Vec::new(),
        }
    }

    pub fn with_case(mut self, args: Vec<Value>, expected: Value) -> Self {
        self.cases.push(TestCase::new(args, expected));
        self
    }

    /// `fib(1) = 1`, `fib(3) = 2`, `fib(8) = 21`.
    pub fn fibonacci() -> Self {
        Self::new("fib")
            .with_case(vec![Value::from(1)], Value::from(1))
            .with_case(vec![Value::from(3)], Value::from(2))
            .with_case(vec![Value::from(8)], Value::from(21))
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// `fib(3)` style rendering of a call.
    pub fn describe_call(&self, case: &TestCase) -> String {
        let args: Vec<String> = case.args.iter().map(Value::to_string).collect();
        format!("{}({})", self.entrypoint, args.join(", "))
    }
}

/// Scores candidates by running a [`TestSuite`] inside a [`Sandbox`].
pub struct TestSuiteEvaluator<S> {
    suite: TestSuite,
    sandbox: S,
    timeout: Duration,
}

impl<S: Sandbox> TestSuiteEvaluator<S> {
    pub fn new(suite: TestSuite, sandbox: S) -> Self {
        Self {
            suite,
            sandbox,
            timeout: Duration::from_secs(10),
        }
    }

    /// Limit for one whole execution of the suite.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn suite(&self) -> &TestSuite {
        &self.suite
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    /// Turn a sandbox outcome into a score.
    pub fn score(&self, outcome: ExecutionOutcome) -> ScoreMap {
        match outcome {
            ExecutionOutcome::Completed { cases, .. } => self.score_cases(&cases),
            ExecutionOutcome::Failed { reason } => self.failure_score(&reason),
            ExecutionOutcome::TimedOut { limit } => {
                self.failure_score(&format!("timed out after {} ms", limit.as_millis()))
            }
        }
    }

    fn score_cases(&self, outputs: &[CaseOutput]) -> ScoreMap {
        let mut score = ScoreMap::new();
        let mut passed = 0usize;
        for (i, case) in self.suite.cases.iter().enumerate() {
            let call = self.suite.describe_call(case);
            match outputs.get(i) {
                None => score.push_log(format!("test_missing: {} produced no result", call)),
                Some(CaseOutput {
                    error: Some(error), ..
                }) => score.push_log(format!("test_error: {} raised {}", call, error)),
                Some(out) if values_match(&out.output, &case.expected) => passed += 1,
                Some(out) => score.push_log(format!(
                    "test_failure: {} returned {} instead of {}",
                    call, out.output, case.expected
                )),
            }
        }

        let times: Vec<f64> = outputs
            .iter()
            .take(self.suite.len())
            .map(|o| o.elapsed.max(0.0))
            .collect();
        let (average, worst) = if times.is_empty() {
            (0.0, 0.0)
        } else {
            let total: f64 = times.iter().sum();
            (total / times.len() as f64, times.iter().copied().fold(0.0, f64::max))
        };

        score.set(metrics::NUM_TESTS_PASSED, passed as f64);
        score.set(metrics::AVERAGE_TIME, average);
        score.set(metrics::WORST_TIME, worst);
        score.set(metrics::MEMORY_USAGE, RESOURCE_CEILING);
        score.set(metrics::CPU_USAGE, RESOURCE_CEILING);
        score
    }
}

#[async_trait]
impl<S: Sandbox> Evaluator for TestSuiteEvaluator<S> {
    #[instrument(skip_all, fields(entrypoint = %self.suite.entrypoint, code_len = code.len()))]
    async fn evaluate(&self, code: &str) -> ScoreMap {
        let inputs: Vec<Vec<Value>> = self.suite.cases.iter().map(|c| c.args.clone()).collect();
        let outcome = self
            .sandbox
            .execute(code, &self.suite.entrypoint, &inputs, self.timeout)
            .await;
        let score = self.score(outcome);
        debug!(
            passed = score.get(metrics::NUM_TESTS_PASSED).unwrap_or(0.0),
            "candidate scored"
        );
        score
    }

    fn failure_score(&self, reason: &str) -> ScoreMap {
        ScoreMap::new()
            .with_metric(metrics::NUM_TESTS_PASSED, 0.0)
            .with_metric(metrics::AVERAGE_TIME, FAILED_AVERAGE_TIME)
            .with_metric(metrics::WORST_TIME, FAILED_WORST_TIME)
            .with_metric(metrics::MEMORY_USAGE, RESOURCE_CEILING)
            .with_metric(metrics::CPU_USAGE, RESOURCE_CEILING)
            .with_logs(format!("Error during execution: {}", reason))
    }
}

/// Equality with numeric tolerance, so `21` and `21.0` agree.
fn values_match(actual: &Value, expected: &Value) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => (a - b).abs() <= 1e-9 * b.abs().max(1.0),
        _ => actual == expected,
    }
}
