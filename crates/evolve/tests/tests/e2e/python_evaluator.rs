//! E2E: the production evaluator, `TestSuiteEvaluator` over a real
//! `python3` subprocess. Each test returns early when no interpreter exists.

use maple_evolve_engine::{RunConfig, ScriptedProposer};
use maple_evolve_evaluator::{Evaluator, SubprocessSandbox, TestSuite, TestSuiteEvaluator};
use maple_evolve_store::InMemorySnapshot;
use maple_evolve_tests::*;
use maple_evolve_types::{metrics, ScoreMap};

const FIB_CORRECT: &str = "def fib(n):\n    a, b = 0, 1\n    for _ in range(n):\n        a, b = b, a + b\n    return a\n";
const FIB_IDENTITY: &str = "def fib(n):\n    return n\n";
const FIB_RAISES: &str = "def fib(n):\n    raise ValueError('no fib today')\n";

fn python_fib() -> TestSuiteEvaluator<SubprocessSandbox> {
    TestSuiteEvaluator::new(TestSuite::fibonacci(), SubprocessSandbox::python())
}

fn assert_failure_sentinel(score: &ScoreMap) {
    assert_eq!(score.get(metrics::NUM_TESTS_PASSED), Some(0.0));
    assert_eq!(score.get(metrics::AVERAGE_TIME), Some(10.0));
    assert_eq!(score.get(metrics::WORST_TIME), Some(100.0));
    assert!(score
        .logs
        .as_deref()
        .unwrap()
        .starts_with("Error during execution"));
}

#[tokio::test]
async fn solve_returning_one_passes() {
    if !python_available() {
        return;
    }
    let evaluator = TestSuiteEvaluator::new(solve_suite(), SubprocessSandbox::python());

    let score = evaluator.evaluate("def solve():\n    return 1").await;
    assert_eq!(score.get(metrics::NUM_TESTS_PASSED), Some(1.0));
    assert!(score.logs.is_none());

    let seed = evaluator.evaluate(SEED_PROGRAM).await;
    assert_eq!(seed.get(metrics::NUM_TESTS_PASSED), Some(0.0));
    assert!(seed.logs.as_deref().unwrap().contains("returned null instead of 1"));
}

#[tokio::test]
async fn correct_fib_passes_every_case() {
    if !python_available() {
        return;
    }
    let score = python_fib().evaluate(FIB_CORRECT).await;
    assert_eq!(score.get(metrics::NUM_TESTS_PASSED), Some(3.0));
    assert!(score.get(metrics::WORST_TIME).unwrap() >= score.get(metrics::AVERAGE_TIME).unwrap());
    assert!(score.get(metrics::WORST_TIME).unwrap() < 10.0);
    assert_eq!(score.get(metrics::MEMORY_USAGE), Some(100.0));
}

#[tokio::test]
async fn wrong_fib_logs_each_failed_case() {
    if !python_available() {
        return;
    }
    let score = python_fib().evaluate(FIB_IDENTITY).await;
    assert_eq!(score.get(metrics::NUM_TESTS_PASSED), Some(1.0));
    let logs = score.logs.unwrap();
    assert!(logs.contains("test_failure: fib(3) returned 3 instead of 2"));
    assert!(logs.contains("test_failure: fib(8) returned 8 instead of 21"));
}

#[tokio::test]
async fn raising_candidate_reports_the_exception() {
    if !python_available() {
        return;
    }
    let score = python_fib().evaluate(FIB_RAISES).await;
    assert_eq!(score.get(metrics::NUM_TESTS_PASSED), Some(0.0));
    let logs = score.logs.unwrap();
    assert!(logs.contains("test_error: fib(1) raised ValueError: no fib today"));
}

#[tokio::test]
async fn exiting_candidate_gets_failure_score() {
    if !python_available() {
        return;
    }
    let evaluator = python_fib();
    let nonzero = evaluator
        .evaluate("import sys\n\ndef fib(n):\n    sys.exit(3)\n")
        .await;
    assert_failure_sentinel(&nonzero);

    let clean = evaluator
        .evaluate("import sys\n\ndef fib(n):\n    sys.exit(0)\n")
        .await;
    assert_failure_sentinel(&clean);
}

#[tokio::test]
async fn syntax_error_gets_failure_score() {
    if !python_available() {
        return;
    }
    let score = python_fib().evaluate("def fib(n)\n    return n\n").await;
    assert_failure_sentinel(&score);
    assert!(score.logs.unwrap().contains("SyntaxError"));
}

#[tokio::test]
async fn controller_commits_python_scored_child() {
    if !python_available() {
        return;
    }
    let database = seeded_database(InMemorySnapshot::new()).unwrap();
    let seed_id = database.store().records()[0].id;
    let mut c = controller(
        RunConfig::default().with_children(1).with_seed(5),
        database,
        ScriptedProposer::repeating(RETURN_ONE_PATCH),
        TestSuiteEvaluator::new(solve_suite(), SubprocessSandbox::python()),
    )
    .unwrap();

    let report = c.step().await.unwrap();
    let child = c.store().get(&report.committed[0]).unwrap();
    assert_eq!(child.code, "def solve():\n    return 1");
    assert_eq!(child.parent_id, Some(seed_id));
    assert_eq!(child.metric(metrics::NUM_TESTS_PASSED), Some(1.0));
}
