#![deny(unsafe_code)]
//! # maple-evolve-evaluator
//!
//! Scores candidate programs without ever running them in-process.
//!
//! - [`Evaluator`] — the infallible `evaluate(code) -> ScoreMap` contract.
//!   Failures become worst-case sentinel scores with an explanatory `logs`.
//! - [`Sandbox`] — the execution boundary `execute(code, inputs, timeout)`.
//! - [`SubprocessSandbox`] — runs a rendered script in a child process inside
//!   a private temp dir, killed on timeout.
//! - [`TestSuiteEvaluator`] — runs an entry point against `(args, expected)`
//!   cases and reports `num_tests_passed`, timings and resource metrics.

pub mod error;
pub mod evaluator;
pub mod harness;
pub mod sandbox;
pub mod subprocess;
pub mod suite;

pub use error::SandboxError;
pub use evaluator::Evaluator;
pub use harness::{PythonHarness, ScriptHarness, RESULT_MARKER};
pub use sandbox::{CaseOutput, ExecutionOutcome, Sandbox, SimulatedSandbox};
pub use subprocess::SubprocessSandbox;
pub use suite::{TestCase, TestSuite, TestSuiteEvaluator};
