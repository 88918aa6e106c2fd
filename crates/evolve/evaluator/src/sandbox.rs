use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Result of one call of the entry point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseOutput {
    /// Returned value; `null` when the call raised.
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Option<String>,
    /// Seconds spent in the call.
    #[serde(default)]
    pub elapsed: f64,
}

impl CaseOutput {
    pub fn returned(output: Value, elapsed: f64) -> Self {
        Self {
            output,
            error: None,
            elapsed,
        }
    }

    pub fn raised(error: impl Into<String>, elapsed: f64) -> Self {
        Self {
            output: Value::Null,
            error: Some(error.into()),
            elapsed,
        }
    }
}

/// What happened when a candidate ran inside the sandbox.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionOutcome {
    /// The program loaded and every case was attempted.
    Completed {
        cases: Vec<CaseOutput>,
        elapsed: Duration,
    },
    /// The program could not be loaded or the harness broke down.
    Failed { reason: String },
    /// The time limit expired and the execution was killed.
    TimedOut { limit: Duration },
}

impl ExecutionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed { .. })
    }
}

/// Isolation boundary for running untrusted candidate code.
///
/// Each call must be independent: one candidate's execution can never
/// observe or corrupt another's, or the host process.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Load `code`, call `entrypoint` once per argument list in `inputs`,
    /// and give up after `timeout`.
    async fn execute(
        &self,
        code: &str,
        entrypoint: &str,
        inputs: &[Vec<Value>],
        timeout: Duration,
    ) -> ExecutionOutcome;
}

#[async_trait]
impl<T: Sandbox + ?Sized> Sandbox for Arc<T> {
    async fn execute(
        &self,
        code: &str,
        entrypoint: &str,
        inputs: &[Vec<Value>],
        timeout: Duration,
    ) -> ExecutionOutcome {
        (**self).execute(code, entrypoint, inputs, timeout).await
    }
}

type Responder = dyn Fn(&str, &[Vec<Value>]) -> ExecutionOutcome + Send + Sync;

/// In-process sandbox that answers from a closure instead of running code.
pub struct SimulatedSandbox {
    respond: Arc<Responder>,
    delay: Duration,
    calls: AtomicUsize,
}

impl SimulatedSandbox {
    pub fn from_fn(
        respond: impl Fn(&str, &[Vec<Value>]) -> ExecutionOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Arc::new(respond),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every case returns the same value.
    pub fn returning(output: Value) -> Self {
        Self::from_fn(move |_, inputs| ExecutionOutcome::Completed {
            cases: inputs
                .iter()
                .map(|_| CaseOutput::returned(output.clone(), 0.001))
                .collect(),
            elapsed: Duration::from_millis(1),
        })
    }

    /// Every execution fails to load.
    pub fn failing(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::from_fn(move |_, _| ExecutionOutcome::Failed {
            reason: reason.clone(),
        })
    }

    /// Simulated run time; longer than the timeout yields `TimedOut`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sandbox for SimulatedSandbox {
    async fn execute(
        &self,
        code: &str,
        _entrypoint: &str,
        inputs: &[Vec<Value>],
        timeout: Duration,
    ) -> ExecutionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay > timeout {
            tokio::time::sleep(timeout).await;
            return ExecutionOutcome::TimedOut { limit: timeout };
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.respond)(code, inputs)
    }
}
