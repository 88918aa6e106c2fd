use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric names produced by the built-in test-suite evaluator.
pub mod metrics {
    pub const NUM_TESTS_PASSED: &str = "num_tests_passed";
    pub const AVERAGE_TIME: &str = "average_time";
    pub const WORST_TIME: &str = "worst_time";
    pub const MEMORY_USAGE: &str = "memory_usage";
    pub const CPU_USAGE: &str = "cpu_usage";
}

/// Named numeric outcomes of evaluating a program.
///
/// A missing metric means "not evaluated". `logs` carries free text such as
/// failed test cases or the error that stopped the evaluation.
///
/// Stored values are always finite: the builders drop NaN and clamp the
/// infinities to `±f64::MAX`, since JSON has no representation for either.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreMap {
    pub metrics: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_logs(mut self, logs: impl Into<String>) -> Self {
        self.logs = Some(logs.into());
        self
    }

    /// Record a metric. NaN removes it; infinities are clamped.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match finite(value) {
            Some(v) => {
                self.metrics.insert(name, v);
            }
            None => {
                self.metrics.remove(&name);
            }
        }
    }

    /// Apply the [`set`](Self::set) rules to values written directly into
    /// `metrics`.
    pub fn normalized(mut self) -> Self {
        self.metrics = std::mem::take(&mut self.metrics)
            .into_iter()
            .filter_map(|(k, v)| finite(v).map(|v| (k, v)))
            .collect();
        self
    }

    /// First metric whose value cannot be persisted, if any.
    pub fn non_finite_metric(&self) -> Option<&str> {
        self.metrics
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(k, _)| k.as_str())
    }

    /// Value of a metric. NaN is reported as not evaluated.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied().filter(|v| !v.is_nan())
    }

    pub fn is_evaluated(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append a line to the logs.
    pub fn push_log(&mut self, line: impl AsRef<str>) {
        let logs = self.logs.get_or_insert_with(String::new);
        logs.push_str(line.as_ref());
        if !logs.ends_with('\n') {
            logs.push('\n');
        }
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

fn finite(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(-f64::MAX, f64::MAX))
    }
}
