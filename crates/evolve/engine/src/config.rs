use crate::error::EngineError;
use maple_evolve_types::metrics;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Parameters of an evolution run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Generations to run before stopping.
    pub generations: u64,
    /// Proposals requested per generation.
    pub children_per_generation: usize,
    /// Inspirations sampled alongside each parent.
    pub inspirations: usize,
    pub evaluation_timeout_ms: u64,
    pub proposal_timeout_ms: u64,
    /// Extra attempts after a transient proposer failure.
    pub proposal_retries: u32,
    /// Base delay between proposal attempts; grows linearly per attempt.
    pub retry_backoff_ms: u64,
    /// Seed for parent and inspiration sampling. `None` draws from entropy.
    pub seed: Option<u64>,
    pub max_concurrent_evaluations: usize,
    /// Metric used for the best-program report.
    pub primary_metric: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generations: 10,
            children_per_generation: 4,
            inspirations: 2,
            evaluation_timeout_ms: 10_000,
            proposal_timeout_ms: 60_000,
            proposal_retries: 2,
            retry_backoff_ms: 500,
            seed: None,
            max_concurrent_evaluations: 4,
            primary_metric: metrics::NUM_TESTS_PASSED.to_string(),
        }
    }
}

impl RunConfig {
    /// Short, reproducible run.
    pub fn demo() -> Self {
        Self {
            generations: 3,
            children_per_generation: 2,
            inspirations: 2,
            evaluation_timeout_ms: 5_000,
            proposal_timeout_ms: 30_000,
            proposal_retries: 1,
            retry_backoff_ms: 100,
            seed: Some(7),
            max_concurrent_evaluations: 2,
            ..Self::default()
        }
    }

    /// Load from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| EngineError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_generations(mut self, generations: u64) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_children(mut self, children: usize) -> Self {
        self.children_per_generation = children;
        self
    }

    pub fn with_inspirations(mut self, inspirations: usize) -> Self {
        self.inspirations = inspirations;
        self
    }

    pub fn with_evaluation_timeout(mut self, timeout: Duration) -> Self {
        self.evaluation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_proposal_timeout(mut self, timeout: Duration) -> Self {
        self.proposal_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_proposal_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.proposal_retries = retries;
        self.retry_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_concurrent_evaluations(mut self, limit: usize) -> Self {
        self.max_concurrent_evaluations = limit;
        self
    }

    pub fn with_primary_metric(mut self, metric: impl Into<String>) -> Self {
        self.primary_metric = metric.into();
        self
    }

    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluation_timeout_ms)
    }

    pub fn proposal_timeout(&self) -> Duration {
        Duration::from_millis(self.proposal_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.children_per_generation == 0 {
            return Err(EngineError::InvalidConfig(
                "children_per_generation must be at least 1".into(),
            ));
        }
        if self.evaluation_timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "evaluation_timeout_ms must be positive".into(),
            ));
        }
        if self.proposal_timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "proposal_timeout_ms must be positive".into(),
            ));
        }
        if self.max_concurrent_evaluations == 0 {
            return Err(EngineError::InvalidConfig(
                "max_concurrent_evaluations must be at least 1".into(),
            ));
        }
        if self.primary_metric.trim().is_empty() {
            return Err(EngineError::InvalidConfig("primary_metric is empty".into()));
        }
        Ok(())
    }
}
