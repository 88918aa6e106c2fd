use serde::{Deserialize, Serialize};

/// Counters accumulated over a run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    pub generations_completed: u64,
    pub proposals_requested: u64,
    /// Proposals that produced no patch text after all retries.
    pub proposal_failures: u64,
    pub proposal_retries: u64,
    pub patches_malformed: u64,
    pub patches_unmatched: u64,
    /// Candidates dropped for being identical to their parent.
    pub noops_filtered: u64,
    pub candidates_evaluated: u64,
    /// Evaluations cut off by the timeout or a crashed evaluation task.
    pub evaluations_aborted: u64,
    pub records_committed: u64,
    /// Best primary-metric value after each generation (last N).
    pub best_history: Vec<f64>,
    max_history: usize,
}

impl RunMetrics {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            ..Default::default()
        }
    }

    pub fn record_best(&mut self, value: f64) {
        self.best_history.push(value);
        if self.best_history.len() > self.max_history {
            self.best_history.remove(0);
        }
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best_history.last().copied()
    }

    /// Share of requested proposals that became committed records.
    pub fn yield_rate(&self) -> f64 {
        if self.proposals_requested == 0 {
            return 0.0;
        }
        self.records_committed as f64 / self.proposals_requested as f64
    }
}
