use async_trait::async_trait;
use maple_evolve_types::ScoreMap;
use std::sync::Arc;

/// Scores a candidate program.
///
/// `evaluate` must always return a well-formed score map. A candidate that
/// crashes, hangs or misbehaves gets [`Evaluator::failure_score`].
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, code: &str) -> ScoreMap;

    /// Worst-case score for a candidate that could not be evaluated.
    fn failure_score(&self, reason: &str) -> ScoreMap {
        ScoreMap::new().with_logs(format!("Error during execution: {}", reason))
    }
}

#[async_trait]
impl<T: Evaluator + ?Sized> Evaluator for Arc<T> {
    async fn evaluate(&self, code: &str) -> ScoreMap {
        (**self).evaluate(code).await
    }

    fn failure_score(&self, reason: &str) -> ScoreMap {
        (**self).failure_score(reason)
    }
}
