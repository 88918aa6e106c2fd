//! E2E: the stop handle ends a run between generations.

use maple_evolve_engine::{EngineError, GenerationPhase, RunConfig, ScriptedProposer};
use maple_evolve_store::InMemorySnapshot;
use maple_evolve_tests::*;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn stop_between_generations_keeps_progress() {
    let mut c = controller(
        RunConfig::default().with_generations(10).with_children(1),
        seeded_database(InMemorySnapshot::new()).unwrap(),
        ScriptedProposer::repeating(RETURN_ONE_PATCH),
        solve_evaluator(),
    )
    .unwrap();

    c.step().await.unwrap();
    let committed = c.store().len();
    let handle = c.stop_handle();
    handle.store(true, Ordering::SeqCst);

    assert!(matches!(c.step().await, Err(EngineError::Stopped)));
    let summary = c.run().await.unwrap();
    assert_eq!(summary.generations, 1);
    assert_eq!(c.phase(), GenerationPhase::Done);
    assert_eq!(c.store().len(), committed);
}
