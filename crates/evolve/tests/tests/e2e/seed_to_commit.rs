//! E2E: a seed program, one placeholder patch, one committed child.

use maple_evolve_engine::{RunConfig, ScriptedProposer};
use maple_evolve_store::InMemorySnapshot;
use maple_evolve_tests::*;
use maple_evolve_types::{metrics, NOTE_LLM_MUTATION, NOTE_SEED};
use std::sync::Arc;

#[tokio::test]
async fn placeholder_patch_is_evaluated_and_committed() {
    let backend = Arc::new(InMemorySnapshot::new());
    let database = seeded_database(backend.clone()).unwrap();
    let seed_id = database.store().records()[0].id;

    let mut c = controller(
        RunConfig::default().with_children(1).with_seed(3),
        database,
        ScriptedProposer::repeating(RETURN_ONE_PATCH),
        solve_evaluator(),
    )
    .unwrap();
    let report = c.step().await.unwrap();

    assert_eq!(report.parent_id, seed_id);
    assert!(report.inspiration_ids.is_empty());
    assert_eq!(report.committed.len(), 1);

    let store = c.store();
    assert_eq!(store.len(), 2);
    let seed = &store.records()[0];
    let child = &store.records()[1];
    assert_eq!(seed.note.as_deref(), Some(NOTE_SEED));
    assert_eq!(child.code, "def solve():\n    return 1");
    assert_eq!(child.parent_id, Some(seed_id));
    assert_eq!(child.note.as_deref(), Some(NOTE_LLM_MUTATION));
    assert_eq!(child.metric(metrics::NUM_TESTS_PASSED), Some(1.0));
    assert!(child.created_at > seed.created_at);

    // seed write + one generation write
    assert_eq!(backend.save_count(), 2);
    let persisted = maple_evolve_store::SnapshotPersistence::load(&backend)
        .unwrap()
        .unwrap();
    assert_eq!(persisted.programs, store.records());
    assert_eq!(persisted.task.as_deref(), Some("Return one."));
}

#[tokio::test]
async fn lineage_grows_across_generations() {
    let mut c = controller(
        RunConfig::default()
            .with_generations(4)
            .with_children(2)
            .with_seed(11),
        seeded_database(InMemorySnapshot::new()).unwrap(),
        numbering_proposer(),
        solve_evaluator(),
    )
    .unwrap();
    let summary = c.run().await.unwrap();
    assert_eq!(summary.generations, 4);

    let store = c.store();
    let seed_id = store.records()[0].id;
    for record in store.records().iter().skip(1) {
        let lineage = store.lineage(&record.id);
        assert_eq!(lineage.first().map(|r| r.id), Some(seed_id));
        assert_eq!(lineage.last().map(|r| r.id), Some(record.id));
    }
    // the first generation can only sample the seed
    assert!(!store.children_of(&seed_id).is_empty());
}
