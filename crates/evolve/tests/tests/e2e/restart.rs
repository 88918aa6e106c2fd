//! E2E: a run can be resumed from the persisted store alone.

use maple_evolve_engine::RunConfig;
use maple_evolve_store::{JsonFileSnapshot, ProgramDatabase};
use maple_evolve_tests::*;

#[tokio::test]
async fn resumed_run_continues_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("programs.json");

    let first_run = {
        let mut c = controller(
            RunConfig::default().with_generations(2).with_children(3),
            seeded_database(JsonFileSnapshot::new(&path)).unwrap(),
            numbering_proposer(),
            solve_evaluator(),
        )
        .unwrap();
        c.run().await.unwrap();
        c.store().records().to_vec()
    };
    assert!(first_run.len() > 1);

    let database = ProgramDatabase::open(JsonFileSnapshot::new(&path)).unwrap();
    assert_eq!(database.store().records(), first_run.as_slice());
    assert_eq!(database.store().task(), Some("Return one."));

    let mut c = controller(
        RunConfig::default().with_generations(1).with_children(2),
        database,
        numbering_proposer(),
        solve_evaluator(),
    )
    .unwrap();
    assert_eq!(c.generation(), 0);
    c.run().await.unwrap();
    assert_eq!(c.generation(), 1);

    let store = c.store();
    assert_eq!(&store.records()[..first_run.len()], first_run.as_slice());
    for record in store.records() {
        if let Some(parent) = record.parent_id {
            assert!(store.contains(&parent));
        }
    }
}

#[tokio::test]
async fn reopening_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("programs.json");

    let seed_id = seeded_database(JsonFileSnapshot::new(&path))
        .unwrap()
        .store()
        .records()[0]
        .id;
    let reopened = seeded_database(JsonFileSnapshot::new(&path)).unwrap();
    assert_eq!(reopened.store().len(), 1);
    assert_eq!(reopened.store().records()[0].id, seed_id);
}
