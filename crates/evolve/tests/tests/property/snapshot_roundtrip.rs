//! Property tests: snapshots restore the exact ordered store.

use maple_evolve_store::{ProgramStore, StoreSnapshot};
use maple_evolve_types::{ProgramRecord, ScoreMap};
use proptest::prelude::*;

/// Build a store where record `i` descends from record `parents[i] % i`.
fn build(parents: &[usize], scores: &[f64]) -> ProgramStore {
    let mut store = ProgramStore::new();
    store.seed("root").unwrap();
    for (i, (p, score)) in parents.iter().zip(scores).enumerate() {
        let parent = store.records()[p % (i + 1)].id;
        let seq = store.next_sequence();
        let record = ProgramRecord::new(format!("child {}", i), seq)
            .with_parent(parent)
            .with_score(ScoreMap::new().with_metric("num_tests_passed", *score));
        store.commit(record).unwrap();
    }
    store
}

proptest! {
    /// Timing-like values keep every bit through the JSON document.
    #[test]
    fn small_timings_roundtrip_exactly(timings in prop::collection::vec(0.0f64..0.01, 1..40)) {
        let mut store = ProgramStore::new();
        for t in &timings {
            let seq = store.next_sequence();
            let record = ProgramRecord::new(format!("t {}", seq), seq)
                .with_score(ScoreMap::new().with_metric("average_time", *t));
            store.commit(record).unwrap();
        }
        let json = store.snapshot().to_json().unwrap();
        let restored = ProgramStore::restore(StoreSnapshot::from_json(&json).unwrap()).unwrap();

        for (record, t) in restored.records().iter().zip(&timings) {
            prop_assert_eq!(record.metric("average_time").map(f64::to_bits), Some(t.to_bits()));
        }
    }

    #[test]
    fn restore_reproduces_records_and_lineage(
        parents in prop::collection::vec(any::<usize>(), 0..25),
        scores in prop::collection::vec(any::<f64>(), 25),
    ) {
        let store = build(&parents, &scores);
        let json = store.snapshot().to_json().unwrap();
        let restored = ProgramStore::restore(StoreSnapshot::from_json(&json).unwrap()).unwrap();

        prop_assert_eq!(restored.records(), store.records());
        for record in store.records() {
            prop_assert_eq!(
                restored.lineage(&record.id).len(),
                store.lineage(&record.id).len()
            );
        }
        prop_assert_eq!(
            restored.best("num_tests_passed").map(|r| r.id),
            store.best("num_tests_passed").map(|r| r.id)
        );
    }
}
