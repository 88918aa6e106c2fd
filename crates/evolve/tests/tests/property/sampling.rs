//! Property tests: parent and inspiration sampling.

use maple_evolve_store::ProgramStore;
use maple_evolve_types::{ProgramId, ProgramRecord};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn store_of(size: usize) -> ProgramStore {
    let mut store = ProgramStore::new();
    let root = store.seed("root").unwrap();
    for i in 1..size {
        let seq = store.next_sequence();
        store
            .commit(ProgramRecord::new(format!("p{}", i), seq).with_parent(root))
            .unwrap();
    }
    store
}

proptest! {
    /// The parent is never among its inspirations and inspirations are distinct.
    #[test]
    fn inspirations_exclude_parent_and_are_distinct(
        size in 1usize..30,
        k in 0usize..8,
        seed in any::<u64>(),
    ) {
        let store = store_of(size);
        let mut rng = StdRng::seed_from_u64(seed);
        let sample = store.sample_parent_and_inspirations(k, &mut rng).unwrap();

        let ids: HashSet<ProgramId> = sample.inspirations.iter().map(|r| r.id).collect();
        prop_assert!(!ids.contains(&sample.parent.id));
        prop_assert_eq!(ids.len(), sample.inspirations.len());
        prop_assert_eq!(sample.inspirations.len(), k.min(size - 1));
        prop_assert!(store.contains(&sample.parent.id));
    }

    /// The same seed always draws the same sample.
    #[test]
    fn seeded_sampling_is_reproducible(size in 1usize..20, seed in any::<u64>()) {
        let store = store_of(size);
        let a = store
            .sample_parent_and_inspirations(2, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        let b = store
            .sample_parent_and_inspirations(2, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        prop_assert_eq!(a.parent.id, b.parent.id);
        let a_ids: Vec<_> = a.inspirations.iter().map(|r| r.id).collect();
        let b_ids: Vec<_> = b.inspirations.iter().map(|r| r.id).collect();
        prop_assert_eq!(a_ids, b_ids);
    }
}

#[test]
fn every_record_can_be_drawn_as_parent() {
    let store = store_of(5);
    let mut rng = StdRng::seed_from_u64(99);
    let mut seen = HashSet::new();
    for _ in 0..500 {
        let sample = store.sample_parent_and_inspirations(0, &mut rng).unwrap();
        seen.insert(sample.parent.id);
    }
    assert_eq!(seen.len(), 5);
}

#[test]
fn single_record_has_no_inspirations() {
    let store = store_of(1);
    let mut rng = StdRng::seed_from_u64(0);
    let sample = store.sample_parent_and_inspirations(3, &mut rng).unwrap();
    assert!(sample.inspirations.is_empty());
}
