//! E2E: scores stay attached to their own candidate when evaluations
//! finish out of order.

use maple_evolve_engine::RunConfig;
use maple_evolve_store::InMemorySnapshot;
use maple_evolve_tests::*;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn staggered_completion_keeps_scores_aligned() {
    let children = 8;
    let mut c = controller(
        RunConfig::default()
            .with_children(children)
            .with_max_concurrent_evaluations(children),
        seeded_database(InMemorySnapshot::new()).unwrap(),
        numbering_proposer(),
        MarkerEvaluator::new(Duration::from_millis(10), children as i64),
    )
    .unwrap();

    let report = c.step().await.unwrap();
    assert_eq!(report.committed.len(), children);

    let mut markers = Vec::new();
    for id in &report.committed {
        let record = c.store().get(id).unwrap();
        let literal = returned_literal(&record.code).unwrap();
        assert_eq!(record.metric(MARKER), Some(literal as f64));
        markers.push(literal);
    }
    markers.sort_unstable();
    assert_eq!(markers, (0..children as i64).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn bounded_concurrency_still_scores_everything() {
    let mut c = controller(
        RunConfig::default()
            .with_children(6)
            .with_max_concurrent_evaluations(2),
        seeded_database(InMemorySnapshot::new()).unwrap(),
        numbering_proposer(),
        MarkerEvaluator::new(Duration::from_millis(5), 6),
    )
    .unwrap();

    let report = c.step().await.unwrap();
    assert_eq!(report.committed.len(), 6);
    for id in &report.committed {
        let record = c.store().get(id).unwrap();
        assert_eq!(
            record.metric(MARKER),
            returned_literal(&record.code).map(|n| n as f64)
        );
    }
}

#[tokio::test]
async fn committed_sequence_is_strictly_increasing() {
    let mut c = controller(
        RunConfig::default().with_generations(3).with_children(4),
        seeded_database(InMemorySnapshot::new()).unwrap(),
        numbering_proposer(),
        solve_evaluator(),
    )
    .unwrap();
    c.run().await.unwrap();

    let records = c.store().records();
    assert!(records.windows(2).all(|w| w[0].created_at < w[1].created_at));
}
