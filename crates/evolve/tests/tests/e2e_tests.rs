#[path = "e2e/seed_to_commit.rs"]
mod seed_to_commit;

#[path = "e2e/noop_filtering.rs"]
mod noop_filtering;

#[path = "e2e/concurrent_evaluation.rs"]
mod concurrent_evaluation;

#[path = "e2e/restart.rs"]
mod restart;

#[path = "e2e/stop_handle.rs"]
mod stop_handle;

#[path = "e2e/python_evaluator.rs"]
mod python_evaluator;
