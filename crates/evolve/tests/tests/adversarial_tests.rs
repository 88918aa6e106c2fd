#[path = "adversarial/proposer_outage.rs"]
mod proposer_outage;

#[path = "adversarial/corrupt_store.rs"]
mod corrupt_store;

#[path = "adversarial/hostile_candidates.rs"]
mod hostile_candidates;
