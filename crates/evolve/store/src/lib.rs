#![deny(unsafe_code)]
//! # maple-evolve-store
//!
//! The program database for Maple Evolve: an append-only, ordered collection
//! of [`ProgramRecord`]s with lineage links and scores.
//!
//! ## Invariants
//!
//! - Records are never mutated or removed.
//! - Ids are unique for the lifetime of the store, across restarts.
//! - Every non-root `parent_id` names a record committed earlier.
//! - `created_at` is strictly increasing in insertion order.
//! - Every score value is finite.
//! - `ProgramStore::restore(store.snapshot())` reproduces the same sequence.
//!
//! [`ProgramDatabase`] is the single writer: it appends a generation's batch,
//! persists the resulting snapshot once, and rolls the batch back if that
//! write fails.
//!
//! [`ProgramRecord`]: maple_evolve_types::ProgramRecord

pub mod database;
pub mod error;
pub mod persistence;
pub mod snapshot;
pub mod store;

pub use database::ProgramDatabase;
pub use error::{StoreError, StoreResult};
pub use persistence::{InMemorySnapshot, JsonFileSnapshot, SnapshotPersistence};
pub use snapshot::{SnapshotView, StoreSnapshot, SNAPSHOT_VERSION};
pub use store::{ProgramStore, Sample};
