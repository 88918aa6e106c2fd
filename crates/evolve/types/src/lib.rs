#![deny(unsafe_code)]
//! # maple-evolve-types
//!
//! Shared data model for Maple Evolve, the LLM-guided evolutionary
//! program-synthesis loop.
//!
//! ## Key Types
//!
//! - [`ProgramId`] — unique, restart-stable identifier of a program record
//! - [`ProgramRecord`] — an immutable candidate program with lineage and scores
//! - [`ScoreMap`] — named numeric evaluation outcomes plus free-text logs

pub mod ids;
pub mod record;
pub mod score;

pub use ids::ProgramId;
pub use record::{ProgramRecord, NOTE_LLM_MUTATION, NOTE_SEED};
pub use score::{metrics, ScoreMap};
