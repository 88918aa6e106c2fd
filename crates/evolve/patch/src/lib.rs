#![deny(unsafe_code)]
//! # maple-evolve-patch
//!
//! Parses proposer output in the SEARCH/REPLACE block format and applies it
//! to a program text.
//!
//! ```text
//! <<<<<<< SEARCH
//! pass
//! =======
//! return 1
//! >>>>>>> REPLACE
//! ```
//!
//! Application is pure: the same `(program, patch)` pair always yields the
//! same outcome. Only the first occurrence of the search block is replaced.
//! When the search block is not found but names a placeholder statement
//! (`pass` by default), the first standalone placeholder line in the program
//! is replaced instead.

pub mod engine;
pub mod error;
pub mod parse;

pub use engine::{AppliedPatch, MatchStrategy, PatchEngine, PatchOutcome, DEFAULT_PLACEHOLDERS};
pub use error::{MalformedReason, PatchError};
pub use parse::{Patch, REPLACE_MARKER, SEARCH_MARKER, SEPARATOR};
