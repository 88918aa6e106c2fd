#![deny(unsafe_code)]
//! # maple-evolve-engine
//!
//! The generation loop of Maple Evolve.
//!
//! A [`GenerationController`] samples a parent and inspirations from the
//! program store, asks a [`Proposer`] for SEARCH/REPLACE patches, applies
//! them, drops candidates identical to their parent, scores the rest through
//! an [`Evaluator`](maple_evolve_evaluator::Evaluator), and commits the
//! generation as one persisted batch.
//!
//! Proposals and evaluations fan out concurrently; results are matched back
//! to their child by index, never by completion order.

pub mod config;
pub mod controller;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod prompt;
pub mod proposer;

pub use config::RunConfig;
pub use controller::{GenerationController, GenerationPhase, GenerationReport, RunSummary};
pub use error::{EngineError, EngineResult, ProposerError};
pub use llm::{strip_code_fences, CompletionTransport, GeminiTransport, LlmProposer, AUTH_ENV_VAR};
pub use metrics::RunMetrics;
pub use prompt::PromptBuilder;
pub use proposer::{FailingProposer, Proposer, ScriptedProposer};
