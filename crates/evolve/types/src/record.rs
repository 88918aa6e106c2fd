use crate::ids::ProgramId;
use crate::score::ScoreMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance note for root records.
pub const NOTE_SEED: &str = "seed";
/// Provenance note for records produced by a proposer edit.
pub const NOTE_LLM_MUTATION: &str = "llm mutation";

/// A candidate program committed to the store.
///
/// Records are never mutated once created; the store only hands out shared
/// references and clones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub id: ProgramId,
    /// Full source text of the program.
    pub code: String,
    /// Record this one was derived from. `None` for roots.
    #[serde(default)]
    pub parent_id: Option<ProgramId>,
    #[serde(default)]
    pub score: ScoreMap,
    #[serde(default)]
    pub note: Option<String>,
    /// Insertion sequence number, strictly increasing within a store.
    pub created_at: u64,
    /// Wall-clock time the record was built.
    pub recorded_at: DateTime<Utc>,
}

impl ProgramRecord {
    pub fn new(code: impl Into<String>, created_at: u64) -> Self {
        Self {
            id: ProgramId::new(),
            code: code.into(),
            parent_id: None,
            score: ScoreMap::default(),
            note: None,
            created_at,
            recorded_at: Utc::now(),
        }
    }

    /// A root record with the `seed` note.
    pub fn seed(code: impl Into<String>, created_at: u64) -> Self {
        Self::new(code, created_at).with_note(NOTE_SEED)
    }

    pub fn with_id(mut self, id: ProgramId) -> Self {
        self.id = id;
        self
    }

    pub fn with_parent(mut self, parent_id: ProgramId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_score(mut self, score: ScoreMap) -> Self {
        self.score = score;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Shortcut for `self.score.get(metric)`.
    pub fn metric(&self, metric: &str) -> Option<f64> {
        self.score.get(metric)
    }
}
