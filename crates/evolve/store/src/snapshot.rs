use crate::error::{StoreError, StoreResult};
use maple_evolve_types::ProgramRecord;
use serde::{Deserialize, Serialize};

/// Current persisted document version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The persisted form of a program store: the full ordered record list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Natural-language task the programs are evolved for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default)]
    pub programs: Vec<ProgramRecord>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Borrowed form of [`StoreSnapshot`], serialized to the same document.
///
/// Lets the store persist its live record list without copying it.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SnapshotView<'a> {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<&'a str>,
    pub programs: &'a [ProgramRecord],
}

impl SnapshotView<'_> {
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn to_owned_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: self.version,
            task: self.task.map(str::to_string),
            programs: self.programs.to_vec(),
        }
    }
}

impl StoreSnapshot {
    pub fn view(&self) -> SnapshotView<'_> {
        SnapshotView {
            version: self.version,
            task: self.task.as_deref(),
            programs: &self.programs,
        }
    }

    pub fn to_json(&self) -> StoreResult<String> {
        self.view().to_json()
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::Corrupt(format!("unreadable snapshot: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
