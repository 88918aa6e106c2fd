use crate::error::PatchError;
use crate::parse::Patch;
use serde::{Deserialize, Serialize};

/// Placeholder statements recognised by the fallback match.
pub const DEFAULT_PLACEHOLDERS: &[&str] = &["pass", "..."];

/// How a patch located its target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// The search block was found verbatim.
    Exact,
    /// The search block named a placeholder; its first standalone line was replaced.
    Placeholder(String),
}

/// A successfully applied patch. `program` is always the full program text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedPatch {
    pub program: String,
    pub strategy: MatchStrategy,
}

/// Result of [`PatchEngine::apply`]: a full program text, either patched or
/// the unchanged input, plus the status explaining which.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchOutcome {
    pub program: String,
    pub status: Result<MatchStrategy, PatchError>,
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        self.status.is_ok()
    }

    pub fn error(&self) -> Option<&PatchError> {
        self.status.as_ref().err()
    }

    pub fn into_program(self) -> String {
        self.program
    }
}

/// Applies SEARCH/REPLACE patches to program text.
#[derive(Clone, Debug)]
pub struct PatchEngine {
    placeholders: Vec<String>,
}

impl PatchEngine {
    pub fn new() -> Self {
        Self {
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Replace the recognised placeholder statements.
    pub fn with_placeholders<I, S>(mut self, placeholders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placeholders = placeholders.into_iter().map(Into::into).collect();
        self
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Apply `patch_text` to `program`. Never fails: on error the returned
    /// program is the input, unchanged.
    pub fn apply(&self, program: &str, patch_text: &str) -> PatchOutcome {
        match self.try_apply(program, patch_text) {
            Ok(applied) => PatchOutcome {
                program: applied.program,
                status: Ok(applied.strategy),
            },
            Err(e) => PatchOutcome {
                program: program.to_string(),
                status: Err(e),
            },
        }
    }

    pub fn try_apply(&self, program: &str, patch_text: &str) -> Result<AppliedPatch, PatchError> {
        let patch = Patch::parse(patch_text)?;
        self.apply_patch(program, &patch)
    }

    pub fn apply_patch(&self, program: &str, patch: &Patch) -> Result<AppliedPatch, PatchError> {
        if let Some(at) = program.find(&patch.search) {
            // Carry the proposer's indentation when both blocks were indented;
            // trimming the replacement would otherwise dedent its first line.
            let replacement = if !patch.search_indent().is_empty() && !patch.replace.is_empty() {
                format!("{}{}", patch.replace_indent, patch.replace)
            } else {
                patch.replace.clone()
            };
            return Ok(AppliedPatch {
                program: splice(program, at, at + patch.search.len(), &replacement),
                strategy: MatchStrategy::Exact,
            });
        }

        if let Some(token) = self.placeholder_in(&patch.search) {
            if let Some((start, end)) = find_standalone_line(program, token) {
                return Ok(AppliedPatch {
                    program: splice(program, start, end, &patch.replace),
                    strategy: MatchStrategy::Placeholder(token.to_string()),
                });
            }
        }

        Err(PatchError::NoMatch)
    }

    fn placeholder_in(&self, search: &str) -> Option<&str> {
        self.placeholders
            .iter()
            .map(String::as_str)
            .find(|p| search.lines().any(|line| line.trim() == *p))
    }
}

impl Default for PatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn splice(program: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(program.len() + replacement.len());
    out.push_str(&program[..start]);
    out.push_str(replacement);
    out.push_str(&program[end..]);
    out
}

/// Byte range of `token` on the first line consisting of nothing else.
fn find_standalone_line(program: &str, token: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in program.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim() == token {
            let start = offset + (content.len() - content.trim_start().len());
            return Some((start, start + token.len()));
        }
        offset += line.len();
    }
    None
}
