/// Why a patch text could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    #[error("missing {0} marker")]
    MissingMarker(&'static str),
    #[error("{0} marker appears before {1} marker")]
    OutOfOrder(&'static str, &'static str),
    #[error("empty search block")]
    EmptySearch,
}

/// Errors from patch application.
///
/// Both variants are expected outcomes of an unreliable proposer; the caller
/// keeps the original program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("malformed patch: {0}")]
    Malformed(#[from] MalformedReason),
    #[error("search block not found in program")]
    NoMatch,
}

impl PatchError {
    /// Patch failures never abort a generation.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}
