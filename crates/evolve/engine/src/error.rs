use maple_evolve_store::StoreError;

/// Failure of a single proposal call. Never fatal to a generation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProposerError {
    #[error("proposal timed out after {0} ms")]
    Timeout(u64),
    #[error("proposer transport error: {0}")]
    Transport(String),
    #[error("invalid proposer response: {0}")]
    InvalidResponse(String),
    #[error("proposer misconfigured: {0}")]
    Config(String),
}

impl ProposerError {
    /// Worth retrying: the same request may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProposerError::Timeout(_) | ProposerError::Transport(_))
    }
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("program store error: {0}")]
    Store(#[from] StoreError),
    #[error("controller stopped")]
    Stopped,
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
