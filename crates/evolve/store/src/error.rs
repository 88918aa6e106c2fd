use maple_evolve_types::ProgramId;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the program store.
///
/// Every variant is fatal to an evolution run: continuing would risk
/// corrupting lineage or sampling validity.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("program store is empty")]
    Empty,
    #[error("duplicate program id: {0}")]
    DuplicateId(ProgramId),
    #[error("dangling parent reference: {child} -> {parent}")]
    DanglingParent { child: ProgramId, parent: ProgramId },
    #[error("insertion order violated: {id} has created_at {created_at}, previous is {previous}")]
    OutOfOrder {
        id: ProgramId,
        created_at: u64,
        previous: u64,
    },
    #[error("program {id} has non-finite metric {metric:?}")]
    NonFiniteScore { id: ProgramId, metric: String },
    #[error("corrupt store: {0}")]
    Corrupt(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// True for errors caused by data that violates a store invariant.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId(_)
                | Self::DanglingParent { .. }
                | Self::OutOfOrder { .. }
                | Self::NonFiniteScore { .. }
                | Self::Corrupt(_)
        )
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}
