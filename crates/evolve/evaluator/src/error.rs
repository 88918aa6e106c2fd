/// Errors raised while driving a sandboxed execution.
///
/// These never reach the evaluator's caller; they are folded into an
/// [`ExecutionOutcome::Failed`](crate::ExecutionOutcome::Failed).
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },
    #[error("sandbox I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("process exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },
    #[error("harness produced no result line")]
    MissingResult,
    #[error("unreadable harness result: {0}")]
    BadResult(String),
}
