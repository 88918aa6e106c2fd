use crate::error::ProposerError;
use async_trait::async_trait;
use maple_evolve_types::ProgramRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Suggests a patch for `parent`, informed by `inspirations`.
///
/// Implementations are called concurrently for the children of one
/// generation; each call is independent.
#[async_trait]
pub trait Proposer: Send + Sync {
    async fn propose(
        &self,
        parent: &ProgramRecord,
        inspirations: &[ProgramRecord],
    ) -> Result<String, ProposerError>;
}

#[async_trait]
impl<T: Proposer + ?Sized> Proposer for Arc<T> {
    async fn propose(
        &self,
        parent: &ProgramRecord,
        inspirations: &[ProgramRecord],
    ) -> Result<String, ProposerError> {
        (**self).propose(parent, inspirations).await
    }
}

type Script = dyn Fn(usize, &ProgramRecord, &[ProgramRecord]) -> Result<String, ProposerError>
    + Send
    + Sync;

/// Proposer that replays queued responses, then falls back to a script.
///
/// The script receives the zero-based call number.
pub struct ScriptedProposer {
    queue: Mutex<VecDeque<Result<String, ProposerError>>>,
    script: Arc<Script>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProposer {
    /// Every call answers `patch`.
    pub fn repeating(patch: impl Into<String>) -> Self {
        let patch = patch.into();
        Self::from_fn(move |_, _, _| Ok(patch.clone()))
    }

    pub fn from_fn(
        script: impl Fn(usize, &ProgramRecord, &[ProgramRecord]) -> Result<String, ProposerError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            script: Arc::new(script),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a response served before the script is consulted.
    pub fn with_response(self, patch: impl Into<String>) -> Self {
        self.push(Ok(patch.into()))
    }

    /// Queue a failure served before the script is consulted.
    pub fn with_error(self, error: ProposerError) -> Self {
        self.push(Err(error))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(self, response: Result<String, ProposerError>) -> Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(response);
        }
        self
    }
}

#[async_trait]
impl Proposer for ScriptedProposer {
    async fn propose(
        &self,
        parent: &ProgramRecord,
        inspirations: &[ProgramRecord],
    ) -> Result<String, ProposerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let queued = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        match queued {
            Some(response) => response,
            None => (self.script)(call, parent, inspirations),
        }
    }
}

/// Proposer that always fails with the same error.
pub struct FailingProposer {
    error: ProposerError,
    calls: AtomicUsize,
}

impl FailingProposer {
    pub fn new(error: ProposerError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingProposer {
    fn default() -> Self {
        Self::new(ProposerError::Transport("simulated outage".into()))
    }
}

#[async_trait]
impl Proposer for FailingProposer {
    async fn propose(
        &self,
        _parent: &ProgramRecord,
        _inspirations: &[ProgramRecord],
    ) -> Result<String, ProposerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}
