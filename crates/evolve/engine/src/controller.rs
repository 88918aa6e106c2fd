use crate::config::RunConfig;
use crate::error::{EngineError, EngineResult, ProposerError};
use crate::metrics::RunMetrics;
use crate::proposer::Proposer;
use maple_evolve_evaluator::Evaluator;
use maple_evolve_patch::{PatchEngine, PatchError};
use maple_evolve_store::{ProgramDatabase, ProgramStore};
use maple_evolve_types::{ProgramId, ProgramRecord, ScoreMap, NOTE_LLM_MUTATION};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

const BEST_HISTORY: usize = 100;

/// Where the controller is within a generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationPhase {
    Sample,
    Propose,
    Patch,
    Filter,
    Evaluate,
    Commit,
    /// The generation budget is spent or the run was stopped.
    Done,
}

/// What one generation did.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u64,
    pub parent_id: ProgramId,
    pub inspiration_ids: Vec<ProgramId>,
    pub proposals_received: usize,
    pub proposal_failures: usize,
    /// Patches that were malformed or matched nothing.
    pub patches_rejected: usize,
    pub noops_filtered: usize,
    /// Committed children, in child-index order.
    pub committed: Vec<ProgramId>,
}

/// Outcome of [`GenerationController::run`].
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub generations: u64,
    pub records_committed: u64,
    /// Best record for the configured primary metric.
    pub best: Option<ProgramRecord>,
    pub metrics: RunMetrics,
}

struct ProposalAttempt {
    child: usize,
    result: Result<String, ProposerError>,
    retries: u32,
}

struct Candidate {
    child: usize,
    code: String,
}

/// Drives the SAMPLE → PROPOSE → PATCH → FILTER → EVALUATE → COMMIT loop.
///
/// The controller owns the only writer of the program store. Between
/// generations it keeps no state beyond the store, so a restarted run only
/// needs the persisted snapshot.
pub struct GenerationController {
    config: RunConfig,
    database: ProgramDatabase,
    proposer: Arc<dyn Proposer>,
    evaluator: Arc<dyn Evaluator>,
    patcher: PatchEngine,
    rng: StdRng,
    metrics: RunMetrics,
    phase: GenerationPhase,
    generation: u64,
    stop: Arc<AtomicBool>,
}

impl GenerationController {
    pub fn new(
        config: RunConfig,
        database: ProgramDatabase,
        proposer: Arc<dyn Proposer>,
        evaluator: Arc<dyn Evaluator>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            database,
            proposer,
            evaluator,
            patcher: PatchEngine::new(),
            rng,
            metrics: RunMetrics::new(BEST_HISTORY),
            phase: GenerationPhase::Sample,
            generation: 0,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_patch_engine(mut self, patcher: PatchEngine) -> Self {
        self.patcher = patcher;
        self
    }

    /// Handle that stops the run before its next generation.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn store(&self) -> &ProgramStore {
        self.database.store()
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    /// Generations completed by this controller instance.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn into_database(self) -> ProgramDatabase {
        self.database
    }

    /// Run generations until the budget is spent or the stop handle is set.
    pub async fn run(&mut self) -> EngineResult<RunSummary> {
        info!(
            generations = self.config.generations,
            children = self.config.children_per_generation,
            programs = self.store().len(),
            "evolution run starting"
        );
        while self.generation < self.config.generations {
            if self.is_stopped() {
                info!(generation = self.generation, "stop requested; ending run");
                break;
            }
            self.step().await?;
        }
        self.phase = GenerationPhase::Done;

        let best = self.store().best(&self.config.primary_metric).cloned();
        match &best {
            Some(record) => info!(
                program_id = %record.id,
                metric = %self.config.primary_metric,
                value = record.metric(&self.config.primary_metric),
                "best program"
            ),
            None => warn!(metric = %self.config.primary_metric, "no program carries the primary metric"),
        }

        Ok(RunSummary {
            generations: self.generation,
            records_committed: self.metrics.records_committed,
            best,
            metrics: self.metrics.clone(),
        })
    }

    /// Run one full generation and commit its children.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub async fn step(&mut self) -> EngineResult<GenerationReport> {
        if self.is_stopped() {
            return Err(EngineError::Stopped);
        }

        self.phase = GenerationPhase::Sample;
        let sample = self
            .database
            .store()
            .sample_parent_and_inspirations(self.config.inspirations, &mut self.rng)?;
        let parent = Arc::new(sample.parent);
        let inspirations: Arc<[ProgramRecord]> = sample.inspirations.into();
        debug!(
            parent_id = %parent.id,
            inspirations = inspirations.len(),
            "parent sampled"
        );

        self.phase = GenerationPhase::Propose;
        let patches = self.propose_all(&parent, &inspirations).await;
        let proposals_received = patches.iter().filter(|p| p.is_some()).count();
        let proposal_failures = patches.len() - proposals_received;

        self.phase = GenerationPhase::Patch;
        let mut patches_rejected = 0;
        let mut patched = Vec::with_capacity(proposals_received);
        for (child, patch) in patches.into_iter().enumerate() {
            let Some(patch) = patch else { continue };
            let outcome = self.patcher.apply(&parent.code, &patch);
            match outcome.error() {
                Some(PatchError::Malformed(reason)) => {
                    self.metrics.patches_malformed += 1;
                    patches_rejected += 1;
                    debug!(child, %reason, "malformed patch");
                }
                Some(PatchError::NoMatch) => {
                    self.metrics.patches_unmatched += 1;
                    patches_rejected += 1;
                    debug!(child, "patch matched nothing");
                }
                None => {}
            }
            patched.push(Candidate {
                child,
                code: outcome.into_program(),
            });
        }

        self.phase = GenerationPhase::Filter;
        let before = patched.len();
        let candidates: Vec<Candidate> = patched
            .into_iter()
            .filter(|c| c.code != parent.code)
            .collect();
        let noops_filtered = before - candidates.len();
        self.metrics.noops_filtered += noops_filtered as u64;

        self.phase = GenerationPhase::Evaluate;
        let scores = self.evaluate_all(&candidates).await;

        self.phase = GenerationPhase::Commit;
        let first = self.store().next_sequence();
        let records: Vec<ProgramRecord> = candidates
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(offset, (candidate, score))| {
                debug!(child = candidate.child, "child ready to commit");
                ProgramRecord::new(candidate.code, first + offset as u64)
                    .with_parent(parent.id)
                    .with_score(score.normalized())
                    .with_note(NOTE_LLM_MUTATION)
            })
            .collect();
        let committed: Vec<ProgramId> = records.iter().map(|r| r.id).collect();
        self.database.commit_generation(records)?;

        self.metrics.records_committed += committed.len() as u64;
        self.metrics.generations_completed += 1;
        if let Some(best) = self
            .store()
            .best(&self.config.primary_metric)
            .and_then(|r| r.metric(&self.config.primary_metric))
        {
            self.metrics.record_best(best);
        }

        let report = GenerationReport {
            generation: self.generation,
            parent_id: parent.id,
            inspiration_ids: inspirations.iter().map(|r| r.id).collect(),
            proposals_received,
            proposal_failures,
            patches_rejected,
            noops_filtered,
            committed,
        };
        info!(
            parent_id = %report.parent_id,
            committed = report.committed.len(),
            noops = report.noops_filtered,
            failures = report.proposal_failures,
            programs = self.store().len(),
            "generation complete"
        );
        self.generation += 1;
        Ok(report)
    }

    /// Request one patch per child concurrently. Slot `i` holds child `i`'s
    /// patch, or `None` if every attempt failed.
    async fn propose_all(
        &mut self,
        parent: &Arc<ProgramRecord>,
        inspirations: &Arc<[ProgramRecord]>,
    ) -> Vec<Option<String>> {
        let children = self.config.children_per_generation;
        let timeout = self.config.proposal_timeout();
        let retries = self.config.proposal_retries;
        let backoff = self.config.retry_backoff();

        let mut tasks = JoinSet::new();
        for child in 0..children {
            let proposer = self.proposer.clone();
            let parent = parent.clone();
            let inspirations = inspirations.clone();
            tasks.spawn(async move {
                propose_with_retry(proposer, &parent, &inspirations, child, timeout, retries, backoff)
                    .await
            });
        }
        self.metrics.proposals_requested += children as u64;

        let mut slots: Vec<Option<String>> = vec![None; children];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(attempt) => {
                    self.metrics.proposal_retries += u64::from(attempt.retries);
                    match attempt.result {
                        Ok(patch) => slots[attempt.child] = Some(patch),
                        Err(e) => {
                            self.metrics.proposal_failures += 1;
                            warn!(child = attempt.child, error = %e, "proposal dropped");
                        }
                    }
                }
                Err(e) => {
                    self.metrics.proposal_failures += 1;
                    warn!(error = %e, "proposal task failed");
                }
            }
        }
        slots
    }

    /// Evaluate every candidate concurrently; the result at index `i` is the
    /// score of `candidates[i]`.
    async fn evaluate_all(&mut self, candidates: &[Candidate]) -> Vec<ScoreMap> {
        let timeout = self.config.evaluation_timeout();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_evaluations));

        let mut tasks = JoinSet::new();
        for (slot, candidate) in candidates.iter().enumerate() {
            let evaluator = self.evaluator.clone();
            let permits = permits.clone();
            let code = candidate.code.clone();
            let child = candidate.child;
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                match tokio::time::timeout(timeout, evaluator.evaluate(&code)).await {
                    Ok(score) => (slot, score, false),
                    Err(_) => {
                        warn!(child, limit_ms = timeout.as_millis() as u64, "evaluation timed out");
                        let reason = format!("evaluation timed out after {} ms", timeout.as_millis());
                        (slot, evaluator.failure_score(&reason), true)
                    }
                }
            });
        }

        let mut slots: Vec<Option<ScoreMap>> = vec![None; candidates.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, score, aborted)) => {
                    if aborted {
                        self.metrics.evaluations_aborted += 1;
                    }
                    slots[slot] = Some(score);
                }
                Err(e) => warn!(error = %e, "evaluation task failed"),
            }
        }
        self.metrics.candidates_evaluated += candidates.len() as u64;

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    self.metrics.evaluations_aborted += 1;
                    self.evaluator.failure_score("evaluation task crashed")
                })
            })
            .collect()
    }
}

async fn propose_with_retry(
    proposer: Arc<dyn Proposer>,
    parent: &ProgramRecord,
    inspirations: &[ProgramRecord],
    child: usize,
    timeout: Duration,
    retries: u32,
    backoff: Duration,
) -> ProposalAttempt {
    let mut attempt = 0u32;
    loop {
        let result = match tokio::time::timeout(timeout, proposer.propose(parent, inspirations)).await {
            Ok(result) => result,
            Err(_) => Err(ProposerError::Timeout(timeout.as_millis() as u64)),
        };
        match result {
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                debug!(child, attempt, error = %e, "retrying proposal");
                tokio::time::sleep(backoff * attempt).await;
            }
            result => {
                return ProposalAttempt {
                    child,
                    result,
                    retries: attempt,
                }
            }
        }
    }
}
