use crate::error::{StoreError, StoreResult};
use crate::snapshot::{SnapshotView, StoreSnapshot, SNAPSHOT_VERSION};
use maple_evolve_types::{ProgramId, ProgramRecord};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// A sampled parent with its inspiration peers.
#[derive(Clone, Debug)]
pub struct Sample {
    pub parent: ProgramRecord,
    /// Distinct records other than the parent.
    pub inspirations: Vec<ProgramRecord>,
}

/// In-memory, append-only program store.
#[derive(Clone, Debug, Default)]
pub struct ProgramStore {
    task: Option<String>,
    records: Vec<ProgramRecord>,
    index: HashMap<ProgramId, usize>,
}

impl ProgramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store carrying a task description for prompt building.
    pub fn with_task(task: impl Into<String>) -> Self {
        Self {
            task: Some(task.into()),
            ..Self::default()
        }
    }

    pub fn task(&self) -> Option<&str> {
        self.task.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[ProgramRecord] {
        &self.records
    }

    pub fn get(&self, id: &ProgramId) -> Option<&ProgramRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &ProgramId) -> bool {
        self.index.contains_key(id)
    }

    /// Sequence number for the next record.
    pub fn next_sequence(&self) -> u64 {
        self.records.last().map_or(0, |r| r.created_at + 1)
    }

    /// Commit a root record holding `code`.
    pub fn seed(&mut self, code: impl Into<String>) -> StoreResult<ProgramId> {
        let record = ProgramRecord::seed(code, self.next_sequence());
        let id = record.id;
        self.commit(record)?;
        Ok(id)
    }

    /// Append a single record. On error the store is unchanged.
    pub fn commit(&mut self, record: ProgramRecord) -> StoreResult<()> {
        self.commit_batch(vec![record])
    }

    /// Append a batch atomically: either every record is appended or none.
    ///
    /// Parents may be earlier members of the same batch. Scores must be
    /// finite, since the persisted document cannot represent NaN or infinity.
    pub fn commit_batch(&mut self, records: Vec<ProgramRecord>) -> StoreResult<()> {
        let mut staged: HashSet<ProgramId> = HashSet::with_capacity(records.len());
        let mut previous = self.records.last().map(|r| r.created_at);

        for record in &records {
            if self.index.contains_key(&record.id) || !staged.insert(record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
            if let Some(metric) = record.score.non_finite_metric() {
                return Err(StoreError::NonFiniteScore {
                    id: record.id,
                    metric: metric.to_string(),
                });
            }
            if let Some(parent) = record.parent_id {
                if !self.index.contains_key(&parent) && !staged.contains(&parent) {
                    return Err(StoreError::DanglingParent {
                        child: record.id,
                        parent,
                    });
                }
            }
            if let Some(prev) = previous {
                if record.created_at <= prev {
                    return Err(StoreError::OutOfOrder {
                        id: record.id,
                        created_at: record.created_at,
                        previous: prev,
                    });
                }
            }
            previous = Some(record.created_at);
        }

        for record in records {
            self.index.insert(record.id, self.records.len());
            self.records.push(record);
        }
        Ok(())
    }

    /// Pick a parent uniformly at random, then up to `k` distinct
    /// inspirations uniformly without replacement from the other records.
    pub fn sample_parent_and_inspirations<R: Rng>(
        &self,
        k: usize,
        rng: &mut R,
    ) -> StoreResult<Sample> {
        if self.records.is_empty() {
            return Err(StoreError::Empty);
        }

        let parent_idx = rng.gen_range(0..self.records.len());
        let others = self.records.len() - 1;
        let picks = rand::seq::index::sample(rng, others, k.min(others));

        // Indices are drawn over the records with the parent removed.
        let inspirations = picks
            .into_iter()
            .map(|i| if i >= parent_idx { i + 1 } else { i })
            .map(|i| self.records[i].clone())
            .collect();

        Ok(Sample {
            parent: self.records[parent_idx].clone(),
            inspirations,
        })
    }

    /// Record with the highest value for `metric`; ties go to the earliest.
    pub fn best(&self, metric: &str) -> Option<&ProgramRecord> {
        let mut best: Option<(&ProgramRecord, f64)> = None;
        for record in &self.records {
            let Some(value) = record.metric(metric) else {
                continue;
            };
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((record, value)),
            }
        }
        best.map(|(record, _)| record)
    }

    /// Direct children of `id`, in insertion order.
    pub fn children_of(&self, id: &ProgramId) -> Vec<&ProgramRecord> {
        self.records
            .iter()
            .filter(|r| r.parent_id.as_ref() == Some(id))
            .collect()
    }

    /// Ancestry of `id`, root first and ending with the record itself.
    /// Empty if the id is unknown.
    pub fn lineage(&self, id: &ProgramId) -> Vec<&ProgramRecord> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id);
        while let Some(record) = cursor {
            chain.push(record);
            cursor = record.parent_id.as_ref().and_then(|p| self.get(p));
        }
        chain.reverse();
        chain
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.view().to_owned_snapshot()
    }

    /// The persisted document, borrowing the live record list.
    pub fn view(&self) -> SnapshotView<'_> {
        SnapshotView {
            version: SNAPSHOT_VERSION,
            task: self.task.as_deref(),
            programs: &self.records,
        }
    }

    /// Drop every record from position `len` on. Only the database uses
    /// this, to undo a batch whose snapshot could not be written.
    pub(crate) fn truncate(&mut self, len: usize) {
        for record in self.records.drain(len.min(self.records.len())..) {
            self.index.remove(&record.id);
        }
    }

    /// Rebuild a store from a snapshot, validating every invariant first.
    pub fn restore(snapshot: StoreSnapshot) -> StoreResult<Self> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported snapshot version {} (max {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let mut store = Self {
            task: snapshot.task,
            ..Self::default()
        };
        store
            .commit_batch(snapshot.programs)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(store)
    }
}
