use crate::error::StoreResult;
use crate::persistence::{InMemorySnapshot, SnapshotPersistence};
use crate::store::ProgramStore;
use maple_evolve_types::{ProgramId, ProgramRecord};
use tracing::{debug, info};

/// Single-writer handle over a [`ProgramStore`] and its persistence.
///
/// A batch is validated and appended in place, then persisted as one
/// snapshot. If the write fails the batch is truncated away again, so a
/// caller never observes memory ahead of disk.
pub struct ProgramDatabase {
    store: ProgramStore,
    persistence: Box<dyn SnapshotPersistence>,
}

impl ProgramDatabase {
    /// Load the persisted store, or start empty if nothing was saved.
    pub fn open(persistence: impl SnapshotPersistence + 'static) -> StoreResult<Self> {
        let store = match persistence.load()? {
            Some(snapshot) => ProgramStore::restore(snapshot)?,
            None => ProgramStore::new(),
        };
        info!(programs = store.len(), "program database opened");
        Ok(Self {
            store,
            persistence: Box::new(persistence),
        })
    }

    /// Open the store and, if it is empty, seed it with one root program.
    pub fn open_or_seed(
        persistence: impl SnapshotPersistence + 'static,
        task: Option<String>,
        seed_code: &str,
    ) -> StoreResult<Self> {
        let mut db = Self::open(persistence)?;
        if db.store.is_empty() {
            let mut staged = match task {
                Some(task) => ProgramStore::with_task(task),
                None => ProgramStore::new(),
            };
            let id = staged.seed(seed_code)?;
            db.persistence.save(&staged.view())?;
            db.store = staged;
            info!(seed_id = %id, "program database seeded");
        }
        Ok(db)
    }

    /// An unpersisted database for tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            store: ProgramStore::new(),
            persistence: Box::new(InMemorySnapshot::new()),
        }
    }

    /// Wrap an existing store; nothing is written until the next commit.
    pub fn from_store(store: ProgramStore, persistence: impl SnapshotPersistence + 'static) -> Self {
        Self {
            store,
            persistence: Box::new(persistence),
        }
    }

    pub fn store(&self) -> &ProgramStore {
        &self.store
    }

    /// Commit a root program and persist.
    pub fn seed(&mut self, code: &str) -> StoreResult<ProgramId> {
        let mark = self.store.len();
        let id = self.store.seed(code)?;
        self.persist_from(mark)?;
        Ok(id)
    }

    /// Append one generation's records and persist a single snapshot.
    ///
    /// Either every record becomes visible and durable, or none does.
    pub fn commit_generation(&mut self, records: Vec<ProgramRecord>) -> StoreResult<usize> {
        let count = records.len();
        if count == 0 {
            return Ok(0);
        }
        let mark = self.store.len();
        self.store.commit_batch(records)?;
        self.persist_from(mark)?;
        debug!(committed = count, total = self.store.len(), "generation committed");
        Ok(count)
    }

    /// Write the current state without appending anything.
    pub fn persist(&self) -> StoreResult<()> {
        self.persistence.save(&self.store.view())
    }

    /// Save the current state, dropping everything appended after `mark`
    /// if the write fails.
    fn persist_from(&mut self, mark: usize) -> StoreResult<()> {
        if let Err(e) = self.persistence.save(&self.store.view()) {
            self.store.truncate(mark);
            return Err(e);
        }
        Ok(())
    }
}
