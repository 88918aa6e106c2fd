//! Snapshot persistence: save and load the store across restarts.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{SnapshotView, StoreSnapshot};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Durable storage for store snapshots.
///
/// `save` replaces the whole document; a failed save must leave the
/// previously saved snapshot readable.
pub trait SnapshotPersistence: Send + Sync {
    fn save(&self, snapshot: &SnapshotView<'_>) -> StoreResult<()>;

    /// Returns `None` if nothing has been saved yet.
    fn load(&self) -> StoreResult<Option<StoreSnapshot>>;
}

/// JSON-file snapshot persistence.
///
/// Writes go to a `.tmp` sibling which is synced and renamed over the target.
pub struct JsonFileSnapshot {
    path: PathBuf,
}

impl JsonFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotPersistence for JsonFileSnapshot {
    fn save(&self, snapshot: &SnapshotView<'_>) -> StoreResult<()> {
        let json = snapshot.to_json()?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), programs = snapshot.len(), "snapshot saved");
        Ok(())
    }

    fn load(&self) -> StoreResult<Option<StoreSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        StoreSnapshot::from_json(&contents).map(Some)
    }
}

/// In-memory snapshot persistence (for testing).
///
/// Keeps the serialized document, so loads go through the same JSON path
/// as the file backend.
#[derive(Default)]
pub struct InMemorySnapshot {
    data: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl InMemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SnapshotPersistence for InMemorySnapshot {
    fn save(&self, snapshot: &SnapshotView<'_>) -> StoreResult<()> {
        let json = snapshot.to_json()?;
        let mut data = self
            .data
            .lock()
            .map_err(|_| StoreError::Persistence("snapshot lock poisoned".to_string()))?;
        *data = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> StoreResult<Option<StoreSnapshot>> {
        let data = self
            .data
            .lock()
            .map_err(|_| StoreError::Persistence("snapshot lock poisoned".to_string()))?;
        data.as_deref().map(StoreSnapshot::from_json).transpose()
    }
}

impl<T: SnapshotPersistence + ?Sized> SnapshotPersistence for std::sync::Arc<T> {
    fn save(&self, snapshot: &SnapshotView<'_>) -> StoreResult<()> {
        (**self).save(snapshot)
    }

    fn load(&self) -> StoreResult<Option<StoreSnapshot>> {
        (**self).load()
    }
}
