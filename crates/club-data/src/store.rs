//! Atomic JSON persistence for one club's catalog and round state.
//!
//! Each club owns a directory holding `catalog.json` and `state.json`.
//! Writes serialize to a temp file in the same directory and rename over the
//! target, so a reader never observes a torn file. One mutex per store
//! serializes every read and write within the process; contention is
//! negligible at chat-message rates.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::DataError;
use crate::state::RoundState;

/// Catalog file name inside a club directory.
pub const CATALOG_FILE: &str = "catalog.json";
/// Round state file name inside a club directory.
pub const STATE_FILE: &str = "state.json";

/// File-backed store for one club.
#[derive(Debug)]
pub struct ClubStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl ClubStore {
    /// Create a store rooted at the club's directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// The club's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Load the catalog. A missing file is an error: the catalog is seeded
    /// externally and the bot never invents one.
    pub fn load_catalog(&self) -> Result<Catalog, DataError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        read_json(&self.catalog_path())
    }

    /// Persist the catalog atomically.
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<(), DataError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        write_json_atomic(&self.catalog_path(), catalog)
    }

    /// Load the round state. A missing file yields the zero state; a file
    /// that does not decode is corrupt and surfaces as such.
    pub fn load_state(&self) -> Result<RoundState, DataError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.state_path();
        if !path.exists() {
            debug!(path = %path.display(), "No state file, starting from zero state");
            return Ok(RoundState::default());
        }
        read_json(&path)
    }

    /// Persist the round state atomically.
    pub fn save_state(&self, state: &RoundState) -> Result<(), DataError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        write_json_atomic(&self.state_path(), state)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| DataError::Corrupt {
        path: path.display().to_string(),
        source,
    })
}

/// Write `value` as pretty JSON via a sibling temp file and an atomic rename.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), DataError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    // Temp file in the same directory, so the rename stays on one filesystem.
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    let json = serde_json::to_vec_pretty(value).map_err(|source| DataError::Corrupt {
        path: path.display().to_string(),
        source,
    })?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| DataError::Io(e.error))?;
    Ok(())
}
