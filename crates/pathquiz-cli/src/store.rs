//! File-backed snapshot store.
//!
//! One JSON file per session under a snapshot directory. Writes go to a
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous snapshot intact.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use pathquiz_kernel::{SnapshotStore, StoreError};
use pathquiz_types::SessionId;
use tracing::debug;

pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot file for a session.
    pub fn path_for(&self, session_id: &SessionId) -> Result<PathBuf, StoreError> {
        let id = session_id.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.starts_with('.');
        if !valid {
            return Err(StoreError::Unavailable(format!(
                "session id {id:?} cannot be used as a file name"
            )));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&mut self, session_id: &SessionId, snapshot: &str) -> Result<(), StoreError> {
        let path = self.path_for(session_id)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, snapshot)?;
        fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), bytes = snapshot.len(), "snapshot written");
        Ok(())
    }

    fn load(&self, session_id: &SessionId) -> Result<Option<String>, StoreError> {
        let path = self.path_for(session_id)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
