//! On-disk storage for the checkpointed snapshot, so a game survives a process restart.

use crate::engine::LifecycleSnapshot;
use crate::error::{Result, TiltMazeError};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads and writes a single snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved snapshot. A missing file means there is nothing to restore.
    pub fn load(&self) -> Result<Option<LifecycleSnapshot>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(TiltMazeError::file_error(
                    format!("reading {}", self.path.display()),
                    err,
                ))
            }
        };
        LifecycleSnapshot::from_toml(&text).map(Some)
    }

    /// Persist `snapshot`, replacing any previous one atomically.
    pub fn save(&self, snapshot: &LifecycleSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                TiltMazeError::file_error(format!("creating {}", parent.display()), e)
            })?;
        }

        let staging = self.path.with_extension("toml.tmp");
        fs::write(&staging, snapshot.to_toml()?).map_err(|e| {
            TiltMazeError::file_error(format!("writing {}", staging.display()), e)
        })?;
        fs::rename(&staging, &self.path).map_err(|e| {
            TiltMazeError::file_error(format!("replacing {}", self.path.display()), e)
        })?;
        debug!("snapshot saved to {}", self.path.display());
        Ok(())
    }

    /// Remove the saved snapshot, if any.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(TiltMazeError::file_error(
                format!("removing {}", self.path.display()),
                err,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_nothing_to_restore() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.toml"));
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn save_creates_parent_and_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/state/snapshot.toml"));

        let mut first = LifecycleSnapshot::new();
        first.put_int("map", 0);
        store.save(&first).unwrap();

        let mut second = LifecycleSnapshot::new();
        second.put_int("map", 2);
        second.put_pairs("goals", vec![(3, 4)]);
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));
        assert!(!store.path().with_extension("toml.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.toml");
        fs::write(&path, "this is [not toml").unwrap();

        let store = SnapshotStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(TiltMazeError::SnapshotError { .. })
        ));

        store.clear().unwrap();
        assert!(!path.exists());
    }
}
