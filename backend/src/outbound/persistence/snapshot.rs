//! JSON snapshot files under a capability-scoped directory.
//!
//! The storage collaborator keeps each collection in one JSON document.
//! Writes go to a temporary file first and are renamed into place, so a
//! crash mid-write never leaves a half-updated snapshot behind.

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised by the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem access failed.
    #[error("snapshot i/o failed for {name}: {message}")]
    Io {
        /// Snapshot file name.
        name: String,
        /// Underlying failure detail.
        message: String,
    },
    /// A snapshot file holds data that does not parse or validate.
    #[error("snapshot {name} is corrupt: {message}")]
    Corrupt {
        /// Snapshot file name.
        name: String,
        /// Parser or validation failure detail.
        message: String,
    },
}

/// Whole-document JSON store over one directory.
pub struct SnapshotStore {
    dir: Dir,
}

impl SnapshotStore {
    /// Open a store rooted at `path`, creating the directory if needed.
    ///
    /// # Errors
    /// [`SnapshotError::Io`] when the directory cannot be created or opened.
    pub fn open(path: &std::path::Path) -> Result<Self, SnapshotError> {
        std::fs::create_dir_all(path).map_err(|err| SnapshotError::Io {
            name: path.display().to_string(),
            message: err.to_string(),
        })?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| {
            SnapshotError::Io {
                name: path.display().to_string(),
                message: err.to_string(),
            }
        })?;
        Ok(Self { dir })
    }

    /// Read and parse a snapshot, returning `None` when the file is absent.
    ///
    /// # Errors
    /// [`SnapshotError::Io`] on read failures other than absence and
    /// [`SnapshotError::Corrupt`] when the JSON does not parse.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, SnapshotError> {
        let bytes = match self.dir.read(name) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SnapshotError::Io {
                    name: name.to_owned(),
                    message: err.to_string(),
                });
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| SnapshotError::Corrupt {
                name: name.to_owned(),
                message: err.to_string(),
            })
    }

    /// Serialise and atomically replace a snapshot.
    ///
    /// # Errors
    /// [`SnapshotError::Io`] when the write or rename fails and
    /// [`SnapshotError::Corrupt`] when the value does not serialise.
    pub fn store<T: Serialize>(&self, name: &str, value: &T) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|err| SnapshotError::Corrupt {
            name: name.to_owned(),
            message: err.to_string(),
        })?;
        let staging = format!("{name}.tmp");
        self.dir
            .write(&staging, &bytes)
            .map_err(|err| SnapshotError::Io {
                name: name.to_owned(),
                message: err.to_string(),
            })?;
        self.dir
            .rename(&staging, &self.dir, name)
            .map_err(|err| SnapshotError::Io {
                name: name.to_owned(),
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        label: String,
        count: u32,
    }

    fn open_store(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::open(dir.path()).expect("store opens")
    }

    #[rstest]
    fn absent_snapshots_load_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = open_store(&dir);
        let loaded: Option<Sample> = store.load("missing.json").expect("load succeeds");
        assert!(loaded.is_none());
    }

    #[rstest]
    fn snapshots_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = open_store(&dir);
        let value = Sample {
            label: "hazards".to_owned(),
            count: 3,
        };

        store.store("sample.json", &value).expect("store succeeds");
        let loaded: Option<Sample> = store.load("sample.json").expect("load succeeds");
        assert_eq!(loaded, Some(value));
    }

    #[rstest]
    fn writes_replace_rather_than_append() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = open_store(&dir);
        for count in 0..3 {
            store
                .store(
                    "sample.json",
                    &Sample {
                        label: "hazards".to_owned(),
                        count,
                    },
                )
                .expect("store succeeds");
        }

        let loaded: Option<Sample> = store.load("sample.json").expect("load succeeds");
        assert_eq!(loaded.map(|sample| sample.count), Some(2));
        // The staging file never survives a completed write.
        assert!(!dir.path().join("sample.json.tmp").exists());
    }

    #[rstest]
    fn corrupt_snapshots_are_reported_not_swallowed() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("sample.json"), b"not json").expect("seed file");
        let store = open_store(&dir);

        let err = store
            .load::<Sample>("sample.json")
            .expect_err("corrupt snapshot fails");
        assert!(matches!(err, SnapshotError::Corrupt { .. }));
    }
}
