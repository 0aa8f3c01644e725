//! JSON snapshot storage on the local filesystem.
use nomads_game::{GameState, GameStorage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid save name: {0:?}")]
    InvalidName(String),
}

/// One `<name>.json` file per save slot. Writes land in a sibling temp file
/// first and are renamed into place, so a crash never leaves half a save.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn slot_path(&self, save_name: &str) -> Result<PathBuf, StorageError> {
        let valid = !save_name.is_empty()
            && save_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidName(save_name.to_string()));
        }
        Ok(self.root.join(format!("{save_name}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl GameStorage for FileStorage {
    type Error = StorageError;

    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name)?;
        fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;
        let payload =
            serde_json::to_vec_pretty(game_state).map_err(|source| StorageError::Json {
                path: path.clone(),
                source,
            })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
        let path = self.slot_path(save_name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path)(err)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Json { path, source })
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path)(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomads_game::NewGame;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!(
            "nomads-storage-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn saves_round_trip_and_leave_no_temp_file() {
        let root = scratch_dir();
        let storage = FileStorage::new(&root);
        let state = GameState::new(&NewGame::default()).unwrap();

        storage.save_game("slot-1", &state).unwrap();
        assert!(root.join("slot-1.json").exists());
        assert!(!root.join("slot-1.json.tmp").exists());
        assert_eq!(storage.load_game("slot-1").unwrap(), Some(state));

        storage.delete_save("slot-1").unwrap();
        assert!(storage.load_game("slot-1").unwrap().is_none());
        storage.delete_save("slot-1").unwrap();
    }

    #[test]
    fn corrupt_saves_surface_json_errors() {
        let root = scratch_dir();
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("broken.json"), b"{ not json").unwrap();
        let storage = FileStorage::new(&root);
        assert!(matches!(
            storage.load_game("broken"),
            Err(StorageError::Json { .. })
        ));
    }

    #[test]
    fn path_like_names_are_refused() {
        let storage = FileStorage::new(scratch_dir());
        let state = GameState::new(&NewGame::default()).unwrap();
        assert!(matches!(
            storage.save_game("../escape", &state),
            Err(StorageError::InvalidName(_))
        ));
    }
}
