//! Farm snapshot persistence.
//!
//! The engine never touches storage. The host loads a farm once at
//! startup and writes the committed baseline back after every accepted
//! action.

use std::path::{Path, PathBuf};

use homestead_types::{FarmId, GameState};

use crate::error::HostError;

/// Load and save whole-farm snapshots.
pub trait SnapshotStore {
    /// The stored state for `farm`, or `None` if it has never been saved.
    async fn load(&self, farm: FarmId) -> Result<Option<GameState>, HostError>;

    /// Replace the stored state for `farm`.
    async fn save(&self, farm: FarmId, state: &GameState) -> Result<(), HostError>;
}

/// One pretty-printed JSON file per farm under a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Store snapshots under `dir`, creating it on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshots.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, farm: FarmId) -> PathBuf {
        self.dir.join(format!("farm-{farm}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, farm: FarmId) -> Result<Option<GameState>, HostError> {
        let path = self.path(farm);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(HostError::io(path, err)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| HostError::Snapshot { path, source })
    }

    async fn save(&self, farm: FarmId, state: &GameState) -> Result<(), HostError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| HostError::io(&self.dir, err))?;

        let path = self.path(farm);
        let encoded = serde_json::to_vec_pretty(state).map_err(|source| HostError::Snapshot {
            path: path.clone(),
            source,
        })?;

        // Write beside the target and rename so a crash never leaves half a snapshot.
        let partial = path.with_extension("json.partial");
        tokio::fs::write(&partial, encoded)
            .await
            .map_err(|err| HostError::io(&partial, err))?;
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|err| HostError::io(&path, err))?;
        tracing::debug!(%farm, path = %path.display(), "Snapshot saved");
        Ok(())
    }
}
