use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{ObjectStore, validate_object_id};
use crate::error::{StorageError, StorageResult};

/// Object store keeping one file per object under a root directory.
///
/// Writes go to a temporary sibling file first and are renamed into place, so
/// readers never observe a partially written object. The file's modification
/// time is the object's last-modified time.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StorageError::Io {
                id: root.display().to_string(),
                source,
            })?;
        debug!(root = %root.display(), "opened filesystem object store");
        Ok(Self { root })
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &str) -> StorageResult<PathBuf> {
        validate_object_id(id)?;
        Ok(self.root.join(id))
    }
}

#[async_trait::async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn fetch(&self, id: &str) -> StorageResult<Bytes> {
        let path = self.object_path(id)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::from_io(id, e))?;
        Ok(Bytes::from(data))
    }

    async fn stat_time(&self, id: &str) -> StorageResult<DateTime<Utc>> {
        let path = self.object_path(id)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| StorageError::from_io(id, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| StorageError::from_io(id, e))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    async fn store(&self, id: &str, data: Bytes) -> StorageResult<()> {
        let path = self.object_path(id)?;
        // Keep the temp name independent of the id so long ids stay under NAME_MAX.
        let tmp_path = self
            .root
            .join(format!(".s3gate-{}.tmp", uuid::Uuid::new_v4().simple()));

        if let Err(source) = tokio::fs::write(&tmp_path, &data).await {
            return Err(StorageError::Io {
                id: id.to_owned(),
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&tmp_path, &path).await {
            if let Err(e) = tokio::fs::remove_file(&tmp_path).await {
                warn!(path = %tmp_path.display(), error = %e, "failed to remove temp file");
            }
            return Err(StorageError::Io {
                id: id.to_owned(),
                source,
            });
        }

        debug!(id, size = data.len(), path = %path.display(), "stored object");
        Ok(())
    }
}
