//! Object storage collaborator.
//!
//! The gateway never looks at how bytes are kept; it only calls the three
//! operations of [`ObjectStore`]. Two backends ship with the crate:
//!
//! - [`InMemoryObjectStore`]: a [`DashMap`](dashmap::DashMap) of objects, for tests
//!   and throwaway deployments.
//! - [`FilesystemObjectStore`]: one file per object under a root directory.
//!
//! Object identifiers come straight from the request path, so every backend
//! validates them with [`validate_object_id`] before touching storage.

mod filesystem;
mod memory;

use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use filesystem::FilesystemObjectStore;
pub use memory::InMemoryObjectStore;

use crate::error::{StorageError, StorageResult};

/// Storage operations the gateway delegates to.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Return the full content of the object `id`.
    async fn fetch(&self, id: &str) -> StorageResult<Bytes>;

    /// Return the last-modified time of the object `id`.
    async fn stat_time(&self, id: &str) -> StorageResult<DateTime<Utc>>;

    /// Persist `data` as the object `id`, replacing any previous content.
    async fn store(&self, id: &str, data: Bytes) -> StorageResult<()>;
}

/// Reject identifiers that are empty, `.`/`..`, or contain a path separator
/// or NUL byte.
///
/// # Errors
///
/// Returns [`StorageError::InvalidObjectId`] for any rejected identifier.
pub fn validate_object_id(id: &str) -> StorageResult<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidObjectId { id: id.to_owned() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_plain_identifiers() {
        for id in ["obj1", "photo.jpg", "a b", "..hidden", "ünïcode"] {
            assert!(validate_object_id(id).is_ok(), "id: {id}");
        }
    }

    #[test]
    fn test_should_reject_path_like_identifiers() {
        for id in ["", ".", "..", "a/b", "..\\x", "nul\0byte"] {
            assert!(
                matches!(
                    validate_object_id(id),
                    Err(StorageError::InvalidObjectId { .. })
                ),
                "id: {id:?}"
            );
        }
    }
}
