use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::trace;

use super::{ObjectStore, validate_object_id};
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

/// Thread-safe in-memory object store.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use s3gate_core::storage::{InMemoryObjectStore, ObjectStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryObjectStore::new();
/// store.store("hello.txt", Bytes::from("hello")).await.unwrap();
/// assert_eq!(store.fetch("hello.txt").await.unwrap().as_ref(), b"hello");
/// # });
/// ```
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<String, StoredObject>,
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects_count", &self.objects.len())
            .finish()
    }
}

impl InMemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn get(&self, id: &str) -> StorageResult<StoredObject> {
        validate_object_id(id)?;
        self.objects
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound { id: id.to_owned() })
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn fetch(&self, id: &str) -> StorageResult<Bytes> {
        self.get(id).map(|obj| obj.data)
    }

    async fn stat_time(&self, id: &str) -> StorageResult<DateTime<Utc>> {
        self.get(id).map(|obj| obj.last_modified)
    }

    async fn store(&self, id: &str, data: Bytes) -> StorageResult<()> {
        validate_object_id(id)?;
        trace!(id, size = data.len(), "storing object in memory");
        self.objects.insert(
            id.to_owned(),
            StoredObject {
                data,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }
}
