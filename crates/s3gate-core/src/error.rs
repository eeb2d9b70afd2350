//! Storage error types.

/// Errors returned by an [`ObjectStore`](crate::storage::ObjectStore).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No object is stored under this identifier.
    #[error("The specified object does not exist: {id}")]
    NotFound {
        /// The identifier that was not found.
        id: String,
    },

    /// The identifier cannot name an object (empty, `.`/`..`, or contains a separator).
    #[error("Invalid object identifier: {id:?}")]
    InvalidObjectId {
        /// The rejected identifier.
        id: String,
    },

    /// The backend failed to read or write.
    #[error("storage I/O error on {id}: {source}")]
    Io {
        /// The object being accessed.
        id: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Wrap an I/O error, mapping `NotFound` to [`StorageError::NotFound`].
    pub fn from_io(id: impl Into<String>, source: std::io::Error) -> Self {
        let id = id.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { id }
        } else {
            Self::Io { id, source }
        }
    }
}

/// Convenience result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
