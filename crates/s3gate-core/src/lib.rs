//! Configuration and object storage for s3gate.
//!
//! - [`config`] - [`GatewayConfig`], loaded from environment variables
//! - [`storage`] - the [`ObjectStore`] trait and its in-memory and filesystem backends
//! - [`error`] - [`StorageError`]

pub mod config;
pub mod error;
pub mod storage;

pub use config::{GatewayConfig, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use storage::{FilesystemObjectStore, InMemoryObjectStore, ObjectStore};
