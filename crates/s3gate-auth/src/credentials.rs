//! Credential registry and the provider trait the auth gate looks keys up through.
//!
//! A [`CredentialRegistry`] is filled once during startup (it needs `&mut self`
//! to register) and is then shared read-only behind an `Arc`. There is no
//! update or delete path.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

/// A single capability a credential may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Fetch objects.
    Read,
    /// Store objects.
    Write,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Self::Read => 0b01,
            Self::Write => 0b10,
        }
    }
}

/// A set of [`Capability`] values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions(u8);

impl Permissions {
    /// No capabilities at all.
    pub const NONE: Self = Self(0);
    /// Read-only access.
    pub const READ_ONLY: Self = Self(Capability::Read.bit());
    /// Read and write access.
    pub const READ_WRITE: Self = Self(Capability::Read.bit() | Capability::Write.bit());

    /// Return a copy of this set with `capability` added.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Whether this set grants `capability`.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Shorthand for `contains(Capability::Read)`.
    #[must_use]
    pub const fn can_read(self) -> bool {
        self.contains(Capability::Read)
    }

    /// Shorthand for `contains(Capability::Write)`.
    #[must_use]
    pub const fn can_write(self) -> bool {
        self.contains(Capability::Write)
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        if self.can_read() {
            set.entry(&Capability::Read);
        }
        if self.can_write() {
            set.entry(&Capability::Write);
        }
        set.finish()
    }
}

/// One access principal.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Public identifier sent by clients in the `Authorization` header.
    pub access_key_id: String,
    /// Secret used to compute signatures. Never leaves the process.
    pub secret_access_key: String,
    /// What this principal may do.
    pub permissions: Permissions,
}

impl Credential {
    /// Create a credential.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        permissions: Permissions,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            permissions,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Lookup side of a credential store.
///
/// The auth gate only ever reads through this trait, so an implementation
/// that supports runtime updates must do its own locking.
pub trait CredentialProvider: Send + Sync {
    /// Resolve an access key ID to its credential.
    fn lookup(&self, access_key_id: &str) -> Option<Credential>;

    /// Whether the store holds no credentials at all.
    fn is_empty(&self) -> bool;
}

/// In-memory registry keyed by access key ID.
///
/// # Examples
///
/// ```
/// use s3gate_auth::credentials::{CredentialProvider, CredentialRegistry, Permissions};
///
/// let mut registry = CredentialRegistry::new();
/// registry.register_users("alice=s3cr3t;bob=hunter2", Permissions::READ_ONLY);
///
/// let alice = registry.lookup("alice").unwrap();
/// assert!(alice.permissions.can_read());
/// assert!(!alice.permissions.can_write());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CredentialRegistry {
    credentials: HashMap<String, Credential>,
}

impl CredentialRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the credential for `access_key_id`.
    ///
    /// Returns the credential that was replaced, if any.
    pub fn register(
        &mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        permissions: Permissions,
    ) -> Option<Credential> {
        let credential = Credential::new(access_key_id, secret_access_key, permissions);
        let previous = self
            .credentials
            .insert(credential.access_key_id.clone(), credential);
        if let Some(prev) = &previous {
            warn!(
                access_key_id = %prev.access_key_id,
                "credential registered twice, keeping the latest entry"
            );
        }
        previous
    }

    /// Register every `key=secret` entry of a `;`-separated list with the same
    /// permissions.
    ///
    /// Entries without exactly one `=` are skipped with a warning. Entries with
    /// an empty key (`=secret`) or an empty secret (`key=`) are skipped too:
    /// an empty secret would make every signature for that key forgeable, and
    /// an empty key can never appear in a well-formed `Authorization` header.
    /// Returns the number of credentials registered.
    pub fn register_users(&mut self, list: &str, permissions: Permissions) -> usize {
        let mut registered = 0;
        for entry in list.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let mut fields = entry.split('=');
            let parsed = match (fields.next(), fields.next(), fields.next()) {
                (Some(key), Some(secret), None) if !key.is_empty() && !secret.is_empty() => {
                    Some((key, secret))
                }
                _ => None,
            };

            let Some((access_key_id, secret)) = parsed else {
                // Never log the entry itself, it may carry a secret.
                warn!(
                    entry_len = entry.len(),
                    "skipping malformed credential entry, expected 'key=secret'"
                );
                continue;
            };

            self.register(access_key_id, secret, permissions);
            debug!(access_key_id, ?permissions, "registered credential");
            registered += 1;
        }
        registered
    }

    /// Number of registered credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether no credential has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Borrowing lookup.
    #[must_use]
    pub fn get(&self, access_key_id: &str) -> Option<&Credential> {
        self.credentials.get(access_key_id)
    }
}

impl CredentialProvider for CredentialRegistry {
    fn lookup(&self, access_key_id: &str) -> Option<Credential> {
        self.credentials.get(access_key_id).cloned()
    }

    fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
