//! Gateway configuration.
//!
//! Provides [`GatewayConfig`]. Values are loaded from environment variables;
//! secrets (the write token and the user lists) are never serialized and are
//! redacted from `Debug` output.

use std::fmt;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Which [`ObjectStore`](crate::storage::ObjectStore) implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Objects stored as files under [`GatewayConfig::data_dir`].
    #[default]
    Filesystem,
    /// Objects kept in process memory; lost on restart.
    Memory,
}

impl StorageBackend {
    /// Parse a backend name, accepting `fs`/`filesystem` and `memory`/`mem`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fs" | "filesystem" => Some(Self::Filesystem),
            "mem" | "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Gateway configuration.
///
/// # Examples
///
/// ```
/// use s3gate_core::config::GatewayConfig;
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:8000");
/// assert!(config.write_token().is_none());
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address (e.g. `"0.0.0.0:8000"`).
    #[builder(default = String::from("0.0.0.0:8000"))]
    pub gateway_listen: String,

    /// Root directory of the filesystem storage backend.
    #[builder(default = String::from("/files"))]
    pub data_dir: String,

    /// Storage backend selection.
    #[builder(default)]
    pub storage_backend: StorageBackend,

    /// Token that must appear in the path of every PUT. Empty disables the check.
    #[builder(default)]
    #[serde(skip_serializing, default)]
    pub write_token: String,

    /// `key=secret;...` list of read-write credentials.
    #[builder(default)]
    #[serde(skip_serializing, default)]
    pub read_write_users: String,

    /// `key=secret;...` list of read-only credentials.
    #[builder(default)]
    #[serde(skip_serializing, default)]
    pub read_only_users: String,

    /// Whether the bucket is taken from the `Host` header when canonicalizing.
    #[builder(default = false)]
    pub virtual_hosting: bool,

    /// Base domain for virtual-hosted-style addressing.
    #[builder(default = String::from("s3.localhost"))]
    pub domain: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("gateway_listen", &self.gateway_listen)
            .field("data_dir", &self.data_dir)
            .field("storage_backend", &self.storage_backend)
            .field("write_token", &redacted(&self.write_token))
            .field("read_write_users", &redacted(&self.read_write_users))
            .field("read_only_users", &redacted(&self.read_only_users))
            .field("virtual_hosting", &self.virtual_hosting)
            .field("domain", &self.domain)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:8000` |
    /// | `SERVER_PORT` | *(unset; sets the port when `GATEWAY_LISTEN` is unset)* |
    /// | `DATA_FOLDER` | `/files` |
    /// | `STORAGE_BACKEND` | `filesystem` |
    /// | `WRITE_TOKEN` | *(empty)* |
    /// | `S3_READ_WRITE_USERS` | *(empty)* |
    /// | `S3_READ_ONLY_USERS` | *(empty)* |
    /// | `S3_VIRTUAL_HOSTING` | `false` |
    /// | `S3_DOMAIN` | `s3.localhost` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        } else if let Some(port) = lookup("SERVER_PORT").and_then(|v| v.trim().parse::<u16>().ok())
        {
            config.gateway_listen = format!("0.0.0.0:{port}");
        }
        if let Some(v) = lookup("DATA_FOLDER") {
            config.data_dir = v;
        }
        if let Some(backend) = lookup("STORAGE_BACKEND").and_then(|v| StorageBackend::parse(&v)) {
            config.storage_backend = backend;
        }
        if let Some(v) = lookup("WRITE_TOKEN") {
            config.write_token = v;
        }
        if let Some(v) = lookup("S3_READ_WRITE_USERS") {
            config.read_write_users = v;
        }
        if let Some(v) = lookup("S3_READ_ONLY_USERS") {
            config.read_only_users = v;
        }
        if let Some(v) = lookup("S3_VIRTUAL_HOSTING") {
            config.virtual_hosting = parse_bool(&v);
        }
        if let Some(v) = lookup("S3_DOMAIN") {
            config.domain = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// The configured write token, or `None` when the check is disabled.
    #[must_use]
    pub fn write_token(&self) -> Option<&str> {
        (!self.write_token.is_empty()).then_some(self.write_token.as_str())
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "<redacted>" }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:8000");
        assert_eq!(config.data_dir, "/files");
        assert_eq!(config.storage_backend, StorageBackend::Filesystem);
        assert!(config.write_token().is_none());
        assert!(!config.virtual_hosting);
        assert_eq!(config.domain, "s3.localhost");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_load_from_lookup() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("GATEWAY_LISTEN", "127.0.0.1:9000"),
            ("DATA_FOLDER", "/tmp/objects"),
            ("STORAGE_BACKEND", "memory"),
            ("WRITE_TOKEN", "tok"),
            ("S3_READ_WRITE_USERS", "a=b"),
            ("S3_READ_ONLY_USERS", "c=d"),
            ("S3_VIRTUAL_HOSTING", "TRUE"),
            ("S3_DOMAIN", "example.test"),
            ("LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.gateway_listen, "127.0.0.1:9000");
        assert_eq!(config.data_dir, "/tmp/objects");
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.write_token(), Some("tok"));
        assert_eq!(config.read_write_users, "a=b");
        assert_eq!(config.read_only_users, "c=d");
        assert!(config.virtual_hosting);
        assert_eq!(config.domain, "example.test");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_should_use_server_port_when_listen_unset() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("SERVER_PORT", "8123")]));
        assert_eq!(config.gateway_listen, "0.0.0.0:8123");

        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("SERVER_PORT", "8123"),
            ("GATEWAY_LISTEN", "127.0.0.1:1"),
        ]));
        assert_eq!(config.gateway_listen, "127.0.0.1:1");
    }

    #[test]
    fn test_should_ignore_unknown_storage_backend() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("STORAGE_BACKEND", "s3")]));
        assert_eq!(config.storage_backend, StorageBackend::Filesystem);
        assert_eq!(StorageBackend::parse(" FS "), Some(StorageBackend::Filesystem));
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = GatewayConfig::builder()
            .gateway_listen("127.0.0.1:0".into())
            .storage_backend(StorageBackend::Memory)
            .write_token("secret-token".into())
            .build();

        assert_eq!(config.gateway_listen, "127.0.0.1:0");
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.write_token(), Some("secret-token"));
        assert_eq!(config.data_dir, "/files");
    }

    #[test]
    fn test_should_not_leak_secrets() {
        let config = GatewayConfig::builder()
            .write_token("tok-123".into())
            .read_write_users("alice=pw-456".into())
            .build();

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("tok-123"));
        assert!(!debug_str.contains("pw-456"));

        let json = serde_json::to_string(&config).expect("test serialization");
        assert!(json.contains("gatewayListen"));
        assert!(!json.contains("tok-123"));
        assert!(!json.contains("pw-456"));
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("True"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
    }
}
