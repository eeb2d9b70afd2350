//! Integration tests for a running s3gate server.
//!
//! These tests require a server at `localhost:8000` started with the
//! credentials below (or overridden through the environment):
//!
//! ```text
//! S3_READ_WRITE_USERS='ITRW=itrw-secret' S3_READ_ONLY_USERS='ITRO=itro-secret' \
//!   WRITE_TOKEN=it-token STORAGE_BACKEND=memory s3gate-server
//! ```
//!
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p s3gate-integration -- --ignored
//! ```

use std::sync::Once;

use chrono::Utc;
use s3gate_auth::{authorization_header, string_to_sign};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    env_or("S3GATE_ENDPOINT_URL", "http://localhost:8000")
}

/// Write token the server was started with.
#[must_use]
pub fn write_token() -> String {
    env_or("S3GATE_WRITE_TOKEN", "it-token")
}

/// An access key pair used to sign requests.
#[derive(Debug, Clone)]
pub struct TestCredential {
    /// Access key id.
    pub access_key_id: String,
    /// Secret key.
    pub secret_key: String,
}

/// The read-write credential the server was started with.
#[must_use]
pub fn read_write_credential() -> TestCredential {
    TestCredential {
        access_key_id: env_or("S3GATE_RW_ACCESS_KEY", "ITRW"),
        secret_key: env_or("S3GATE_RW_SECRET_KEY", "itrw-secret"),
    }
}

/// The read-only credential the server was started with.
#[must_use]
pub fn read_only_credential() -> TestCredential {
    TestCredential {
        access_key_id: env_or("S3GATE_RO_ACCESS_KEY", "ITRO"),
        secret_key: env_or("S3GATE_RO_SECRET_KEY", "itro-secret"),
    }
}

/// Generate a unique object id for a test.
#[must_use]
pub fn test_object_id(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Minimal SigV2 client for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for GatewayClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayClient {
    /// Create a client pointing at [`endpoint_url`].
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint_url(),
        }
    }

    /// Send a request, signed with `credential` when given.
    pub async fn send(
        &self,
        method: http::Method,
        path: &str,
        body: bytes::Bytes,
        credential: Option<&TestCredential>,
    ) -> anyhow::Result<reqwest::Response> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

        let mut request = self
            .http
            .request(method.clone(), format!("{}{path}", self.endpoint))
            .header(http::header::DATE, &date);

        if let Some(credential) = credential {
            let (parts, ()) = http::Request::builder()
                .method(method)
                .uri(path)
                .header(http::header::DATE, &date)
                .body(())?
                .into_parts();
            let sts = string_to_sign(&parts, None);
            request = request.header(
                http::header::AUTHORIZATION,
                authorization_header(&credential.access_key_id, &credential.secret_key, &sts),
            );
        }

        Ok(request.body(body).send().await?)
    }

    /// Signed `GET /{id}`.
    pub async fn get_object(
        &self,
        id: &str,
        credential: &TestCredential,
    ) -> anyhow::Result<reqwest::Response> {
        self.send(
            http::Method::GET,
            &format!("/{id}"),
            bytes::Bytes::new(),
            Some(credential),
        )
        .await
    }

    /// Signed `PUT /{id}/{token}`.
    pub async fn put_object(
        &self,
        id: &str,
        token: &str,
        data: impl Into<bytes::Bytes>,
        credential: &TestCredential,
    ) -> anyhow::Result<reqwest::Response> {
        self.send(
            http::Method::PUT,
            &format!("/{id}/{token}"),
            data.into(),
            Some(credential),
        )
        .await
    }
}

mod test_auth;
mod test_health;
mod test_object;
