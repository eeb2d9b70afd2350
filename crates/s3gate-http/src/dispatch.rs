//! Object operation dispatch: executes an authorized [`ObjectOperation`].
//!
//! Capability checks happen here, after authentication, so a perfectly signed
//! request can still be refused when the credential lacks the right to read or
//! write. `PUT` additionally enforces the configured write token.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use s3gate_auth::Credential;
use s3gate_core::ObjectStore;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use crate::body::GatewayBody;
use crate::error::{GatewayError, GatewayErrorCode};
use crate::response::{bucket_location_response, compute_etag, format_http_date};
use crate::router::ObjectOperation;

/// Executes object operations against a storage backend.
pub struct ObjectDispatcher {
    store: Arc<dyn ObjectStore>,
    write_token: Option<String>,
}

impl fmt::Debug for ObjectDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDispatcher")
            .field("store", &"...")
            .field("write_token", &self.write_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ObjectDispatcher {
    /// Create a dispatcher. An empty `write_token` disables the token check.
    pub fn new(store: Arc<dyn ObjectStore>, write_token: Option<String>) -> Self {
        Self {
            store,
            write_token: write_token.filter(|t| !t.is_empty()),
        }
    }

    /// Run `op` on behalf of `credential`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] for missing capabilities, token mismatches,
    /// body read failures, backend failures, and unsupported methods.
    pub async fn dispatch<B>(
        &self,
        op: ObjectOperation,
        credential: &Credential,
        body: B,
    ) -> Result<http::Response<GatewayBody>, GatewayError>
    where
        B: http_body::Body + Send,
        B::Error: fmt::Display,
    {
        debug!(
            operation = %op,
            object = ?op.object_id(),
            access_key_id = %credential.access_key_id,
            "dispatching object operation"
        );

        match op {
            ObjectOperation::GetObject { id } => self.get_object(&id, credential).await,
            ObjectOperation::PutObject { id, token } => {
                self.put_object(&id, token.as_deref(), credential, body)
                    .await
            }
            ObjectOperation::GetBucketLocation => Ok(bucket_location_response()),
            ObjectOperation::Unsupported { method } => {
                Err(GatewayError::method_not_allowed(&method))
            }
        }
    }

    async fn get_object(
        &self,
        id: &str,
        credential: &Credential,
    ) -> Result<http::Response<GatewayBody>, GatewayError> {
        if !credential.permissions.can_read() {
            return Err(
                GatewayError::access_denied("Credential is not allowed to read objects")
                    .with_resource(id),
            );
        }

        let last_modified = self.store.stat_time(id).await?;
        let data = self.store.fetch(id).await?;

        debug!(object = id, size = data.len(), "fetched object");

        http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::LAST_MODIFIED, format_http_date(&last_modified))
            .header(http::header::CONTENT_LENGTH, data.len())
            .body(GatewayBody::from_bytes(data))
            .map_err(|e| GatewayError::internal(e.to_string()))
    }

    async fn put_object<B>(
        &self,
        id: &str,
        token: Option<&str>,
        credential: &Credential,
        body: B,
    ) -> Result<http::Response<GatewayBody>, GatewayError>
    where
        B: http_body::Body + Send,
        B::Error: fmt::Display,
    {
        if !credential.permissions.can_write() {
            return Err(
                GatewayError::access_denied("Credential is not allowed to write objects")
                    .with_resource(id),
            );
        }

        let data = collect_body(body).await?;

        if !self.token_matches(token) {
            return Err(
                GatewayError::new(GatewayErrorCode::InvalidToken, "Access forbidden")
                    .with_resource(id),
            );
        }

        let etag = compute_etag(&data);
        let size = data.len();
        self.store.store(id, data).await?;

        info!(object = id, size, etag = %etag, "stored object");

        http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::ETAG, etag)
            .body(GatewayBody::empty())
            .map_err(|e| GatewayError::internal(e.to_string()))
    }

    fn token_matches(&self, supplied: Option<&str>) -> bool {
        match &self.write_token {
            None => true,
            Some(expected) => {
                let supplied = supplied.unwrap_or_default();
                bool::from(expected.as_bytes().ct_eq(supplied.as_bytes()))
            }
        }
    }
}

/// Read the full request body into memory.
async fn collect_body<B>(body: B) -> Result<Bytes, GatewayError>
where
    B: http_body::Body + Send,
    B::Error: fmt::Display,
{
    body.collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| GatewayError::internal(format!("Failed to read request body: {e}")))
}
