//! Request routing: virtual hosting resolution and operation identification.
//!
//! The gateway serves a single bucket, so paths are short:
//!
//! | Path | GET | PUT |
//! |------|-----|-----|
//! | `/` | `GetBucketLocation` | unsupported |
//! | `/{id}` | `GetObject` | `PutObject` (no token) |
//! | `/{id}/{token}` | `GetObject` (token ignored) | `PutObject` |
//!
//! Any other method maps to [`ObjectOperation::Unsupported`]; deeper paths are
//! rejected with `InvalidRequest`.

use std::fmt;

use http::Method;
use percent_encoding::percent_decode_str;

use crate::error::{GatewayError, GatewayErrorCode};

/// What an authorized request asks the gateway to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOperation {
    /// Read an object.
    GetObject {
        /// Object identifier.
        id: String,
    },
    /// Store an object.
    PutObject {
        /// Object identifier.
        id: String,
        /// Write token carried in the path, if any.
        token: Option<String>,
    },
    /// Describe the bucket location.
    GetBucketLocation,
    /// A method the gateway does not handle.
    Unsupported {
        /// The rejected method.
        method: Method,
    },
}

impl ObjectOperation {
    /// Operation name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetObject { .. } => "GetObject",
            Self::PutObject { .. } => "PutObject",
            Self::GetBucketLocation => "GetBucketLocation",
            Self::Unsupported { .. } => "Unsupported",
        }
    }

    /// The object the operation targets, if any.
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        match self {
            Self::GetObject { id } | Self::PutObject { id, .. } => Some(id),
            Self::GetBucketLocation | Self::Unsupported { .. } => None,
        }
    }
}

impl fmt::Display for ObjectOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of routing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingContext {
    /// The identified operation.
    pub operation: ObjectOperation,
    /// Bucket taken from the `Host` header when virtual hosting is enabled.
    pub bucket: Option<String>,
}

/// Maps requests to [`ObjectOperation`]s.
#[derive(Debug, Clone)]
pub struct GatewayRouter {
    /// The base domain for virtual-hosted-style requests (e.g., `s3.localhost`).
    pub domain: String,
    /// Whether to take the bucket name from the `Host` header.
    pub virtual_hosting: bool,
}

impl GatewayRouter {
    /// Create a new router with the given domain and virtual hosting setting.
    #[must_use]
    pub fn new(domain: impl Into<String>, virtual_hosting: bool) -> Self {
        Self {
            domain: domain.into(),
            virtual_hosting,
        }
    }

    /// Resolve request parts to a routing context.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the path has more than two segments or an
    /// empty object identifier.
    pub fn resolve(&self, parts: &http::request::Parts) -> Result<RoutingContext, GatewayError> {
        let bucket = if self.virtual_hosting {
            extract_virtual_host_bucket(&parts.headers, &self.domain)
        } else {
            None
        };

        let path = parts.uri.path();
        let operation = match parse_path(path)? {
            None => match parts.method {
                Method::GET => ObjectOperation::GetBucketLocation,
                _ => ObjectOperation::Unsupported {
                    method: parts.method.clone(),
                },
            },
            Some((id, token)) => match parts.method {
                Method::GET => ObjectOperation::GetObject { id },
                Method::PUT => ObjectOperation::PutObject { id, token },
                _ => ObjectOperation::Unsupported {
                    method: parts.method.clone(),
                },
            },
        };

        Ok(RoutingContext { operation, bucket })
    }
}

/// Extract the bucket name from a virtual-hosted-style Host header.
///
/// For example, if the domain is `s3.localhost` and the Host header is
/// `mybucket.s3.localhost:8000`, this returns `Some("mybucket")`.
fn extract_virtual_host_bucket(headers: &http::HeaderMap, domain: &str) -> Option<String> {
    let host = headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())?;

    let host_without_port = host.split(':').next().unwrap_or(host);

    let suffix = format!(".{domain}");
    host_without_port
        .strip_suffix(&suffix)
        .filter(|bucket| !bucket.is_empty())
        .map(ToOwned::to_owned)
}

/// Split the path into an object id and optional token.
///
/// Returns `None` for the bucket root.
fn parse_path(path: &str) -> Result<Option<(String, Option<String>)>, GatewayError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut segments = trimmed.split('/');
    let id = segments.next().unwrap_or_default();
    let token = segments.next().filter(|t| !t.is_empty());

    if segments.next().is_some() {
        return Err(
            GatewayError::new(
                GatewayErrorCode::InvalidRequest,
                "Path must be /{id} or /{id}/{token}",
            )
            .with_resource(path),
        );
    }
    if id.is_empty() {
        return Err(
            GatewayError::new(GatewayErrorCode::InvalidRequest, "Missing object identifier")
                .with_resource(path),
        );
    }

    Ok(Some((
        decode_uri_component(id),
        token.map(decode_uri_component),
    )))
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
