//! Gateway error type and its HTTP mapping.
//!
//! Every failure a request can hit ends up as a [`GatewayError`]: auth denials
//! via `From<AuthError>`, backend failures via `From<StorageError>`, and the
//! dispatcher's own permission and protocol checks. Each error belongs to one
//! [`ErrorKind`], which decides how loudly it is logged.

use std::fmt;

use http::StatusCode;
use s3gate_auth::AuthError;
use s3gate_core::StorageError;

/// Coarse classification of gateway errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed request material (400/404/406).
    Client,
    /// The caller's identity could not be proven (401).
    Auth,
    /// Valid identity, insufficient rights or wrong write token (401/403).
    Permission,
    /// The storage backend failed (500).
    Backend,
    /// Unsupported method (405).
    Protocol,
}

/// Error codes written into the `<Code>` element of error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorCode {
    /// No `Authorization` header.
    MissingSecurityHeader,
    /// `Authorization` header is not `AWS <AccessKeyId>:<Signature>`.
    AuthorizationHeaderMalformed,
    /// The gateway has no credentials configured.
    NoCredentialsConfigured,
    /// Unknown access key.
    InvalidAccessKeyId,
    /// Signature mismatch.
    SignatureDoesNotMatch,
    /// The credential lacks the capability the operation needs.
    AccessDenied,
    /// The write token in the path does not match the configured one.
    InvalidToken,
    /// No such object.
    NoSuchKey,
    /// The path cannot be mapped onto an object.
    InvalidRequest,
    /// The HTTP method is not handled.
    MethodNotAllowed,
    /// Reading the request or talking to the backend failed.
    InternalError,
}

impl GatewayErrorCode {
    /// The code as it appears on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingSecurityHeader => "MissingSecurityHeader",
            Self::AuthorizationHeaderMalformed => "AuthorizationHeaderMalformed",
            Self::NoCredentialsConfigured => "NoCredentialsConfigured",
            Self::InvalidAccessKeyId => "InvalidAccessKeyId",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            Self::AccessDenied => "AccessDenied",
            Self::InvalidToken => "InvalidToken",
            Self::NoSuchKey => "NoSuchKey",
            Self::InvalidRequest => "InvalidRequest",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::InternalError => "InternalError",
        }
    }

    /// HTTP status answered for this code.
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::MissingSecurityHeader | Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::AuthorizationHeaderMalformed | Self::NoCredentialsConfigured => {
                StatusCode::NOT_ACCEPTABLE
            }
            Self::InvalidAccessKeyId | Self::SignatureDoesNotMatch | Self::AccessDenied => {
                StatusCode::UNAUTHORIZED
            }
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::NoSuchKey => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Which [`ErrorKind`] this code belongs to.
    #[must_use]
    pub fn kind(self) -> ErrorKind {
        match self {
            Self::MissingSecurityHeader
            | Self::AuthorizationHeaderMalformed
            | Self::NoCredentialsConfigured
            | Self::NoSuchKey
            | Self::InvalidRequest => ErrorKind::Client,
            Self::InvalidAccessKeyId | Self::SignatureDoesNotMatch => ErrorKind::Auth,
            Self::AccessDenied | Self::InvalidToken => ErrorKind::Permission,
            Self::InternalError => ErrorKind::Backend,
            Self::MethodNotAllowed => ErrorKind::Protocol,
        }
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request-scoped gateway failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct GatewayError {
    /// Wire error code.
    pub code: GatewayErrorCode,
    /// Human-readable message.
    pub message: String,
    /// The object or path the error refers to.
    pub resource: Option<String>,
}

impl GatewayError {
    /// Create an error with a message.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource: None,
        }
    }

    /// Attach the resource the error refers to.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// The credential lacks a capability.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AccessDenied, message)
    }

    /// Internal failure; the message is returned to the caller.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InternalError, message)
    }

    /// Unsupported HTTP method.
    pub fn method_not_allowed(method: &http::Method) -> Self {
        Self::new(
            GatewayErrorCode::MethodNotAllowed,
            format!("The specified method is not allowed against this resource: {method}"),
        )
    }
}

impl From<AuthError> for GatewayError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::MissingAuthHeader => GatewayErrorCode::MissingSecurityHeader,
            AuthError::MalformedScheme | AuthError::MalformedCredentialPair => {
                GatewayErrorCode::AuthorizationHeaderMalformed
            }
            AuthError::NoCredentialsConfigured => GatewayErrorCode::NoCredentialsConfigured,
            AuthError::UnknownAccessKey(_) => GatewayErrorCode::InvalidAccessKeyId,
            AuthError::SignatureDoesNotMatch => GatewayErrorCode::SignatureDoesNotMatch,
        };
        debug_assert_eq!(code.status_code(), err.status_code());
        Self::new(code, err.to_string())
    }
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::NotFound { id } => Self::new(
                GatewayErrorCode::NoSuchKey,
                "The specified key does not exist.",
            )
            .with_resource(id.clone()),
            StorageError::InvalidObjectId { id } => {
                Self::new(GatewayErrorCode::InvalidRequest, err.to_string())
                    .with_resource(id.clone())
            }
            StorageError::Io { id, .. } => {
                Self::internal(err.to_string()).with_resource(id.clone())
            }
        }
    }
}
