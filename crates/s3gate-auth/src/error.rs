//! Error types for SigV2 authentication.
//!
//! Every way the auth gate can deny a request is a variant of [`AuthError`].
//! Each variant knows the HTTP status it is answered with.

use http::StatusCode;

/// Reasons an authentication attempt is denied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header does not use the `AWS ` scheme.
    #[error("Authorization header does not use the AWS scheme")]
    MalformedScheme,

    /// The credential part of the header is not a single `AccessKeyId:Signature` pair.
    #[error("Authorization header is not of the form 'AWS AccessKeyId:Signature'")]
    MalformedCredentialPair,

    /// No credentials are configured, so no signature can ever be accepted.
    #[error("No credentials are configured on this gateway")]
    NoCredentialsConfigured,

    /// The access key ID was not found in the credential registry.
    #[error("Access key not found: {0}")]
    UnknownAccessKey(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}

impl AuthError {
    /// HTTP status code the gateway answers this denial with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuthHeader => StatusCode::BAD_REQUEST,
            Self::MalformedScheme | Self::MalformedCredentialPair | Self::NoCredentialsConfigured => {
                StatusCode::NOT_ACCEPTABLE
            }
            Self::UnknownAccessKey(_) | Self::SignatureDoesNotMatch => StatusCode::UNAUTHORIZED,
        }
    }
}
