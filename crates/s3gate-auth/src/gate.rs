//! The auth gate: turns an inbound request into an authorized [`Credential`]
//! or an [`AuthError`].
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. `Authorization` header present (`400`)
//! 2. header uses the `AWS ` scheme (`406`)
//! 3. header is exactly `AWS <AccessKeyId>:<Signature>` (`406`)
//! 4. at least one credential is configured (`406`)
//! 5. access key is known (`401`)
//! 6. signature matches the canonical request (`401`)

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::canonical::CanonicalRequest;
use crate::credentials::{Credential, CredentialProvider};
use crate::error::AuthError;
use crate::sigv2::{SIGV2_SCHEME, verify_signature};

/// Verifies SigV2-signed requests against a credential provider.
#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("provider", &"...")
            .field("empty", &self.provider.is_empty())
            .finish()
    }
}

impl AuthGate {
    /// Create a gate backed by `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self { provider }
    }

    /// Authenticate one request.
    ///
    /// `virtual_host_bucket` is forwarded to the canonical request builder.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] describing the first check that failed.
    pub fn authenticate(
        &self,
        parts: &http::request::Parts,
        virtual_host_bucket: Option<&str>,
    ) -> Result<Credential, AuthError> {
        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedScheme)?;

        let (access_key_id, signature) = parse_authorization(header)?;

        if self.provider.is_empty() {
            return Err(AuthError::NoCredentialsConfigured);
        }

        let credential = self
            .provider
            .lookup(access_key_id)
            .ok_or_else(|| AuthError::UnknownAccessKey(access_key_id.to_owned()))?;

        let string_to_sign =
            CanonicalRequest::from_parts(parts, virtual_host_bucket).string_to_sign();
        debug!(access_key_id, string_to_sign = ?string_to_sign, "built SigV2 string to sign");

        if verify_signature(&credential.secret_access_key, &string_to_sign, signature) {
            debug!(access_key_id, permissions = ?credential.permissions, "SigV2 verification succeeded");
            Ok(credential)
        } else {
            debug!(access_key_id, "SigV2 signature mismatch");
            Err(AuthError::SignatureDoesNotMatch)
        }
    }
}

/// Split `AWS <AccessKeyId>:<Signature>` into its two credential fields.
fn parse_authorization(header: &str) -> Result<(&str, &str), AuthError> {
    if !header.starts_with(SIGV2_SCHEME) {
        return Err(AuthError::MalformedScheme);
    }

    let fields: Vec<&str> = header.split(' ').collect();
    let [_, pair] = fields.as_slice() else {
        return Err(AuthError::MalformedCredentialPair);
    };

    let parts: Vec<&str> = pair.trim().split(':').collect();
    match parts.as_slice() {
        [access_key_id, signature] => Ok((*access_key_id, *signature)),
        _ => Err(AuthError::MalformedCredentialPair),
    }
}
