//! AWS Signature Version 2 request authentication for s3gate.
//!
//! This crate holds everything between "a request arrived" and "we know who
//! sent it and what they may do":
//!
//! - [`credentials`] - the credential registry, capability set, and provider trait
//! - [`canonical`] - SigV2 canonical request / string-to-sign construction
//! - [`sigv2`] - HMAC-SHA1 signing and constant-time verification
//! - [`gate`] - the auth gate that ties the above together
//! - [`error`] - deny reasons and their HTTP status codes
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use s3gate_auth::{AuthGate, CredentialRegistry, Permissions};
//!
//! let mut registry = CredentialRegistry::new();
//! registry.register("AKID1", "SECRET1", Permissions::READ_ONLY);
//! let gate = AuthGate::new(Arc::new(registry));
//!
//! let (parts, ()) = http::Request::get("/obj1").body(()).unwrap().into_parts();
//! assert!(gate.authenticate(&parts, None).is_err());
//! ```

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod sigv2;

pub use canonical::{CanonicalRequest, string_to_sign};
pub use credentials::{Capability, Credential, CredentialProvider, CredentialRegistry, Permissions};
pub use error::AuthError;
pub use gate::AuthGate;
pub use sigv2::{authorization_header, compute_signature, verify_signature};
