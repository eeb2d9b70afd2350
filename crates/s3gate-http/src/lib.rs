//! HTTP layer of the s3gate object gateway.
//!
//! - **Routing** ([`router`]): maps method and path to an
//!   [`ObjectOperation`](router::ObjectOperation), optionally taking the bucket
//!   name from a virtual-hosted `Host` header.
//! - **Dispatch** ([`dispatch`]): enforces read/write capabilities and the
//!   write token, then calls the [`ObjectStore`](s3gate_core::ObjectStore).
//! - **Service** ([`service`]): the [`GatewayService`](service::GatewayService)
//!   implementing hyper's `Service` trait.
//! - **Errors** ([`error`]) and XML bodies ([`xml`], [`response`]).
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> GatewayService (hyper Service)
//!     -> Health check interception
//!     -> GatewayRouter (virtual hosting + operation identification)
//!     -> AuthGate (SigV2)
//!     -> ObjectDispatcher (capabilities, write token, storage backend)
//!     -> Common response headers (x-amz-request-id, Server)
//!   <- HTTP Response
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use s3gate_auth::{AuthGate, CredentialRegistry, Permissions};
//! use s3gate_core::InMemoryObjectStore;
//! use s3gate_http::{GatewayHttpConfig, GatewayService, ObjectDispatcher};
//!
//! let mut registry = CredentialRegistry::new();
//! registry.register_users("AKID1=SECRET1", Permissions::READ_WRITE);
//!
//! let gate = AuthGate::new(Arc::new(registry));
//! let dispatcher = ObjectDispatcher::new(Arc::new(InMemoryObjectStore::new()), None);
//! let service = GatewayService::new(gate, dispatcher, &GatewayHttpConfig::default());
//! // Use `service` with a hyper server.
//! # let _ = service;
//! ```

// GatewayError carries owned strings for the message and resource; boxing it in
// every Result would only add indirection.
#![allow(clippy::result_large_err)]

pub mod body;
pub mod dispatch;
pub mod error;
pub mod response;
pub mod router;
pub mod service;
pub mod xml;

pub use body::GatewayBody;
pub use dispatch::ObjectDispatcher;
pub use error::{ErrorKind, GatewayError, GatewayErrorCode};
pub use router::{GatewayRouter, ObjectOperation, RoutingContext};
pub use service::{GatewayHttpConfig, GatewayService, HEALTH_CHECK_PATH};
