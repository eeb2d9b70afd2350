//! The gateway HTTP service implementing hyper's `Service` trait.
//!
//! [`GatewayService`] ties together routing, authentication, dispatch, and
//! response formatting:
//!
//! 1. Health check interception (`GET /_s3gate/health`)
//! 2. Routing via [`GatewayRouter`]
//! 3. SigV2 authentication via [`AuthGate`]
//! 4. Operation dispatch via [`ObjectDispatcher`]
//! 5. Common response headers (`x-amz-request-id`, `Server`)
//! 6. Error response formatting

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::service::Service;
use s3gate_auth::AuthGate;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::body::GatewayBody;
use crate::dispatch::ObjectDispatcher;
use crate::error::{ErrorKind, GatewayError};
use crate::response::error_to_response;
use crate::router::GatewayRouter;

/// Path answered by the liveness check without authentication.
pub const HEALTH_CHECK_PATH: &str = "/_s3gate/health";

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "s3gate";

/// Configuration for the gateway HTTP service.
#[derive(Debug, Clone)]
pub struct GatewayHttpConfig {
    /// The base domain for virtual-hosted-style requests (e.g., `s3.localhost`).
    pub domain: String,
    /// Whether to take the bucket name from the `Host` header.
    pub virtual_hosting: bool,
}

impl Default for GatewayHttpConfig {
    fn default() -> Self {
        Self {
            domain: "s3.localhost".to_owned(),
            virtual_hosting: false,
        }
    }
}

/// The gateway service.
///
/// Cloning is cheap: the gate and dispatcher are shared behind `Arc`s, so one
/// instance can be handed to every accepted connection.
#[derive(Debug, Clone)]
pub struct GatewayService {
    gate: Arc<AuthGate>,
    dispatcher: Arc<ObjectDispatcher>,
    router: GatewayRouter,
}

impl GatewayService {
    /// Create a new service.
    #[must_use]
    pub fn new(gate: AuthGate, dispatcher: ObjectDispatcher, config: &GatewayHttpConfig) -> Self {
        Self {
            gate: Arc::new(gate),
            dispatcher: Arc::new(dispatcher),
            router: GatewayRouter::new(&config.domain, config.virtual_hosting),
        }
    }

    /// Process one request through the full pipeline.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<GatewayBody>
    where
        B: http_body::Body + Send,
        B::Error: fmt::Display,
    {
        let request_id = Uuid::new_v4().to_string();
        let response = self.process_request(req, &request_id).await;
        add_common_headers(response, &request_id)
    }

    async fn process_request<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<GatewayBody>
    where
        B: http_body::Body + Send,
        B::Error: fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let method = parts.method.clone();
        let uri = parts.uri.clone();
        debug!(%method, %uri, request_id, "processing request");

        if is_health_check(&method, uri.path()) {
            return health_check_response();
        }

        let ctx = match self.router.resolve(&parts) {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(%method, %uri, error = %err, request_id, "failed to route request");
                return error_to_response(&err, request_id);
            }
        };

        let credential = match self.gate.authenticate(&parts, ctx.bucket.as_deref()) {
            Ok(credential) => credential,
            Err(auth_err) => {
                let err = GatewayError::from(auth_err);
                log_error(&err, request_id);
                return error_to_response(&err, request_id);
            }
        };

        info!(
            operation = %ctx.operation,
            object = ?ctx.operation.object_id(),
            bucket = ?ctx.bucket,
            access_key_id = %credential.access_key_id,
            request_id,
            "authorized request"
        );

        match self
            .dispatcher
            .dispatch(ctx.operation, &credential, body)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log_error(&err, request_id);
                error_to_response(&err, request_id)
            }
        }
    }
}

impl<B> Service<http::Request<B>> for GatewayService
where
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: fmt::Display + Send,
{
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

fn log_error(err: &GatewayError, request_id: &str) {
    let status = err.status_code().as_u16();
    match err.kind() {
        ErrorKind::Backend => {
            error!(code = %err.code, status, error = %err.message, resource = ?err.resource, request_id, "backend failure");
        }
        ErrorKind::Auth | ErrorKind::Permission => {
            warn!(code = %err.code, status, error = %err.message, resource = ?err.resource, request_id, "request denied");
        }
        ErrorKind::Client | ErrorKind::Protocol => {
            debug!(code = %err.code, status, error = %err.message, resource = ?err.resource, request_id, "request rejected");
        }
    }
}

/// Check if the request is a health check.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && path == HEALTH_CHECK_PATH
}

/// Produce a health check response.
fn health_check_response() -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(GatewayBody::from_string(
            r#"{"status":"running","service":"s3gate"}"#,
        ))
        .expect("static health response should be valid")
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<GatewayBody>,
    request_id: &str,
) -> http::Response<GatewayBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv);
    }

    headers.insert(
        http::header::SERVER,
        http::header::HeaderValue::from_static(SERVER_NAME),
    );

    response
}
