//! Response construction helpers.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::body::GatewayBody;
use crate::error::{GatewayError, GatewayErrorCode};
use crate::xml::{error_to_xml, location_constraint_xml};

/// Methods the gateway dispatches, advertised in `Allow` on 405 responses.
pub const ALLOWED_METHODS: &str = "GET, PUT";

/// Format a timestamp as an HTTP date: `Mon, 02 Jan 2006 15:04:05 GMT`.
#[must_use]
pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Quoted hex MD5 of `data`, used as the ETag.
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    use md5::{Digest, Md5};
    format!("\"{}\"", hex::encode(Md5::digest(data)))
}

/// Convert a [`GatewayError`] into an XML error response.
#[must_use]
pub fn error_to_response(err: &GatewayError, request_id: &str) -> http::Response<GatewayBody> {
    let xml_bytes = error_to_xml(
        err.code.as_str(),
        &err.message,
        err.resource.as_deref(),
        request_id,
    );

    let mut builder = http::Response::builder()
        .status(err.status_code())
        .header(http::header::CONTENT_TYPE, "application/xml");
    if err.code == GatewayErrorCode::MethodNotAllowed {
        builder = builder.header(http::header::ALLOW, ALLOWED_METHODS);
    }

    builder
        .body(GatewayBody::from_bytes(Bytes::from(xml_bytes)))
        .unwrap_or_else(|_| {
            http::Response::builder()
                .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .body(GatewayBody::empty())
                .expect("static response should be valid")
        })
}

/// The fixed bucket location document.
#[must_use]
pub fn bucket_location_response() -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(GatewayBody::from_bytes(location_constraint_xml("")))
        .expect("static location response should be valid")
}
