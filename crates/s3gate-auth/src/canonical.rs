//! SigV2 canonical request ("string to sign") construction.
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                Content-MD5 + "\n" +
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                CanonicalizedAmzHeaders +
//!                CanonicalizedResource
//! ```
//!
//! Construction never fails and depends on nothing but the request itself.
//! When an `x-amz-date` header is present the `Date` line is left empty; the
//! client's date travels in the canonicalized amz headers instead.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::percent_decode_str;

/// Query parameters that name an S3 sub-resource and are therefore signed.
/// Kept sorted.
pub const SUB_RESOURCES: &[&str] = &[
    "acl",
    "cors",
    "delete",
    "lifecycle",
    "location",
    "logging",
    "notification",
    "partNumber",
    "policy",
    "requestPayment",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
    "restore",
    "tagging",
    "torrent",
    "uploadId",
    "uploads",
    "versionId",
    "versioning",
    "versions",
    "website",
];

const AMZ_PREFIX: &str = "x-amz-";

/// The signable view of one HTTP request.
///
/// [`Display`](fmt::Display) renders the exact SigV2 string to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// HTTP verb, e.g. `GET`.
    pub method: String,
    /// `Content-MD5` header value, empty if absent.
    pub content_md5: String,
    /// `Content-Type` header value, empty if absent.
    pub content_type: String,
    /// `Date` header value; empty if absent or if `x-amz-date` is present.
    pub date: String,
    /// Lower-cased `x-amz-*` names with their comma-joined values, sorted by name.
    pub amz_headers: Vec<(String, String)>,
    /// Normalized resource path plus signed sub-resources.
    pub resource: String,
}

impl CanonicalRequest {
    /// Build the canonical form of a request.
    ///
    /// `virtual_host_bucket` is the bucket name taken from the `Host` header when
    /// virtual-hosted-style addressing is in use; pass `None` for path-style
    /// requests.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts, virtual_host_bucket: Option<&str>) -> Self {
        let headers = &parts.headers;
        let date = if headers.contains_key("x-amz-date") {
            String::new()
        } else {
            header_value(headers, http::header::DATE.as_str())
        };

        Self {
            method: parts.method.as_str().to_owned(),
            content_md5: header_value(headers, "content-md5"),
            content_type: header_value(headers, http::header::CONTENT_TYPE.as_str()),
            date,
            amz_headers: canonicalized_amz_headers(headers),
            resource: canonicalized_resource(&parts.uri, virtual_host_bucket),
        }
    }

    /// Render the string to sign.
    #[must_use]
    pub fn string_to_sign(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.content_md5)?;
        writeln!(f, "{}", self.content_type)?;
        writeln!(f, "{}", self.date)?;
        for (name, value) in &self.amz_headers {
            writeln!(f, "{name}:{value}")?;
        }
        f.write_str(&self.resource)
    }
}

/// Build the string to sign for a request in one call.
#[must_use]
pub fn string_to_sign(parts: &http::request::Parts, virtual_host_bucket: Option<&str>) -> String {
    CanonicalRequest::from_parts(parts, virtual_host_bucket).string_to_sign()
}

/// Collect `x-amz-*` headers: names lower-cased, repeated names merged with
/// `,`, values trimmed, sorted by name.
fn canonicalized_amz_headers(headers: &http::HeaderMap) -> Vec<(String, String)> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        // `HeaderName` is already lower-case, this keeps the invariant explicit.
        let name = name.as_str().to_ascii_lowercase();
        if name.starts_with(AMZ_PREFIX) {
            let value = String::from_utf8_lossy(value.as_bytes()).trim().to_owned();
            grouped.entry(name).or_default().push(value);
        }
    }

    grouped
        .into_iter()
        .map(|(name, values)| (name, values.join(",")))
        .collect()
}

/// Build the CanonicalizedResource: `[/bucket]` + raw path + signed sub-resources.
fn canonicalized_resource(uri: &http::Uri, virtual_host_bucket: Option<&str>) -> String {
    let mut resource = String::new();
    if let Some(bucket) = virtual_host_bucket {
        resource.push('/');
        resource.push_str(bucket);
    }
    resource.push_str(uri.path());

    let mut sub_params: Vec<(&str, Option<String>)> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').map_or((pair, None), |(k, v)| {
                let decoded = percent_decode_str(v).decode_utf8_lossy().into_owned();
                (k, (!decoded.is_empty()).then_some(decoded))
            });
            SUB_RESOURCES.contains(&key).then_some((key, value))
        })
        .collect();

    if sub_params.is_empty() {
        return resource;
    }

    sub_params.sort_by(|a, b| a.0.cmp(b.0));
    let rendered: Vec<String> = sub_params
        .into_iter()
        .map(|(key, value)| match value {
            Some(value) => format!("{key}={value}"),
            None => key.to_owned(),
        })
        .collect();

    resource.push('?');
    resource.push_str(&rendered.join("&"));
    resource
}

/// Header value as a string, empty if missing. Invalid UTF-8 is decoded
/// lossily, the same way `x-amz-*` values are.
fn header_value(headers: &http::HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default()
}
