//! AWS Signature Version 2 signing and verification.
//!
//! `Signature = Base64(HMAC-SHA1(SecretAccessKey, StringToSign))`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Scheme prefix of a SigV2 `Authorization` header.
pub const SIGV2_SCHEME: &str = "AWS ";

/// Compute the SigV2 signature of `string_to_sign` under `secret_key`.
#[must_use]
pub fn compute_signature(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can accept any key length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Check `supplied_signature` against the signature computed from
/// `secret_key` and `string_to_sign`.
///
/// The comparison runs in constant time with respect to the content of the
/// signatures.
#[must_use]
pub fn verify_signature(secret_key: &str, string_to_sign: &str, supplied_signature: &str) -> bool {
    let expected = compute_signature(secret_key, string_to_sign);
    expected
        .as_bytes()
        .ct_eq(supplied_signature.as_bytes())
        .into()
}

/// Render a complete `Authorization` header value for a request.
///
/// Used by clients and tests; the gateway itself only verifies.
#[must_use]
pub fn authorization_header(access_key_id: &str, secret_key: &str, string_to_sign: &str) -> String {
    format!(
        "{SIGV2_SCHEME}{access_key_id}:{}",
        compute_signature(secret_key, string_to_sign)
    )
}
