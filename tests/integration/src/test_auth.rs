//! Authentication integration tests.

#[cfg(test)]
mod tests {
    use crate::{GatewayClient, TestCredential, read_only_credential, test_object_id};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_require_authorization_header() {
        let client = GatewayClient::new();
        let resp = client
            .send(
                http::Method::GET,
                &format!("/{}", test_object_id("anon")),
                bytes::Bytes::new(),
                None,
            )
            .await
            .expect("request should send");
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        assert!(resp.headers().contains_key("x-amz-request-id"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_access_key() {
        let client = GatewayClient::new();
        let stranger = TestCredential {
            access_key_id: "UNKNOWN".to_owned(),
            secret_key: "whatever".to_owned(),
        };
        let resp = client
            .get_object(&test_object_id("unknown"), &stranger)
            .await
            .expect("request should send");
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_wrong_secret() {
        let client = GatewayClient::new();
        let mut credential = read_only_credential();
        credential.secret_key.push('x');
        let resp = client
            .get_object(&test_object_id("badsig"), &credential)
            .await
            .expect("request should send");
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert!(
            resp.text()
                .await
                .expect("body")
                .contains("<Code>SignatureDoesNotMatch</Code>")
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_gate_bucket_location() {
        let client = GatewayClient::new();

        let anonymous = client
            .send(http::Method::GET, "/", bytes::Bytes::new(), None)
            .await
            .expect("request should send");
        assert_eq!(anonymous.status(), reqwest::StatusCode::BAD_REQUEST);

        let signed = client
            .send(
                http::Method::GET,
                "/?location",
                bytes::Bytes::new(),
                Some(&read_only_credential()),
            )
            .await
            .expect("request should send");
        assert_eq!(signed.status(), reqwest::StatusCode::OK);
        assert!(
            signed
                .text()
                .await
                .expect("body")
                .contains("<LocationConstraint")
        );
    }
}
