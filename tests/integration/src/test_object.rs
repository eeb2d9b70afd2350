//! Object read/write integration tests.

#[cfg(test)]
mod tests {
    use crate::{
        GatewayClient, read_only_credential, read_write_credential, test_object_id, write_token,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_and_get_object() {
        let client = GatewayClient::new();
        let writer = read_write_credential();
        let id = test_object_id("roundtrip");

        let put = client
            .put_object(&id, &write_token(), "hello world", &writer)
            .await
            .expect("put should send");
        assert_eq!(put.status(), reqwest::StatusCode::OK);
        let etag = put
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        assert_eq!(
            etag.as_deref(),
            Some("\"5eb63bbbe01eeed093cb22bb8f5acdc3\"")
        );

        let get = client
            .get_object(&id, &writer)
            .await
            .expect("get should send");
        assert_eq!(get.status(), reqwest::StatusCode::OK);
        assert!(get.headers().contains_key(reqwest::header::LAST_MODIFIED));
        assert_eq!(get.text().await.expect("body"), "hello world");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_let_reader_get_but_not_put() {
        let client = GatewayClient::new();
        let id = test_object_id("reader");

        client
            .put_object(&id, &write_token(), "data", &read_write_credential())
            .await
            .expect("put should send");

        let reader = read_only_credential();
        let get = client.get_object(&id, &reader).await.expect("get should send");
        assert_eq!(get.status(), reqwest::StatusCode::OK);

        let put = client
            .put_object(&id, &write_token(), "other", &reader)
            .await
            .expect("put should send");
        assert_eq!(put.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_wrong_write_token() {
        let client = GatewayClient::new();
        let id = test_object_id("token");

        let put = client
            .put_object(&id, "not-the-token", "data", &read_write_credential())
            .await
            .expect("put should send");
        assert_eq!(put.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_404_for_missing_object() {
        let client = GatewayClient::new();
        let resp = client
            .get_object(&test_object_id("missing"), &read_only_credential())
            .await
            .expect("get should send");
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
        assert!(
            resp.text()
                .await
                .expect("body")
                .contains("<Code>NoSuchKey</Code>")
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_405_for_delete() {
        let client = GatewayClient::new();
        let resp = client
            .send(
                http::Method::DELETE,
                &format!("/{}", test_object_id("delete")),
                bytes::Bytes::new(),
                Some(&read_write_credential()),
            )
            .await
            .expect("delete should send");
        assert_eq!(resp.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resp.headers()
                .get(reqwest::header::ALLOW)
                .and_then(|v| v.to_str().ok()),
            Some("GET, PUT")
        );
    }
}
