//! Health endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{GatewayClient, endpoint_url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_running() {
        let _client = GatewayClient::new();
        let resp = reqwest::get(format!("{}/_s3gate/health", endpoint_url()))
            .await
            .expect("health request should send");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(reqwest::header::SERVER)
                .and_then(|v| v.to_str().ok()),
            Some("s3gate")
        );

        let body: serde_json::Value = resp.json().await.expect("json body");
        assert_eq!(body["status"], "running");
        assert_eq!(body["service"], "s3gate");
    }
}
