//! Error reporting integration tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{post_action, server_url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_action_type() {
        let (status, body) = post_action(&json!({"@type": "UpdateAction"})).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "UnsupportedActionType");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_missing_type() {
        let (status, body) = post_action(&json!({"object": {"identifier": "k"}})).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "MalformedPayload");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_in_band_without_credentials() {
        let (status, body) = post_action(&json!({
            "@type": "DownloadAction",
            "object": {"identifier": "k"},
            "target": {"identifier": "bucket"}
        }))
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["actionStatus"], "FailedActionStatus");
        assert_eq!(body["error"]["@type"], "Thing");
        assert_eq!(body["error"]["name"], "MissingCredentials");
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_health_without_key() {
        let response = reqwest::get(format!("{}/health", server_url()))
            .await
            .expect("health");
        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.expect("json");
        assert_eq!(body["status"], "healthy");
    }
}
