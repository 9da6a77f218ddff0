//! Semantic action integration tests.

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;

    use crate::{cleanup_bucket, create_test_bucket, post_action, s3_client, target};

    fn upload(bucket: &str, key: &str, content: &[u8]) -> serde_json::Value {
        json!({
            "@context": "https://schema.org",
            "@type": "CreateAction",
            "identifier": format!("upload-{key}"),
            "object": {
                "@type": "MediaObject",
                "identifier": key,
                "encodingFormat": "text/plain",
                "text": STANDARD.encode(content)
            },
            "target": target(bucket)
        })
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_upload_and_report_content_size() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "upload").await;

        let (status, body) = post_action(&upload(&bucket, "test/integration-upload.txt", b"hello")).await;
        assert_eq!(status, 200);
        assert_eq!(body["actionStatus"], "CompletedActionStatus");
        assert_eq!(body["result"]["contentSize"], 5);
        assert_eq!(
            body["result"]["contentUrl"],
            format!("s3://{bucket}/test/integration-upload.txt")
        );
        assert!(body.get("error").is_none());

        let head = client
            .head_object()
            .bucket(&bucket)
            .key("test/integration-upload.txt")
            .send()
            .await
            .expect("head_object");
        assert_eq!(head.content_type(), Some("text/plain"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_find_uploaded_object_by_prefix() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "search").await;

        post_action(&upload(&bucket, "test/a.txt", b"a")).await;
        post_action(&upload(&bucket, "other/b.txt", b"b")).await;

        let (status, body) = post_action(&json!({
            "@type": "SearchAction",
            "query": "test/",
            "target": target(&bucket)
        }))
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["actionStatus"], "CompletedActionStatus");
        assert_eq!(body["result"]["numberOfItems"], 1);
        assert_eq!(body["result"]["itemListElement"][0]["identifier"], "test/a.txt");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server on the same host"]
    async fn test_should_round_trip_through_download() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "roundtrip").await;
        let dir = tempfile::tempdir().expect("tempdir");
        let local = dir.path().join("copy.bin");

        let content = b"round trip \x00\x01\x02";
        post_action(&upload(&bucket, "data/file.bin", content)).await;

        let (_, body) = post_action(&json!({
            "@type": "DownloadAction",
            "object": {
                "identifier": "data/file.bin",
                "contentUrl": local.to_string_lossy()
            },
            "target": target(&bucket)
        }))
        .await;
        assert_eq!(body["actionStatus"], "CompletedActionStatus");
        assert_eq!(body["result"]["contentSize"], content.len());
        assert_eq!(std::fs::read(&local).expect("read download"), content);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_idempotently() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delete").await;
        post_action(&upload(&bucket, "gone.txt", b"x")).await;

        let delete = json!({
            "@type": "DeleteAction",
            "object": {"identifier": "gone.txt"},
            "target": target(&bucket)
        });
        let (_, first) = post_action(&delete).await;
        let (_, second) = post_action(&delete).await;
        assert_eq!(first["actionStatus"], "CompletedActionStatus");
        assert_eq!(second["actionStatus"], "CompletedActionStatus");

        let listed = client.list_objects_v2().bucket(&bucket).send().await.expect("list");
        assert!(listed.contents().is_empty());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_redact_secret_in_echoed_target() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "redact").await;

        let (_, body) = post_action(&json!({
            "@type": "SearchAction",
            "target": target(&bucket)
        }))
        .await;
        let secret = body["target"]["additionalProperty"]
            .as_array()
            .expect("properties")
            .iter()
            .find(|p| p["name"] == "secretKey")
            .expect("secretKey property")
            .clone();
        assert_eq!(secret["value"], "REDACTED");

        cleanup_bucket(&client, &bucket).await;
    }
}
