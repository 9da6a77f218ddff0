//! REST convenience route integration tests.
//!
//! These expect the server to be started with the `S3_*` default target
//! pointing at the same store the tests use.

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use crate::{cleanup_bucket, create_test_bucket, rest, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_upload_list_and_delete_through_rest() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "rest").await;

        let (status, body) = rest(
            Method::POST,
            "/objects",
            Some(json!({
                "key": "rest/hello.txt",
                "content": "aGVsbG8=",
                "bucket": bucket,
                "contentType": "text/plain"
            })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["actionStatus"], "CompletedActionStatus");

        let (_, body) = rest(
            Method::GET,
            &format!("/objects/rest%2Fhello.txt?bucket={bucket}"),
            None,
        )
        .await;
        assert_eq!(body["result"]["numberOfItems"], 1);

        let (_, body) = rest(
            Method::DELETE,
            &format!("/objects/rest/hello.txt?bucket={bucket}"),
            None,
        )
        .await;
        assert_eq!(body["actionStatus"], "CompletedActionStatus");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_validate_rest_upload() {
        let (status, body) = rest(Method::POST, "/objects", Some(json!({"content": "aGk="}))).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "InvalidRequest");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_buckets() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "buckets").await;

        let (_, body) = rest(Method::GET, "/buckets", None).await;
        assert_eq!(body["actionStatus"], "CompletedActionStatus");
        let names: Vec<&str> = body["result"]["itemListElement"]
            .as_array()
            .expect("items")
            .iter()
            .filter_map(|b| b["name"].as_str())
            .collect();
        assert!(names.contains(&bucket.as_str()));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_track_recent_operations() {
        rest(Method::GET, "/buckets", None).await;
        let (status, body) = rest(Method::GET, "/state/operations", None).await;
        assert_eq!(status, 200);
        assert!(!body.as_array().expect("operations").is_empty());

        let (status, body) = rest(Method::GET, "/state/stats", None).await;
        assert_eq!(status, 200);
        assert!(body["total"].as_u64().unwrap_or_default() >= 1);
    }
}
