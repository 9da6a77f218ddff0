//! Integration tests for the S3 semantic action server.
//!
//! These tests require a running server (default `localhost:8092`) wired to
//! a reachable S3-compatible store (default `localhost:9000`). They are marked
//! `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p s3action-integration -- --ignored
//! ```
//!
//! | Variable | Default |
//! |----------|---------|
//! | `S3ACTION_URL` | `http://localhost:8092` |
//! | `S3ACTION_API_PREFIX` | `/v1/api` |
//! | `S3ACTION_API_KEY` | unset |
//! | `S3_ENDPOINT_URL` | `http://localhost:9000` |
//! | `S3_REGION` | `us-east-1` |
//! | `S3_ACCESS_KEY` / `S3_SECRET_KEY` | `minioadmin` |

use std::sync::Once;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use serde_json::{Value, json};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Base URL of the server under test.
#[must_use]
pub fn server_url() -> String {
    env_or("S3ACTION_URL", "http://localhost:8092")
}

/// Absolute URL of a prefixed route.
#[must_use]
pub fn api_url(path: &str) -> String {
    format!("{}{}{path}", server_url(), env_or("S3ACTION_API_PREFIX", "/v1/api"))
}

fn store_endpoint() -> String {
    env_or("S3_ENDPOINT_URL", "http://localhost:9000")
}

fn store_region() -> String {
    env_or("S3_REGION", "us-east-1")
}

fn access_key() -> String {
    env_or("S3_ACCESS_KEY", "minioadmin")
}

fn secret_key() -> String {
    env_or("S3_SECRET_KEY", "minioadmin")
}

/// Create an S3 client pointing at the backing store.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();

    let creds = Credentials::new(access_key(), secret_key(), None, None, "integration-test");

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(store_region()))
        .credentials_provider(creds)
        .endpoint_url(store_endpoint())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a bucket in the store and return its name. Caller is responsible for cleanup.
pub async fn create_test_bucket(client: &aws_sdk_s3::Client, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    client
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete all objects in a bucket, then delete the bucket.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let Ok(resp) = client.list_objects_v2().bucket(bucket).send().await else {
        return;
    };
    for obj in resp.contents() {
        if let Some(key) = obj.key() {
            let _ = client.delete_object().bucket(bucket).key(key).send().await;
        }
    }
    let _ = client.delete_bucket().bucket(bucket).send().await;
}

/// A JSON-LD target descriptor carrying the store credentials.
#[must_use]
pub fn target(bucket: &str) -> Value {
    json!({
        "@type": "DataCatalog",
        "identifier": bucket,
        "url": store_endpoint(),
        "additionalProperty": [
            {"@type": "PropertyValue", "name": "region", "value": store_region()},
            {"@type": "PropertyValue", "name": "accessKey", "value": access_key()},
            {"@type": "PropertyValue", "name": "secretKey", "value": secret_key()}
        ]
    })
}

fn authorized(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match std::env::var("S3ACTION_API_KEY") {
        Ok(key) => request.header("x-api-key", key),
        Err(_) => request,
    }
}

/// POST an action envelope and return the status code and JSON body.
pub async fn post_action(action: &Value) -> (u16, Value) {
    init_tracing();
    let response = authorized(reqwest::Client::new().post(api_url("/semantic/action")))
        .json(action)
        .send()
        .await
        .expect("post action");
    read_json(response).await
}

/// Send a request to a REST route and return the status code and JSON body.
pub async fn rest(method: reqwest::Method, path: &str, body: Option<Value>) -> (u16, Value) {
    init_tracing();
    let mut request = authorized(reqwest::Client::new().request(method, api_url(path)));
    if let Some(body) = body {
        request = request.json(&body);
    }
    read_json(request.send().await.expect("send request")).await
}

async fn read_json(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.expect("json body");
    (status, body)
}

mod test_action;
mod test_error;
mod test_rest;
