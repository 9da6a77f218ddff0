//! [`ObjectStore`] backed by `aws-sdk-s3`.
//!
//! Every call builds a client from the request's own credentials, so no
//! connection state is shared between requests. Path-style addressing is
//! forced for compatibility with S3-compatible stores (MinIO, Hetzner, ...).

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::credentials::StoreCredentials;
use crate::store::{
    BucketInfo, ObjectListing, ObjectStore, ObjectSummary, StoreError, StoredObject,
};

/// Credentials provider name reported to the SDK.
const PROVIDER_NAME: &str = "s3action-target";

/// Object store talking to an S3-compatible endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3ObjectStore;

impl S3ObjectStore {
    /// Create a new store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn client(creds: &StoreCredentials) -> aws_sdk_s3::Client {
        let credentials = Credentials::new(
            &creds.access_key_id,
            &creds.secret_access_key,
            None,
            None,
            PROVIDER_NAME,
        );

        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(creds.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&creds.endpoint_url)
            .force_path_style(true)
            .build();

        aws_sdk_s3::Client::from_conf(config)
    }
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        creds: &StoreCredentials,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        Self::client(creds)
            .put_object()
            .bucket(&creds.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreError::service("PutObject", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn get_object(&self, creds: &StoreCredentials, key: &str) -> Result<StoredObject, StoreError> {
        let output = Self::client(creds)
            .get_object()
            .bucket(&creds.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(GetObjectError::NoSuchKey(_)) => StoreError::NotFound {
                    key: key.to_owned(),
                },
                _ => StoreError::service("GetObject", DisplayErrorContext(&e)),
            })?;

        let content_type = output.content_type().map(str::to_owned);
        let last_modified = output.last_modified().and_then(to_chrono);
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::service("GetObject", e))?
            .into_bytes();

        Ok(StoredObject {
            body,
            content_type,
            last_modified,
        })
    }

    async fn delete_object(&self, creds: &StoreCredentials, key: &str) -> Result<(), StoreError> {
        Self::client(creds)
            .delete_object()
            .bucket(&creds.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::service("DeleteObject", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn list_objects(
        &self,
        creds: &StoreCredentials,
        prefix: Option<&str>,
    ) -> Result<ObjectListing, StoreError> {
        let output = Self::client(creds)
            .list_objects_v2()
            .bucket(&creds.bucket)
            .set_prefix(prefix.map(str::to_owned))
            .send()
            .await
            .map_err(|e| StoreError::service("ListObjectsV2", DisplayErrorContext(&e)))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectSummary {
                    key: object.key()?.to_owned(),
                    size: object.size().unwrap_or_default(),
                    last_modified: object.last_modified().and_then(to_chrono),
                })
            })
            .collect();

        Ok(ObjectListing {
            objects,
            truncated: output.is_truncated().unwrap_or(false),
        })
    }

    async fn list_buckets(&self, creds: &StoreCredentials) -> Result<Vec<BucketInfo>, StoreError> {
        let output = Self::client(creds)
            .list_buckets()
            .send()
            .await
            .map_err(|e| StoreError::service("ListBuckets", DisplayErrorContext(&e)))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                Some(BucketInfo {
                    name: bucket.name()?.to_owned(),
                    creation_date: bucket.creation_date().and_then(to_chrono),
                })
            })
            .collect())
    }
}
