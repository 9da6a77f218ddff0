//! Object-store abstraction.
//!
//! [`ObjectStore`] is the only seam through which handlers reach storage.
//! The production implementation is [`crate::s3::S3ObjectStore`]; tests use
//! an in-memory double. Each method makes exactly one store call and never
//! retries.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::credentials::StoreCredentials;

/// Errors reported by an object store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key does not exist.
    #[error("object not found: {key}")]
    NotFound {
        /// The missing key.
        key: String,
    },
    /// The store call failed.
    #[error("{operation} failed: {message}")]
    Service {
        /// The store operation that failed.
        operation: &'static str,
        /// The store's error message.
        message: String,
    },
}

impl StoreError {
    /// Build a `Service` error from any displayable error.
    pub fn service(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Service {
            operation,
            message: err.to_string(),
        }
    }
}

/// An object returned by `get_object`.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// The full object content.
    pub body: Bytes,
    /// Content type recorded by the store.
    pub content_type: Option<String>,
    /// Last-modified time recorded by the store.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One entry of an object listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// A single page of objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    /// Entries in store order.
    pub objects: Vec<ObjectSummary>,
    /// Whether the store had more entries than this page holds.
    pub truncated: bool,
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

/// Remote object storage.
///
/// Uses `#[async_trait]` so handlers can hold an `Arc<dyn ObjectStore>`.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Store `body` under `key`.
    async fn put_object(
        &self,
        creds: &StoreCredentials,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Fetch the object stored under `key`.
    async fn get_object(&self, creds: &StoreCredentials, key: &str) -> Result<StoredObject, StoreError>;

    /// Remove the object stored under `key`. Missing keys follow the store's semantics.
    async fn delete_object(&self, creds: &StoreCredentials, key: &str) -> Result<(), StoreError>;

    /// List one page of objects, optionally under a prefix.
    async fn list_objects(
        &self,
        creds: &StoreCredentials,
        prefix: Option<&str>,
    ) -> Result<ObjectListing, StoreError>;

    /// List the buckets visible to the credentials.
    async fn list_buckets(&self, creds: &StoreCredentials) -> Result<Vec<BucketInfo>, StoreError>;
}
