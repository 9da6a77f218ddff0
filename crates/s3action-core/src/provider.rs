//! Action provider: the four handlers and the dispatch point.
//!
//! Each handler validates its inputs, resolves credentials, and makes
//! exactly one store call. Every failure is returned as an in-band
//! [`ActionError`]; [`S3ActionProvider::execute`] settles the envelope with
//! it so the HTTP layer always answers 200.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};

use s3action_model::action::SemanticAction;
use s3action_model::error::ActionError;
use s3action_model::operations::{ActionType, LIST_BUCKETS_QUERY};
use s3action_model::types::{
    ActionResult, BucketSummary, DEFAULT_ENCODING_FORMAT, ItemList, ObjectDescriptor,
};

use crate::config::ServiceConfig;
use crate::credentials::{StoreCredentials, resolve_credentials};
use crate::store::ObjectStore;

/// Executes semantic actions against an object store.
#[derive(Debug)]
pub struct S3ActionProvider {
    store: Arc<dyn ObjectStore>,
    default_region: String,
    download_dir: PathBuf,
}

impl S3ActionProvider {
    /// Create a provider over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, config: &ServiceConfig) -> Self {
        Self {
            store,
            default_region: config.default_region.clone(),
            download_dir: PathBuf::from(&config.download_dir),
        }
    }

    /// Execute an action and return it settled.
    pub async fn execute(&self, mut action: SemanticAction) -> SemanticAction {
        action.begin(Utc::now());

        let outcome = match action.action_type {
            ActionType::Create => self.handle_upload(&action).await,
            ActionType::Download => self.handle_download(&action).await,
            ActionType::Delete => self.handle_delete(&action).await,
            ActionType::Search => self.handle_list(&action).await,
        };

        match &outcome {
            Ok(_) => info!(
                action_type = %action.action_type,
                operation = action.action_type.operation(),
                "action completed"
            ),
            Err(err) if err.is_in_band() => warn!(
                action_type = %action.action_type,
                code = %err.code,
                error = %err.message,
                "action failed"
            ),
            Err(err) => error!(
                action_type = %action.action_type,
                code = %err.code,
                error = %err.message,
                "action failed with a protocol error"
            ),
        }

        action.settle(outcome, Utc::now());
        action
    }

    fn credentials(&self, action: &SemanticAction) -> Result<StoreCredentials, ActionError> {
        resolve_credentials(action.target.as_ref(), &self.default_region)
    }

    /// Upload a local file or inline base64 content.
    async fn handle_upload(&self, action: &SemanticAction) -> Result<ActionResult, ActionError> {
        let creds = self.credentials(action)?;
        let object = action.object.as_ref().ok_or_else(ActionError::missing_content_path)?;
        if object.is_catalog() {
            return Err(ActionError::unsupported_operation(
                "Bucket creation is not supported",
            ));
        }

        let source = upload_source(object)?;
        let key = upload_key(object, action.target_url.as_deref(), &source)
            .ok_or_else(ActionError::missing_object_key)?;
        let content_type = object
            .encoding_format
            .clone()
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_ENCODING_FORMAT.to_owned());

        let body = match &source {
            UploadSource::File(path) => tokio::fs::read(path).await.map(Bytes::from).map_err(|e| {
                ActionError::upload_failure(format!("Failed to read file {path}: {e}")).with_source(e)
            })?,
            UploadSource::Inline(text) => BASE64_STANDARD
                .decode(text.as_bytes())
                .map(Bytes::from)
                .map_err(|e| {
                    ActionError::upload_failure(format!("Invalid base64 content: {e}")).with_source(e)
                })?,
        };
        let content_size = i64::try_from(body.len()).unwrap_or(i64::MAX);

        self.store
            .put_object(&creds, &key, body, &content_type)
            .await
            .map_err(|e| ActionError::upload_failure(format!("Failed to upload file: {e}")).with_source(e))?;

        info!(bucket = %creds.bucket, key = %key, size = content_size, "uploaded object");
        Ok(ActionResult::Object(ObjectDescriptor {
            kind: object.kind.clone(),
            name: object.name.clone().or_else(|| Some(base_name(&key))),
            content_url: Some(s3_url(&creds.bucket, &key)),
            encoding_format: Some(content_type),
            content_size: Some(content_size),
            upload_date: Some(Utc::now()),
            ..ObjectDescriptor::with_key(key)
        }))
    }

    /// Fetch an object fully and write it to a local path.
    async fn handle_download(&self, action: &SemanticAction) -> Result<ActionResult, ActionError> {
        let creds = self.credentials(action)?;
        let object = action.object.as_ref();
        let key = object
            .and_then(ObjectDescriptor::key)
            .ok_or_else(ActionError::missing_object_key)?
            .to_owned();

        let stored = self.store.get_object(&creds, &key).await.map_err(|e| {
            ActionError::download_failure(format!("Failed to download object {key}: {e}")).with_source(e)
        })?;

        let local_path = object
            .and_then(ObjectDescriptor::content_path)
            .map_or_else(|| self.download_dir.join(base_name(&key)), PathBuf::from);
        write_local(&local_path, &stored.body).await?;

        info!(bucket = %creds.bucket, key = %key, path = %local_path.display(), "downloaded object");
        Ok(ActionResult::Object(ObjectDescriptor {
            name: Some(base_name(&key)),
            content_url: Some(local_path.display().to_string()),
            encoding_format: object
                .and_then(|o| o.encoding_format.clone())
                .or(stored.content_type),
            content_size: Some(i64::try_from(stored.body.len()).unwrap_or(i64::MAX)),
            date_modified: stored.last_modified,
            ..ObjectDescriptor::with_key(key)
        }))
    }

    /// Delete an object. No existence check: a missing key follows the
    /// store's semantics (S3 answers success).
    async fn handle_delete(&self, action: &SemanticAction) -> Result<ActionResult, ActionError> {
        let creds = self.credentials(action)?;
        let key = action
            .object
            .as_ref()
            .and_then(ObjectDescriptor::key)
            .ok_or_else(ActionError::missing_object_key)?
            .to_owned();

        self.store.delete_object(&creds, &key).await.map_err(|e| {
            ActionError::delete_failure(format!("Failed to delete object {key}: {e}")).with_source(e)
        })?;

        info!(bucket = %creds.bucket, key = %key, "deleted object");
        Ok(ActionResult::Object(ObjectDescriptor {
            content_url: Some(s3_url(&creds.bucket, &key)),
            ..ObjectDescriptor::with_key(key)
        }))
    }

    /// List one page of objects under the query prefix, or the buckets.
    async fn handle_list(&self, action: &SemanticAction) -> Result<ActionResult, ActionError> {
        let creds = self.credentials(action)?;

        if action.prefix() == Some(LIST_BUCKETS_QUERY) {
            let buckets = self.store.list_buckets(&creds).await.map_err(|e| {
                ActionError::list_failure(format!("Failed to list buckets: {e}")).with_source(e)
            })?;
            let summaries = buckets
                .into_iter()
                .map(|b| BucketSummary::new(b.name, b.creation_date))
                .collect();
            return Ok(ActionResult::Buckets(ItemList::new(summaries)));
        }

        let prefix = action.prefix();
        let listing = self.store.list_objects(&creds, prefix).await.map_err(|e| {
            ActionError::list_failure(format!("Failed to list objects: {e}")).with_source(e)
        })?;
        if listing.truncated {
            warn!(
                bucket = %creds.bucket,
                prefix = ?prefix,
                returned = listing.objects.len(),
                "object listing truncated to a single page"
            );
        }

        let objects = listing
            .objects
            .into_iter()
            .map(|o| ObjectDescriptor {
                name: Some(base_name(&o.key)),
                content_url: Some(s3_url(&creds.bucket, &o.key)),
                content_size: Some(o.size),
                date_modified: o.last_modified,
                ..ObjectDescriptor::with_key(o.key)
            })
            .collect();
        Ok(ActionResult::Objects(ItemList::new(objects)))
    }
}

/// Where upload content comes from.
#[derive(Debug)]
enum UploadSource {
    File(String),
    Inline(String),
}

fn upload_source(object: &ObjectDescriptor) -> Result<UploadSource, ActionError> {
    if let Some(path) = object.content_path() {
        return Ok(UploadSource::File(path.to_owned()));
    }
    object
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| UploadSource::Inline(t.to_owned()))
        .ok_or_else(ActionError::missing_content_path)
}

/// Key precedence: identifier, request `targetUrl`, the local file's base
/// name, then the display name.
fn upload_key(object: &ObjectDescriptor, target_url: Option<&str>, source: &UploadSource) -> Option<String> {
    let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_owned);
    non_empty(object.identifier.as_deref())
        .or_else(|| non_empty(target_url))
        .or_else(|| match source {
            UploadSource::File(path) => Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            UploadSource::Inline(_) => None,
        })
        .or_else(|| non_empty(object.name.as_deref()))
}

/// Last path segment of a key; the whole key when it has none.
fn base_name(key: &str) -> String {
    key.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(key)
        .to_owned()
}

fn s3_url(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

async fn write_local(path: &Path, body: &[u8]) -> Result<(), ActionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ActionError::local_write_failure(format!(
                "Failed to write file {}: {e}",
                path.display()
            ))
            .with_source(e)
        })?;
    }
    tokio::fs::write(path, body).await.map_err(|e| {
        ActionError::local_write_failure(format!("Failed to write file {}: {e}", path.display()))
            .with_source(e)
    })
}
