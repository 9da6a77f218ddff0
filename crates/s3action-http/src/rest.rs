//! REST convenience adapter.
//!
//! Each REST call is validated and converted into the equivalent JSON-LD
//! envelope, which then goes through the same dispatcher as
//! `POST /semantic/action`. Validation failures are answered with 400
//! before anything reaches the dispatcher.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::Deserialize;

use s3action_model::action::SemanticAction;
use s3action_model::error::ActionError;
use s3action_model::operations::{ActionType, LIST_BUCKETS_QUERY};
use s3action_model::types::{BucketDescriptor, DATA_CATALOG, ObjectDescriptor};

/// Body of `POST /objects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadObjectRequest {
    /// Destination key.
    #[serde(default)]
    pub key: Option<String>,
    /// Base64-encoded content.
    #[serde(default)]
    pub content: Option<String>,
    /// Bucket overriding the default target's bucket.
    #[serde(default)]
    pub bucket: Option<String>,
    /// MIME type of the content.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Body of `POST /buckets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBucketRequest {
    /// Bucket name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Build the target for a REST call: the default target with the request's
/// bucket applied, if any.
fn target_for(default_target: Option<&BucketDescriptor>, bucket: Option<&str>) -> Option<BucketDescriptor> {
    let bucket = bucket.filter(|b| !b.is_empty());
    match (default_target, bucket) {
        (Some(target), Some(bucket)) => {
            let mut target = target.clone();
            target.identifier = Some(bucket.to_owned());
            Some(target)
        }
        (Some(target), None) => Some(target.clone()),
        (None, Some(bucket)) => Some(BucketDescriptor {
            identifier: Some(bucket.to_owned()),
            ..BucketDescriptor::default()
        }),
        (None, None) => None,
    }
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, ActionError> {
    serde_json::from_slice(body)
        .map_err(|e| ActionError::invalid_request(format!("Invalid JSON body: {e}")))
}

fn required(value: Option<String>, field: &str) -> Result<String, ActionError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ActionError::invalid_request(format!("{field} is required")))
}

/// `POST /objects` to a `CreateAction` carrying inline base64 content.
///
/// # Errors
///
/// `InvalidRequest` if the body is not JSON, `key` or `content` is missing,
/// or `content` is not valid base64.
pub fn upload_object_action(
    body: &[u8],
    default_target: Option<&BucketDescriptor>,
) -> Result<SemanticAction, ActionError> {
    let request: UploadObjectRequest = parse_body(body)?;
    let key = required(request.key, "key")?;
    let content = required(request.content, "content")?;
    if BASE64_STANDARD.decode(content.as_bytes()).is_err() {
        return Err(ActionError::invalid_request("content must be base64"));
    }

    let object = ObjectDescriptor {
        encoding_format: request.content_type.filter(|c| !c.is_empty()),
        text: Some(content),
        ..ObjectDescriptor::with_key(key)
    };
    Ok(SemanticAction::new(ActionType::Create)
        .with_object(object)
        .with_target(target_for(default_target, request.bucket.as_deref())))
}

/// `GET /objects/{key}` to a `SearchAction` with the key as query.
///
/// The reserved list-buckets query is refused as a key so this route never
/// lists buckets.
pub fn get_object_action(
    key: &str,
    bucket: Option<&str>,
    default_target: Option<&BucketDescriptor>,
) -> Result<SemanticAction, ActionError> {
    if key == LIST_BUCKETS_QUERY {
        return Err(ActionError::invalid_request(format!(
            "key {LIST_BUCKETS_QUERY} is reserved; use GET /buckets"
        )));
    }
    Ok(SemanticAction::new(ActionType::Search)
        .with_query(key)
        .with_target(target_for(default_target, bucket)))
}

/// `DELETE /objects/{key}` to a `DeleteAction`.
#[must_use]
pub fn delete_object_action(
    key: &str,
    bucket: Option<&str>,
    default_target: Option<&BucketDescriptor>,
) -> SemanticAction {
    SemanticAction::new(ActionType::Delete)
        .with_object(ObjectDescriptor::with_key(key))
        .with_target(target_for(default_target, bucket))
}

/// `GET /buckets` to a `SearchAction` with the list-buckets query.
#[must_use]
pub fn list_buckets_action(default_target: Option<&BucketDescriptor>) -> SemanticAction {
    SemanticAction::new(ActionType::Search)
        .with_query(LIST_BUCKETS_QUERY)
        .with_target(target_for(default_target, None))
}

/// `POST /buckets` to a `CreateAction` whose object is a `DataCatalog`.
///
/// # Errors
///
/// `InvalidRequest` if the body is not JSON or `name` is missing.
pub fn create_bucket_action(
    body: &[u8],
    default_target: Option<&BucketDescriptor>,
) -> Result<SemanticAction, ActionError> {
    let request: CreateBucketRequest = parse_body(body)?;
    let name = required(request.name, "name")?;
    let object = ObjectDescriptor {
        kind: DATA_CATALOG.to_owned(),
        name: Some(name.clone()),
        ..ObjectDescriptor::with_key(name)
    };
    Ok(SemanticAction::new(ActionType::Create)
        .with_object(object)
        .with_target(target_for(default_target, None)))
}

#[cfg(test)]
mod tests {
    use s3action_model::error::ActionErrorCode;

    use super::*;

    fn default_target() -> BucketDescriptor {
        BucketDescriptor::new("default-bucket", "http://localhost:9000", "us-east-1", "AK", "SK")
    }

    #[test]
    fn test_should_build_upload_action() {
        let body = br#"{"key":"docs/a.txt","content":"aGVsbG8=","contentType":"text/plain"}"#;
        let action = upload_object_action(body, Some(&default_target())).unwrap();
        assert_eq!(action.action_type, ActionType::Create);
        let object = action.object.as_ref().unwrap();
        assert_eq!(object.key(), Some("docs/a.txt"));
        assert_eq!(object.text.as_deref(), Some("aGVsbG8="));
        assert_eq!(object.encoding_format.as_deref(), Some("text/plain"));
        assert_eq!(
            action.target.as_ref().unwrap().identifier.as_deref(),
            Some("default-bucket")
        );
    }

    #[test]
    fn test_should_override_bucket() {
        let body = br#"{"key":"a","content":"aGk=","bucket":"other"}"#;
        let action = upload_object_action(body, Some(&default_target())).unwrap();
        let target = action.target.unwrap();
        assert_eq!(target.identifier.as_deref(), Some("other"));
        assert_eq!(target.property(&["accessKey"]), Some("AK"));
    }

    #[test]
    fn test_should_reject_invalid_upload_requests() {
        let cases: [(&[u8], &str); 4] = [
            (b"not json", "Invalid JSON body"),
            (br#"{"content":"aGk="}"#, "key is required"),
            (br#"{"key":"a"}"#, "content is required"),
            (br#"{"key":"a","content":"%%%"}"#, "content must be base64"),
        ];
        for (body, message) in cases {
            let err = upload_object_action(body, None).unwrap_err();
            assert_eq!(err.code, ActionErrorCode::InvalidRequest);
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
            assert!(err.message.contains(message), "{}", err.message);
        }
    }

    #[test]
    fn test_should_build_search_for_get() {
        let action = get_object_action("docs/a.txt", None, Some(&default_target())).unwrap();
        assert_eq!(action.action_type, ActionType::Search);
        assert_eq!(action.prefix(), Some("docs/a.txt"));
    }

    #[test]
    fn test_should_refuse_reserved_key_for_get() {
        let err = get_object_action(LIST_BUCKETS_QUERY, None, Some(&default_target())).unwrap_err();
        assert_eq!(err.code, ActionErrorCode::InvalidRequest);
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_build_delete_without_default_target() {
        let action = delete_object_action("a.txt", None, None);
        assert_eq!(action.action_type, ActionType::Delete);
        assert!(action.target.is_none());

        let action = delete_object_action("a.txt", Some("b"), None);
        assert_eq!(action.target.unwrap().identifier.as_deref(), Some("b"));
    }

    #[test]
    fn test_should_build_list_buckets_search() {
        let action = list_buckets_action(Some(&default_target()));
        assert_eq!(action.prefix(), Some(LIST_BUCKETS_QUERY));
    }

    #[test]
    fn test_should_build_create_bucket_action() {
        let action = create_bucket_action(br#"{"name":"new-bucket"}"#, None).unwrap();
        let object = action.object.unwrap();
        assert!(object.is_catalog());
        assert_eq!(object.key(), Some("new-bucket"));

        let err = create_bucket_action(b"{}", None).unwrap_err();
        assert_eq!(err.message, "name is required");
    }
}
