//! Credential resolution.
//!
//! Turns a target descriptor into the credentials needed for one store call.
//! Every field is checked before any store call is attempted; a missing field
//! fails the action in-band with `MissingCredentials` naming what is absent.

use s3action_model::error::ActionError;
use s3action_model::types::BucketDescriptor;

/// Property names accepted for each credential field.
const BUCKET_PROPERTIES: &[&str] = &["bucket", "bucketName"];
const ENDPOINT_PROPERTIES: &[&str] = &["url", "endpoint", "endpointUrl"];
const REGION_PROPERTIES: &[&str] = &["region"];
const ACCESS_KEY_PROPERTIES: &[&str] = &["accessKey", "accessKeyId"];
const SECRET_KEY_PROPERTIES: &[&str] = &["secretKey", "secretAccessKey"];

/// Credentials for one store call.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    /// Bucket name.
    pub bucket: String,
    /// Store endpoint URL.
    pub endpoint_url: String,
    /// Signing region.
    pub region: String,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl std::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"...")
            .finish()
    }
}

/// A usable value: non-empty and not an unresolved `${NAME}` placeholder.
fn usable(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !(v.starts_with("${") && v.ends_with('}')))
}

/// Resolve store credentials from a target descriptor.
///
/// # Errors
///
/// `MissingCredentials` if the target is absent or lacks the bucket,
/// endpoint, access key, or secret key.
pub fn resolve_credentials(
    target: Option<&BucketDescriptor>,
    default_region: &str,
) -> Result<StoreCredentials, ActionError> {
    let Some(target) = target else {
        return Err(ActionError::missing_credentials(
            "Target (bucket descriptor) with credentials is required",
        ));
    };

    let bucket = usable(target.identifier.as_deref())
        .or_else(|| usable(target.name.as_deref()))
        .or_else(|| usable(target.property(BUCKET_PROPERTIES)));
    let endpoint_url =
        usable(target.url.as_deref()).or_else(|| usable(target.property(ENDPOINT_PROPERTIES)));
    let region = usable(target.property(REGION_PROPERTIES)).unwrap_or(default_region);
    let access_key_id = usable(target.property(ACCESS_KEY_PROPERTIES));
    let secret_access_key = usable(target.property(SECRET_KEY_PROPERTIES));

    match (bucket, endpoint_url, access_key_id, secret_access_key) {
        (Some(bucket), Some(endpoint_url), Some(access_key_id), Some(secret_access_key)) => {
            Ok(StoreCredentials {
                bucket: bucket.to_owned(),
                endpoint_url: endpoint_url.to_owned(),
                region: region.to_owned(),
                access_key_id: access_key_id.to_owned(),
                secret_access_key: secret_access_key.to_owned(),
            })
        }
        (bucket, endpoint_url, access_key_id, secret_access_key) => {
            let missing: Vec<&str> = [
                ("bucket", bucket.is_none()),
                ("url", endpoint_url.is_none()),
                ("accessKey", access_key_id.is_none()),
                ("secretKey", secret_access_key.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, is_missing)| is_missing.then_some(name))
            .collect();
            Err(ActionError::missing_credentials(format!(
                "Missing required target credentials: {}",
                missing.join(", ")
            )))
        }
    }
}
