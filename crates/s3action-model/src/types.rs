//! Schema.org descriptor types used inside an action envelope.
//!
//! All structs use camelCase JSON field naming to match Schema.org JSON-LD.
//! Optional fields are omitted when `None`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default `@type` for an object descriptor.
pub const MEDIA_OBJECT: &str = "MediaObject";
/// `@type` of a target/bucket descriptor.
pub const DATA_CATALOG: &str = "DataCatalog";
/// `@type` of a list result.
pub const ITEM_LIST: &str = "ItemList";
/// `@type` of a named property entry.
pub const PROPERTY_VALUE: &str = "PropertyValue";
/// Content type assumed when a request does not name one.
pub const DEFAULT_ENCODING_FORMAT: &str = "application/octet-stream";

fn media_object() -> String {
    MEDIA_OBJECT.to_owned()
}

fn data_catalog() -> String {
    DATA_CATALOG.to_owned()
}

fn property_value() -> String {
    PROPERTY_VALUE.to_owned()
}

// ---------------------------------------------------------------------------
// Status vocabulary
// ---------------------------------------------------------------------------

/// Schema.org `ActionStatusType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionStatus {
    /// The action has been received but not executed.
    #[default]
    #[serde(rename = "PotentialActionStatus")]
    Potential,
    /// The action is executing.
    #[serde(rename = "ActiveActionStatus")]
    Active,
    /// The action finished and carries a result.
    #[serde(rename = "CompletedActionStatus")]
    Completed,
    /// The action finished and carries an error.
    #[serde(rename = "FailedActionStatus")]
    Failed,
}

impl ActionStatus {
    /// Returns the Schema.org status string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Potential => "PotentialActionStatus",
            Self::Active => "ActiveActionStatus",
            Self::Completed => "CompletedActionStatus",
            Self::Failed => "FailedActionStatus",
        }
    }

    /// Whether the status is `Completed` or `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Object descriptor
// ---------------------------------------------------------------------------

/// A single stored item (Schema.org `MediaObject`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptor {
    /// The JSON-LD type (`MediaObject`, `DigitalDocument`, ...).
    #[serde(rename = "@type", default = "media_object")]
    pub kind: String,

    /// The object key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Display name; also used as the key when `identifier` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Local path for upload/download, or `s3://bucket/key` on results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,

    /// MIME type of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,

    /// Size in bytes. Inbound numeric strings are accepted; anything else is dropped.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_size"
    )]
    pub content_size: Option<i64>,

    /// When the object was uploaded by this service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_time"
    )]
    pub upload_date: Option<DateTime<Utc>>,

    /// Last-modified time reported by the store.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_time"
    )]
    pub date_modified: Option<DateTime<Utc>>,

    /// Base64 inline content. Accepted on input, never echoed.
    #[serde(default, skip_serializing)]
    pub text: Option<String>,
}

impl Default for ObjectDescriptor {
    fn default() -> Self {
        Self {
            kind: media_object(),
            identifier: None,
            name: None,
            content_url: None,
            encoding_format: None,
            content_size: None,
            upload_date: None,
            date_modified: None,
            text: None,
        }
    }
}

impl ObjectDescriptor {
    /// Create a descriptor for the given key.
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            identifier: Some(key.into()),
            ..Self::default()
        }
    }

    /// The object key: `identifier`, else `name`. Empty strings count as absent.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        non_empty(self.identifier.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    /// The local content path, if non-empty.
    #[must_use]
    pub fn content_path(&self) -> Option<&str> {
        non_empty(self.content_url.as_deref())
    }

    /// Whether this descriptor names a bucket rather than an object.
    #[must_use]
    pub fn is_catalog(&self) -> bool {
        self.kind == DATA_CATALOG
    }
}

// ---------------------------------------------------------------------------
// Target / bucket descriptor
// ---------------------------------------------------------------------------

/// A named property (Schema.org `PropertyValue`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Always `PropertyValue`.
    #[serde(rename = "@type", default = "property_value")]
    pub kind: String,
    /// Property name.
    pub name: String,
    /// Property value; credential lookups only accept strings.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl PropertyValue {
    /// Create a string-valued property.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: property_value(),
            name: name.into(),
            value: serde_json::Value::String(value.into()),
        }
    }
}

/// A destination store and its access credentials (Schema.org `DataCatalog`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDescriptor {
    /// The JSON-LD type.
    #[serde(rename = "@type", default = "data_catalog")]
    pub kind: String,

    /// Bucket name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Display name; also used as the bucket name when `identifier` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Store endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Credentials and other settings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_property: Vec<PropertyValue>,
}

impl Default for BucketDescriptor {
    fn default() -> Self {
        Self {
            kind: data_catalog(),
            identifier: None,
            name: None,
            url: None,
            additional_property: Vec::new(),
        }
    }
}

/// Property names whose values are never echoed back.
const SECRET_PROPERTIES: &[&str] = &["secretkey", "secretaccesskey"];

impl BucketDescriptor {
    /// Build a descriptor carrying a full set of credentials.
    #[must_use]
    pub fn new(
        bucket: impl Into<String>,
        endpoint_url: impl Into<String>,
        region: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            identifier: Some(bucket.into()),
            url: Some(endpoint_url.into()),
            additional_property: vec![
                PropertyValue::new("region", region),
                PropertyValue::new("accessKey", access_key),
                PropertyValue::new("secretKey", secret_key),
            ],
            ..Self::default()
        }
    }

    /// Look up a string property by any of the given names (case-insensitive).
    #[must_use]
    pub fn property(&self, names: &[&str]) -> Option<&str> {
        self.additional_property
            .iter()
            .filter(|p| names.iter().any(|n| p.name.eq_ignore_ascii_case(n)))
            .find_map(|p| p.value.as_str())
    }

    /// Set or replace a string property.
    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        self.additional_property
            .retain(|p| !p.name.eq_ignore_ascii_case(name));
        self.additional_property.push(PropertyValue::new(name, value));
    }

    /// A copy with secret values replaced, for echoing in responses.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for prop in &mut copy.additional_property {
            if SECRET_PROPERTIES.contains(&prop.name.to_ascii_lowercase().as_str()) {
                prop.value = serde_json::Value::String("REDACTED".to_owned());
            }
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// An ordered list of items (Schema.org `ItemList`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList<T> {
    /// Always `ItemList`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// Number of entries.
    pub number_of_items: usize,
    /// The entries, in store order.
    pub item_list_element: Vec<T>,
}

impl<T> ItemList<T> {
    /// Wrap a list of items.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            kind: ITEM_LIST,
            number_of_items: items.len(),
            item_list_element: items,
        }
    }
}

/// A bucket entry in a list-buckets result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    /// Always `DataCatalog`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// Bucket name.
    pub identifier: String,
    /// Bucket name.
    pub name: String,
    /// Creation time reported by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

impl BucketSummary {
    /// Create a summary for a bucket.
    #[must_use]
    pub fn new(name: impl Into<String>, date_created: Option<DateTime<Utc>>) -> Self {
        let name = name.into();
        Self {
            kind: DATA_CATALOG,
            identifier: name.clone(),
            name,
            date_created,
        }
    }
}

/// The result of a completed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionResult {
    /// The single object affected by an upload, download, or delete.
    Object(ObjectDescriptor),
    /// Objects returned by a listing.
    Objects(ItemList<ObjectDescriptor>),
    /// Buckets returned by a list-buckets search.
    Buckets(ItemList<BucketSummary>),
}

/// The error property of a failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorProperty {
    /// Always `Thing`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// The error code.
    pub name: String,
    /// Human-readable message.
    pub description: String,
}

impl From<&crate::error::ActionError> for ErrorProperty {
    fn from(err: &crate::error::ActionError) -> Self {
        Self {
            kind: "Thing",
            name: err.code.as_str().to_owned(),
            description: err.message.clone(),
        }
    }
}

/// Echo-only size: a number or a numeric string, otherwise dropped.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Echo-only timestamp: RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC),
/// otherwise dropped.
fn lenient_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::String(s) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&s) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    Ok(NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
