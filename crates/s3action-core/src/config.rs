//! Service configuration.
//!
//! Provides [`ServiceConfig`], loaded from environment variables with
//! defaults suitable for a local deployment.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use s3action_model::types::BucketDescriptor;

/// Service configuration.
///
/// # Examples
///
/// ```
/// use s3action_core::config::ServiceConfig;
///
/// let config = ServiceConfig::default();
/// assert_eq!(config.listen_addr, "0.0.0.0:8092");
/// assert_eq!(config.api_prefix, "/v1/api");
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Bind address (e.g. `"0.0.0.0:8092"`).
    #[builder(default = String::from("0.0.0.0:8092"))]
    pub listen_addr: String,

    /// Prefix for every route except `/health`.
    #[builder(default = String::from("/v1/api"))]
    pub api_prefix: String,

    /// Static API key; unset leaves the service open.
    #[builder(default)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Region used when a target does not name one.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Directory for downloads without an explicit local path.
    #[builder(default = String::from("/tmp"))]
    pub download_dir: String,

    /// Number of operations kept by the state tracker.
    #[builder(default = 100)]
    pub max_operations: usize,

    /// Base URL of the service registry.
    #[builder(default)]
    pub registry_url: Option<String>,

    /// Default target endpoint for the REST routes.
    #[builder(default)]
    pub s3_endpoint_url: Option<String>,

    /// Default target region for the REST routes.
    #[builder(default)]
    pub s3_region: Option<String>,

    /// Default target access key for the REST routes.
    #[builder(default)]
    pub s3_access_key: Option<String>,

    /// Default target secret key for the REST routes.
    #[builder(default)]
    #[serde(skip_serializing)]
    pub s3_secret_key: Option<String>,

    /// Default target bucket for the REST routes.
    #[builder(default)]
    pub s3_bucket: Option<String>,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Log output format: `text` or `json`.
    #[builder(default = String::from("text"))]
    pub log_format: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: String::from("0.0.0.0:8092"),
            api_prefix: String::from("/v1/api"),
            api_key: None,
            default_region: String::from("us-east-1"),
            download_dir: String::from("/tmp"),
            max_operations: 100,
            registry_url: None,
            s3_endpoint_url: None,
            s3_region: None,
            s3_access_key: None,
            s3_secret_key: None,
            s3_bucket: None,
            log_level: String::from("info"),
            log_format: String::from("text"),
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("api_prefix", &self.api_prefix)
            .field("api_key", &self.api_key.as_ref().map(|_| "..."))
            .field("default_region", &self.default_region)
            .field("download_dir", &self.download_dir)
            .field("max_operations", &self.max_operations)
            .field("registry_url", &self.registry_url)
            .field("s3_endpoint_url", &self.s3_endpoint_url)
            .field("s3_region", &self.s3_region)
            .field("s3_access_key", &self.s3_access_key)
            .field("s3_secret_key", &self.s3_secret_key.as_ref().map(|_| "..."))
            .field("s3_bucket", &self.s3_bucket)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `LISTEN_ADDR` | `0.0.0.0:8092` (`PORT` alone sets the port) |
    /// | `API_PREFIX` | `/v1/api` |
    /// | `S3_API_KEY` | unset |
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `DOWNLOAD_DIR` | `/tmp` |
    /// | `MAX_OPERATIONS` | `100` |
    /// | `REGISTRYSERVICE_API_URL` | unset |
    /// | `S3_ENDPOINT_URL`, `S3_REGION`, `S3_ACCESS_KEY`, `S3_SECRET_KEY`, `S3_BUCKET` | unset |
    /// | `LOG_LEVEL` | `info` |
    /// | `LOG_FORMAT` | `text` |
    ///
    /// Empty values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = var("LISTEN_ADDR") {
            config.listen_addr = v;
        } else if let Some(port) = var("PORT").and_then(|p| p.parse::<u16>().ok()) {
            config.listen_addr = format!("0.0.0.0:{port}");
        }
        if let Some(v) = var("API_PREFIX") {
            config.api_prefix = normalize_prefix(&v);
        }
        config.api_key = var("S3_API_KEY");
        if let Some(v) = var("DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Some(v) = var("DOWNLOAD_DIR") {
            config.download_dir = v;
        }
        if let Some(n) = var("MAX_OPERATIONS").and_then(|v| v.parse::<usize>().ok()) {
            config.max_operations = n;
        }
        config.registry_url = var("REGISTRYSERVICE_API_URL");
        config.s3_endpoint_url = var("S3_ENDPOINT_URL");
        config.s3_region = var("S3_REGION");
        config.s3_access_key = var("S3_ACCESS_KEY");
        config.s3_secret_key = var("S3_SECRET_KEY");
        config.s3_bucket = var("S3_BUCKET");
        if let Some(v) = var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = var("LOG_FORMAT") {
            config.log_format = v.to_ascii_lowercase();
        }

        config
    }

    /// The port part of the listen address.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.listen_addr
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
    }

    /// Whether logs should be JSON lines.
    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// The target used by REST routes, built from the `S3_*` settings.
    ///
    /// Returns `None` when none of them is set. A partial set still yields a
    /// target so the action fails with the missing fields named.
    #[must_use]
    pub fn default_target(&self) -> Option<BucketDescriptor> {
        let fields = [
            &self.s3_endpoint_url,
            &self.s3_access_key,
            &self.s3_secret_key,
            &self.s3_bucket,
        ];
        if fields.iter().all(|f| f.is_none()) {
            return None;
        }

        let mut target = BucketDescriptor {
            identifier: self.s3_bucket.clone(),
            url: self.s3_endpoint_url.clone(),
            ..BucketDescriptor::default()
        };
        target.set_property(
            "region",
            self.s3_region.as_deref().unwrap_or(&self.default_region),
        );
        if let Some(access_key) = &self.s3_access_key {
            target.set_property("accessKey", access_key.as_str());
        }
        if let Some(secret_key) = &self.s3_secret_key {
            target.set_property("secretKey", secret_key.as_str());
        }
        Some(target)
    }
}

/// Ensure a leading `/` and strip trailing ones.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') || trimmed.is_empty() {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}
