//! Service-registry client.
//!
//! The service registers itself at startup and unregisters at shutdown.
//! Both calls are best effort: callers log failures and carry on.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Timeout for a single registry call.
const REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors reported by a registry call.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The request could not be sent or the response not read.
    #[error("registry request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The registry answered with a non-success status.
    #[error("registry answered with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

/// Registration document sent to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRegistration {
    pub service_id: String,
    pub service_name: String,
    pub description: String,
    pub port: u16,
    pub version: String,
    pub capabilities: Vec<String>,
    pub api_versions: Vec<String>,
}

/// Service self-registration.
#[async_trait]
pub trait ServiceRegistry: Send + Sync + std::fmt::Debug {
    /// Announce the service.
    async fn register(&self, registration: &ServiceRegistration) -> Result<(), RegistryError>;

    /// Withdraw the service.
    async fn unregister(&self, service_id: &str) -> Result<(), RegistryError>;
}

/// Registry reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpServiceRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServiceRegistry {
    /// Create a client for the registry at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn services_url(&self) -> String {
        format!("{}/v1/api/services", self.base_url)
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), RegistryError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RegistryError::Status {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl ServiceRegistry for HttpServiceRegistry {
    async fn register(&self, registration: &ServiceRegistration) -> Result<(), RegistryError> {
        let response = self
            .client
            .post(self.services_url())
            .timeout(REGISTRY_TIMEOUT)
            .json(registration)
            .send()
            .await?;
        check_status(&response)?;
        tracing::info!(service_id = %registration.service_id, "registered with service registry");
        Ok(())
    }

    async fn unregister(&self, service_id: &str) -> Result<(), RegistryError> {
        let response = self
            .client
            .delete(format!("{}/{service_id}", self.services_url()))
            .timeout(REGISTRY_TIMEOUT)
            .send()
            .await?;
        check_status(&response)?;
        tracing::info!(service_id, "unregistered from service registry");
        Ok(())
    }
}

/// Registry used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRegistry;

#[async_trait]
impl ServiceRegistry for NoopRegistry {
    async fn register(&self, _registration: &ServiceRegistration) -> Result<(), RegistryError> {
        Ok(())
    }

    async fn unregister(&self, _service_id: &str) -> Result<(), RegistryError> {
        Ok(())
    }
}
