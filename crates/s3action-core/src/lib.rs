//! Business layer for the S3 semantic action service.
//!
//! This crate provides:
//!
//! - **Config**: environment-driven [`config::ServiceConfig`]
//! - **Credentials**: resolution of a target descriptor into store credentials
//! - **Store**: the [`store::ObjectStore`] seam and its `aws-sdk-s3` implementation
//! - **Provider**: the upload, download, delete, and list handlers
//! - **Handler**: the bridge from the HTTP layer to the provider
//! - **Registry**: best-effort service self-registration
#![allow(missing_docs)]

pub mod config;
pub mod credentials;
pub mod handler;
pub mod provider;
pub mod registry;
pub mod s3;
pub mod store;

pub use config::ServiceConfig;
pub use handler::SemanticActionHandler;
pub use provider::S3ActionProvider;
pub use registry::{HttpServiceRegistry, NoopRegistry, ServiceRegistration, ServiceRegistry};
pub use s3::S3ObjectStore;
pub use store::ObjectStore;
