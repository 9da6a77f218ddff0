//! HTTP service layer for the S3 semantic action service.
//!
//! This crate provides:
//!
//! - **Router**: maps method and path to a [`router::Route`]
//! - **Handler trait**: the boundary between HTTP and business logic
//! - **REST adapter**: converts convenience endpoints into JSON-LD envelopes
//! - **Service**: hyper `Service` implementation with API-key checks
//! - **State**: operation tracking behind the `/state/*` routes
#![allow(missing_docs)]

pub mod auth;
pub mod body;
pub mod dispatch;
pub mod response;
pub mod rest;
pub mod router;
pub mod service;
pub mod state;

pub use body::ActionResponseBody;
pub use dispatch::ActionHandler;
pub use service::{ActionHttpConfig, ActionHttpService};
pub use state::{InMemoryOperationTracker, NoopTracker, OperationTracker};
