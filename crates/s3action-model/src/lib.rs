//! Schema.org JSON-LD model types for the S3 semantic action service.
//!
//! This crate provides the action envelope, the object and bucket
//! descriptors, the status vocabulary, the error taxonomy, and the parser
//! that turns a request body into a typed [`SemanticAction`].
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod action;
pub mod error;
pub mod operations;
pub mod parse;
pub mod types;

pub use action::{ActionOutcome, SemanticAction};
pub use error::{ActionError, ActionErrorCode};
pub use operations::{ActionType, LIST_BUCKETS_QUERY};
pub use parse::{parse_action, parse_action_value};
pub use types::{
    ActionResult, ActionStatus, BucketDescriptor, BucketSummary, ErrorProperty, ItemList,
    ObjectDescriptor, PropertyValue,
};
