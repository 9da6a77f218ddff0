//! The semantic action envelope.
//!
//! An envelope is created when a request arrives, settled exactly once with
//! either a result or an error, and serialized back to the caller. The
//! status is never stored: it is derived from [`ActionOutcome`], so a
//! terminal envelope always carries exactly one of `result` / `error`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ActionError;
use crate::operations::ActionType;
use crate::types::{ActionResult, ActionStatus, BucketDescriptor, ErrorProperty, ObjectDescriptor};

/// Default JSON-LD context.
pub const SCHEMA_ORG_CONTEXT: &str = "https://schema.org";

fn default_context() -> serde_json::Value {
    serde_json::Value::String(SCHEMA_ORG_CONTEXT.to_owned())
}

/// Where an action stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionOutcome {
    /// Not executed yet.
    #[default]
    Pending,
    /// Finished with a result.
    Completed(ActionResult),
    /// Finished with an error.
    Failed(ErrorProperty),
}

/// A Schema.org action envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticAction {
    /// JSON-LD context, echoed unchanged.
    #[serde(rename = "@context", default = "default_context")]
    pub context: serde_json::Value,

    /// The action type discriminator.
    #[serde(rename = "@type")]
    pub action_type: ActionType,

    /// Caller-supplied action identifier.
    #[serde(default)]
    pub identifier: Option<String>,

    /// Caller-supplied action name.
    #[serde(default)]
    pub name: Option<String>,

    /// Caller-supplied description.
    #[serde(default)]
    pub description: Option<String>,

    /// The object (key, path, format).
    #[serde(default)]
    pub object: Option<ObjectDescriptor>,

    /// The target bucket and its credentials.
    #[serde(default)]
    pub target: Option<BucketDescriptor>,

    /// Opaque instrument, echoed unchanged.
    #[serde(default)]
    pub instrument: Option<serde_json::Value>,

    /// Request-supplied destination key for uploads.
    #[serde(default)]
    pub target_url: Option<String>,

    /// Prefix filter for searches.
    #[serde(default)]
    pub query: Option<String>,

    /// When execution began.
    #[serde(skip)]
    pub start_time: Option<DateTime<Utc>>,

    /// When execution finished.
    #[serde(skip)]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(skip)]
    outcome: ActionOutcome,
}

impl SemanticAction {
    /// Create an empty envelope of the given type.
    #[must_use]
    pub fn new(action_type: ActionType) -> Self {
        Self {
            context: default_context(),
            action_type,
            identifier: None,
            name: None,
            description: None,
            object: None,
            target: None,
            instrument: None,
            target_url: None,
            query: None,
            start_time: None,
            end_time: None,
            outcome: ActionOutcome::Pending,
        }
    }

    #[must_use]
    pub fn with_object(mut self, object: ObjectDescriptor) -> Self {
        self.object = Some(object);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<BucketDescriptor>) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// The status, derived from the outcome.
    #[must_use]
    pub fn status(&self) -> ActionStatus {
        match self.outcome {
            ActionOutcome::Pending => ActionStatus::Potential,
            ActionOutcome::Completed(_) => ActionStatus::Completed,
            ActionOutcome::Failed(_) => ActionStatus::Failed,
        }
    }

    #[must_use]
    pub fn outcome(&self) -> &ActionOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn result(&self) -> Option<&ActionResult> {
        match &self.outcome {
            ActionOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorProperty> {
        match &self.outcome {
            ActionOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// The search query, if non-empty.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Record the start of execution.
    pub fn begin(&mut self, now: DateTime<Utc>) {
        self.start_time = Some(now);
    }

    /// Settle the action with the handler's outcome.
    ///
    /// Returns `false` and leaves the envelope untouched if it was already
    /// settled.
    pub fn settle(&mut self, outcome: Result<ActionResult, ActionError>, now: DateTime<Utc>) -> bool {
        if self.status().is_terminal() {
            return false;
        }
        self.outcome = match outcome {
            Ok(result) => ActionOutcome::Completed(result),
            Err(err) => ActionOutcome::Failed(ErrorProperty::from(&err)),
        };
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.end_time = Some(now);
        true
    }
}

/// Borrowed wire view of a [`SemanticAction`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionView<'a> {
    #[serde(rename = "@context")]
    context: &'a serde_json::Value,
    #[serde(rename = "@type")]
    action_type: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<&'a ObjectDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<BucketDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instrument: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    action_status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ActionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorProperty>,
}

fn rfc3339(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

impl Serialize for SemanticAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ActionView {
            context: &self.context,
            action_type: self.action_type,
            identifier: self.identifier.as_deref(),
            name: self.name.as_deref(),
            description: self.description.as_deref(),
            object: self.object.as_ref(),
            target: self.target.as_ref().map(BucketDescriptor::redacted),
            instrument: self.instrument.as_ref(),
            target_url: self.target_url.as_deref(),
            query: self.query.as_deref(),
            action_status: self.status(),
            start_time: rfc3339(self.start_time),
            end_time: rfc3339(self.end_time),
            result: self.result(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}
