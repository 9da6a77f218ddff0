//! Operation-state tracking.
//!
//! The HTTP service records every dispatched action in an injected
//! [`OperationTracker`]. The in-memory tracker keeps a bounded window of the
//! most recent records and backs the `/state/*` routes.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use s3action_model::action::SemanticAction;
use s3action_model::operations::ActionType;
use s3action_model::types::ActionStatus;

/// Default number of records kept by [`InMemoryOperationTracker`].
pub const DEFAULT_MAX_OPERATIONS: usize = 100;

/// A tracked action execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    /// Operation id (the request id).
    pub operation_id: String,
    /// The action type.
    pub action_type: ActionType,
    /// The caller's action identifier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_identifier: Option<String>,
    /// Current status.
    pub status: ActionStatus,
    /// When tracking began.
    pub start_time: DateTime<Utc>,
    /// When the action settled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Error description of a failed action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts of tracked operations by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Records action executions for the state routes.
pub trait OperationTracker: Send + Sync {
    /// Record that an action started.
    fn begin(&self, operation_id: &str, action: &SemanticAction);

    /// Record the settled action.
    fn finish(&self, operation_id: &str, action: &SemanticAction);

    /// Tracked records, newest first.
    fn recent(&self) -> Vec<OperationRecord>;

    /// Look up one record; the newest one when an id was reused.
    fn get(&self, operation_id: &str) -> Option<OperationRecord>;

    /// Counts by status.
    fn stats(&self) -> OperationStats;
}

/// Tracker keeping the most recent records in memory.
#[derive(Debug)]
pub struct InMemoryOperationTracker {
    capacity: usize,
    records: Mutex<VecDeque<OperationRecord>>,
}

impl InMemoryOperationTracker {
    /// Create a tracker keeping at most `capacity` records (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }
}

impl Default for InMemoryOperationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OPERATIONS)
    }
}

impl OperationTracker for InMemoryOperationTracker {
    fn begin(&self, operation_id: &str, action: &SemanticAction) {
        let record = OperationRecord {
            operation_id: operation_id.to_owned(),
            action_type: action.action_type,
            action_identifier: action.identifier.clone(),
            status: ActionStatus::Active,
            start_time: Utc::now(),
            end_time: None,
            error: None,
        };
        let mut records = self.records.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    fn finish(&self, operation_id: &str, action: &SemanticAction) {
        let mut records = self.records.lock();
        // Evicted records are not resurrected.
        if let Some(record) = records
            .iter_mut()
            .rev()
            .find(|r| r.operation_id == operation_id)
        {
            record.status = action.status();
            record.end_time = Some(action.end_time.unwrap_or_else(Utc::now));
            record.error = action.error().map(|e| e.description.clone());
        }
    }

    fn recent(&self) -> Vec<OperationRecord> {
        self.records.lock().iter().rev().cloned().collect()
    }

    fn get(&self, operation_id: &str) -> Option<OperationRecord> {
        self.records
            .lock()
            .iter()
            .rev()
            .find(|r| r.operation_id == operation_id)
            .cloned()
    }

    fn stats(&self) -> OperationStats {
        let records = self.records.lock();
        let mut stats = OperationStats {
            total: records.len(),
            ..OperationStats::default()
        };
        for record in records.iter() {
            match record.status {
                ActionStatus::Completed => stats.completed += 1,
                ActionStatus::Failed => stats.failed += 1,
                ActionStatus::Active | ActionStatus::Potential => stats.active += 1,
            }
        }
        stats
    }
}

/// Tracker that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl OperationTracker for NoopTracker {
    fn begin(&self, _operation_id: &str, _action: &SemanticAction) {}

    fn finish(&self, _operation_id: &str, _action: &SemanticAction) {}

    fn recent(&self) -> Vec<OperationRecord> {
        Vec::new()
    }

    fn get(&self, _operation_id: &str) -> Option<OperationRecord> {
        None
    }

    fn stats(&self) -> OperationStats {
        OperationStats::default()
    }
}
