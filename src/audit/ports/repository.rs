//! Persistence gateway port for audit tasks, facets, and change feeds.

use crate::audit::domain::{AuditTask, FacetRows, TaskStatus, UserId, VendorTaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result type for audit repository operations.
pub type AuditRepositoryResult<T> = Result<T, AuditRepositoryError>;

/// Read-projection of a task for the user's inventory view.
///
/// Derived, not authoritative: built from the task row plus the stored
/// vendor response cost when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskListEntry {
    /// Vendor task identifier.
    pub task_id: VendorTaskId,
    /// Audit target URL.
    pub target_url: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
    /// Cost from the stored vendor response, when present.
    pub cost: Option<f64>,
}

/// One change-notification payload for a task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChange {
    /// Vendor task identifier of the changed row.
    pub task_id: VendorTaskId,
    /// New lifecycle status.
    pub status: TaskStatus,
    /// Timestamp of the change.
    pub updated_at: DateTime<Utc>,
}

/// Live subscription to one user's task changes.
///
/// Cancelling is idempotent and safe during teardown; dropping the
/// subscription cancels it implicitly.
pub struct TaskChangeSubscription {
    receiver: mpsc::UnboundedReceiver<TaskChange>,
    canceller: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for TaskChangeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskChangeSubscription")
            .field("cancelled", &self.canceller.is_none())
            .finish_non_exhaustive()
    }
}

impl TaskChangeSubscription {
    /// Wires a subscription over a change receiver and a cancel hook.
    #[must_use]
    pub fn new(
        receiver: mpsc::UnboundedReceiver<TaskChange>,
        canceller: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            canceller: Some(Box::new(canceller)),
        }
    }

    /// Waits for the next change.
    ///
    /// Returns `None` once the subscription is cancelled or replaced and
    /// all buffered changes are drained.
    pub async fn next_change(&mut self) -> Option<TaskChange> {
        self.receiver.recv().await
    }

    /// Receives a change without waiting.
    pub fn try_next_change(&mut self) -> Option<TaskChange> {
        self.receiver.try_recv().ok()
    }

    /// Cancels the subscription. Calling this more than once has no
    /// further effect and never re-registers.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
        self.receiver.close();
    }
}

impl Drop for TaskChangeSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Persistence contract for audit tasks and report facets.
#[async_trait]
pub trait AuditTaskRepository: Send + Sync {
    /// Atomically creates the task row together with its originating
    /// vendor response row.
    ///
    /// # Errors
    ///
    /// Returns [`AuditRepositoryError::DuplicateTask`] when a row for the
    /// vendor task id already exists.
    async fn create_task_with_response(
        &self,
        task: &AuditTask,
        response: &Value,
    ) -> AuditRepositoryResult<()>;

    /// Lists the user's tasks ordered by creation time, descending, each
    /// carrying its stored response cost when present.
    async fn list_for_user(&self, user: UserId) -> AuditRepositoryResult<Vec<TaskListEntry>>;

    /// Finds a task by vendor task identifier.
    ///
    /// Returns `None` when no such task exists.
    async fn find_by_vendor_id(
        &self,
        task_id: &VendorTaskId,
    ) -> AuditRepositoryResult<Option<AuditTask>>;

    /// Sets the task's lifecycle status.
    ///
    /// The gateway does not validate the source state; callers are
    /// responsible for invoking this in lifecycle order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update_status(
        &self,
        task_id: &VendorTaskId,
        status: TaskStatus,
    ) -> AuditRepositoryResult<()>;

    /// Bulk-inserts one facet's rows for the task.
    ///
    /// Insert-only: rows are written at most once per pipeline run and a
    /// re-run would duplicate them. A facet with no rows is a no-op; a
    /// rejected insert aborts the whole facet.
    ///
    /// # Errors
    ///
    /// Returns [`AuditRepositoryError::Persistence`] when the store
    /// rejects the insert.
    async fn store_facet(
        &self,
        task_id: &VendorTaskId,
        rows: &FacetRows,
    ) -> AuditRepositoryResult<()>;
}

/// Change-notification feed scoped to one user's task rows.
pub trait TaskChangeFeed: Send + Sync {
    /// Registers for changes to the user's tasks.
    ///
    /// At most one subscription is live per user id: subscribing again for
    /// the same user cancels the prior subscription first.
    fn subscribe(&self, user: UserId) -> TaskChangeSubscription;
}

/// Errors returned by audit repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditRepositoryError {
    /// A task with the same vendor identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(VendorTaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(VendorTaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
