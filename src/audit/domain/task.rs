//! Audit task aggregate root.

use super::{AuditDomainError, TargetUrl, TaskStatus, UserId, VendorTaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One vendor-side website analysis run.
///
/// Created synchronously when the vendor accepts a new analysis request and
/// mutated only through [`AuditTask::advance_status`], which enforces the
/// monotonic lifecycle. Tasks are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTask {
    vendor_task_id: VendorTaskId,
    target: TargetUrl,
    owner: UserId,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted audit task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAuditTask {
    /// Persisted vendor task identifier.
    pub vendor_task_id: VendorTaskId,
    /// Persisted target URL.
    pub target: TargetUrl,
    /// Persisted owning user.
    pub owner: UserId,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AuditTask {
    /// Creates a pending task from a vendor-accepted submission.
    #[must_use]
    pub fn new(
        vendor_task_id: VendorTaskId,
        target: TargetUrl,
        owner: UserId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            vendor_task_id,
            target,
            owner,
            status: TaskStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAuditTask) -> Self {
        Self {
            vendor_task_id: data.vendor_task_id,
            target: data.target,
            owner: data.owner,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the vendor task identifier.
    #[must_use]
    pub const fn vendor_task_id(&self) -> &VendorTaskId {
        &self.vendor_task_id
    }

    /// Returns the audit target.
    #[must_use]
    pub const fn target(&self) -> &TargetUrl {
        &self.target
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task to the next lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`AuditDomainError::InvalidStatusTransition`] when the
    /// lifecycle does not permit the move, including any transition out of
    /// a terminal status.
    pub fn advance_status(
        &mut self,
        next: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), AuditDomainError> {
        if !self.status.can_transition_to(next) {
            return Err(AuditDomainError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = clock.utc();
        Ok(())
    }
}
